//! Highlight reel command line tool.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reelcut_models::{ExtractStrategy, TimeRange, Transition};
use reelcut_worker::{Pipeline, PipelineConfig};

/// Cut time ranges out of a video and join them into one highlight reel.
#[derive(Debug, Parser)]
#[command(name = "reelcut", version, about)]
struct Cli {
    /// Source video
    #[arg(long)]
    source: PathBuf,

    /// Output video; subclips are written to its directory
    #[arg(long)]
    target: PathBuf,

    /// Range to keep as START-END, in seconds or [HH:]MM:SS; repeat in reel order
    #[arg(long = "range", value_name = "START-END", required = true)]
    ranges: Vec<TimeRange>,

    /// xfade transition name, or "none" for hard cuts
    #[arg(long, default_value = "fade")]
    transition: Transition,

    /// Encoder preset (defaults to REELCUT_PRESET or ultrafast)
    #[arg(long)]
    preset: Option<String>,

    /// Subclip extraction strategy
    #[arg(long, default_value = "concurrent")]
    strategy: ExtractStrategy,

    /// Delete intermediate subclips when done
    #[arg(long)]
    remove_subclips: bool,

    /// Maximum concurrent extractions
    #[arg(long)]
    pool_size: Option<usize>,

    /// Video crossfade duration in seconds
    #[arg(long)]
    fade_duration: Option<f64>,

    /// Check ranges against the source duration and each other first
    #[arg(long)]
    validate_ranges: bool,

    /// Fail when any subclip could not be extracted
    #[arg(long)]
    strict_extraction: bool,

    /// Cut subclips with stream copy instead of re-encoding
    #[arg(long)]
    stream_copy: bool,
}

impl Cli {
    /// Environment config with command line overrides applied.
    fn config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::from_env();
        if let Some(pool_size) = self.pool_size {
            config.pool_size = pool_size;
        }
        if let Some(fade) = self.fade_duration {
            config.fade_duration = fade;
        }
        if let Some(preset) = &self.preset {
            config.encoding.preset = preset.clone();
        }
        config.validate_ranges |= self.validate_ranges;
        config.strict_extraction |= self.strict_extraction;
        config.stream_copy |= self.stream_copy;
        config
    }
}

fn init_tracing() {
    // Colored output for terminals, JSON for log collectors
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reelcut=info,reelcut_media=info,reelcut_worker=info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = cli.config();
    config.validate().context("invalid configuration")?;
    info!("Pipeline config: {:?}", config);

    let pipeline = Pipeline::from_config(config);
    let (ffmpeg, ffprobe) = pipeline
        .engine()
        .check()
        .context("FFmpeg is not available")?;
    info!("Using {} and {}", ffmpeg.display(), ffprobe.display());

    let preset = pipeline.config().encoding.preset.clone();
    let result = pipeline
        .extract_and_concat(
            &cli.ranges,
            &cli.source,
            &cli.target,
            cli.transition,
            &preset,
            cli.remove_subclips,
            cli.strategy,
        )
        .await;

    match result.output() {
        Some(path) => println!("{}", path.display()),
        None => error!("No reel was written to {}", cli.target.display()),
    }
    Ok(result.is_success())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
