//! Highlight reel pipeline.
//!
//! A run moves through `Init -> Extracting -> BuildingGraph -> Concatenating`
//! and ends in `Done` or `Failed`, with an optional `Cleanup` pass that runs
//! regardless of the outcome. Every local failure is logged and reported as a
//! [`PipelineResult`] failure; nothing is retried.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Instrument;

use reelcut_media::fs_utils::{copy_replacing, remove_matching};
use reelcut_media::{
    build_crossfade_graph, concat_with_transitions, extract_all, plan_subclips, probe_duration,
    subclip_glob, trim_and_concat, ExtractOptions, FfmpegEngine, MediaEngine, MediaError,
    SourceMedia, Subclip,
};
use reelcut_models::{
    EncodingConfig, ExtractStrategy, PipelineResult, TimeRange, Transition, TransitionSpec,
};

use crate::config::PipelineConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;
use crate::metrics;

/// Stage of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Init,
    Extracting,
    BuildingGraph,
    Concatenating,
    Cleanup,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Init => "init",
            PipelineStage::Extracting => "extracting",
            PipelineStage::BuildingGraph => "building_graph",
            PipelineStage::Concatenating => "concatenating",
            PipelineStage::Cleanup => "cleanup",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-run state shared by the stages.
struct Run<'a> {
    logger: &'a RunLogger,
    source: SourceMedia,
    stem: String,
    target: &'a Path,
    work_dir: PathBuf,
    transition: Transition,
    strategy: ExtractStrategy,
    encoding: EncodingConfig,
}

impl Run<'_> {
    fn enter(&self, stage: PipelineStage) {
        tracing::debug!(run_id = %self.logger.run_id(), stage = %stage, "Entering stage");
    }
}

/// Directory subclips are written to: the target's parent, or the current
/// directory for a bare file name.
fn work_dir_for(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Assembles highlight reels with an injected media engine.
pub struct Pipeline<E = FfmpegEngine> {
    engine: E,
    config: PipelineConfig,
}

impl Pipeline<FfmpegEngine> {
    /// Pipeline driving the FFmpeg binaries named in `config`.
    pub fn from_config(config: PipelineConfig) -> Self {
        let engine = FfmpegEngine::with_binaries(&config.ffmpeg_path, &config.ffprobe_path);
        Self::new(engine, config)
    }
}

impl<E: MediaEngine> Pipeline<E> {
    pub fn new(engine: E, config: PipelineConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Cut `time_ranges` out of `source_path` and join them into
    /// `target_path`.
    ///
    /// Ranges are used in the order given. A single range is copied to the
    /// target as-is. `Transition::None` joins the ranges with hard cuts in one
    /// pass without intermediate files; any other transition extracts
    /// subclips next to the target and crossfades them. When
    /// `remove_subclips` is set, every file matching the run's subclip naming
    /// pattern is deleted afterwards, whether or not the run succeeded. The
    /// target itself is never deleted, even if its name fits the pattern.
    /// Hard-cut runs write no subclips and skip cleanup entirely, leaving
    /// files from earlier crossfade runs alone.
    #[allow(clippy::too_many_arguments)]
    pub async fn extract_and_concat(
        &self,
        time_ranges: &[TimeRange],
        source_path: &Path,
        target_path: &Path,
        transition: Transition,
        preset: &str,
        remove_subclips: bool,
        strategy: ExtractStrategy,
    ) -> PipelineResult {
        let logger = RunLogger::new("extract_and_concat");
        let span = logger.create_span();

        async {
            logger.log_start(&format!(
                "{} ranges from {} into {} (transition: {}, strategy: {})",
                time_ranges.len(),
                source_path.display(),
                target_path.display(),
                transition,
                strategy
            ));

            let source = SourceMedia::new(source_path);
            let mut encoding = self.config.encoding.clone();
            encoding.preset = preset.to_string();
            let run = Run {
                logger: &logger,
                stem: source.stem(),
                source,
                target: target_path,
                work_dir: work_dir_for(target_path),
                transition,
                strategy,
                encoding,
            };

            let outcome = self.execute(&run, time_ranges).await;

            if remove_subclips {
                if run.transition.is_crossfade() {
                    self.cleanup(&run).await;
                } else {
                    logger.log_progress("hard-cut run wrote no subclips, skipping cleanup");
                }
            }

            let result = match outcome {
                Ok(()) => {
                    run.enter(PipelineStage::Done);
                    logger.log_completion(&format!("reel written to {}", target_path.display()));
                    PipelineResult::success(target_path)
                }
                Err(e) => {
                    run.enter(PipelineStage::Failed);
                    logger.log_error(&format!("{} (kind: {})", e, e.kind()));
                    PipelineResult::failure()
                }
            };
            metrics::record_run(result.status.as_str());
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, run: &Run<'_>, time_ranges: &[TimeRange]) -> WorkerResult<()> {
        run.enter(PipelineStage::Init);
        if time_ranges.is_empty() {
            return Err(MediaError::EmptyTimeRanges.into());
        }
        tokio::fs::create_dir_all(&run.work_dir).await?;
        if self.config.validate_ranges {
            self.validate_ranges(run, time_ranges).await?;
        }

        if !run.transition.is_crossfade() {
            return self.hard_cut(run, time_ranges).await;
        }

        run.enter(PipelineStage::Extracting);
        let mut subclips = plan_subclips(
            &run.stem,
            time_ranges,
            &run.work_dir,
            &self.config.subclip_ext,
        );
        self.extract(run, &subclips).await?;

        run.enter(PipelineStage::BuildingGraph);
        if let [only] = subclips.as_slice() {
            run.logger
                .log_progress("single subclip, copying to target without transitions");
            copy_replacing(&only.path, run.target).await?;
            return Ok(());
        }
        self.probe_durations(&mut subclips).await?;
        let spec = TransitionSpec::new(run.transition, self.config.fade_duration);
        let graph = build_crossfade_graph(&subclips, &spec)?;
        run.logger.log_progress(&format!(
            "filter graph built with {} transitions",
            graph.transition_count()
        ));

        run.enter(PipelineStage::Concatenating);
        let started = Instant::now();
        let result =
            concat_with_transitions(&self.engine, &subclips, &graph, run.target, &run.encoding)
                .await;
        metrics::record_ffmpeg_duration("concatenate", started.elapsed().as_secs_f64());
        result?;
        Ok(())
    }

    /// Reject ranges that run past the end of the source or overlap each other.
    async fn validate_ranges(&self, run: &Run<'_>, time_ranges: &[TimeRange]) -> WorkerResult<()> {
        let source_duration = run.source.duration(&self.engine).await?;

        if let Some(range) = time_ranges.iter().find(|r| r.end() > source_duration) {
            return Err(MediaError::InvalidTimeRange(format!(
                "{} ends after the source ({:.3}s)",
                range, source_duration
            ))
            .into());
        }

        let mut sorted: Vec<&TimeRange> = time_ranges.iter().collect();
        sorted.sort_by(|a, b| a.start().total_cmp(&b.start()));
        if let Some(pair) = sorted.windows(2).find(|pair| pair[0].overlaps(pair[1])) {
            return Err(MediaError::InvalidTimeRange(format!(
                "{} overlaps {}",
                pair[0], pair[1]
            ))
            .into());
        }

        Ok(())
    }

    async fn extract(&self, run: &Run<'_>, subclips: &[Subclip]) -> WorkerResult<()> {
        let options = ExtractOptions {
            stream_copy: self.config.stream_copy,
            encoding: run.encoding.clone(),
        };
        let started = Instant::now();
        let results = extract_all(
            &self.engine,
            run.strategy,
            run.source.path(),
            subclips,
            &options,
            self.config.pool_size,
        )
        .await;
        metrics::record_ffmpeg_duration("extract", started.elapsed().as_secs_f64());

        let mut missing = 0;
        for (clip, result) in subclips.iter().zip(&results) {
            if let Err(e) = result {
                missing += 1;
                tracing::warn!(
                    run_id = %run.logger.run_id(),
                    ordinal = clip.ordinal,
                    path = %clip.path.display(),
                    "Subclip missing after extraction: {}", e
                );
            }
        }

        let total = subclips.len();
        metrics::record_subclips_extracted((total - missing) as u64);
        if missing == 0 {
            return Ok(());
        }

        metrics::record_extraction_failures(missing as u64);
        if self.config.strict_extraction {
            return Err(WorkerError::ExtractionIncomplete { missing, total });
        }
        run.logger.log_warning(&format!(
            "{} of {} subclips missing, continuing",
            missing, total
        ));
        Ok(())
    }

    /// Probe every subclip but the last; the last clip's length never
    /// affects an offset.
    async fn probe_durations(&self, subclips: &mut [Subclip]) -> WorkerResult<()> {
        let last = subclips.len().saturating_sub(1);
        for clip in &mut subclips[..last] {
            clip.duration = Some(probe_duration(&self.engine, &clip.path).await?);
        }
        Ok(())
    }

    async fn hard_cut(&self, run: &Run<'_>, time_ranges: &[TimeRange]) -> WorkerResult<()> {
        run.enter(PipelineStage::Concatenating);
        run.logger
            .log_progress("no transition requested, joining ranges with hard cuts");

        let started = Instant::now();
        let result = trim_and_concat(
            &self.engine,
            run.source.path(),
            time_ranges,
            run.target,
            &run.encoding,
        )
        .await;
        metrics::record_ffmpeg_duration("trim_concat", started.elapsed().as_secs_f64());
        result?;
        Ok(())
    }

    async fn cleanup(&self, run: &Run<'_>) {
        run.enter(PipelineStage::Cleanup);
        let pattern = subclip_glob(&run.work_dir, &run.stem, &self.config.subclip_ext);
        match remove_matching(&pattern, &[run.target]).await {
            Ok(removed) => run
                .logger
                .log_progress(&format!("removed {} subclips matching {}", removed, pattern)),
            Err(e) => run
                .logger
                .log_warning(&format!("subclip cleanup failed for {}: {}", pattern, e)),
        }
    }
}
