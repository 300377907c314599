//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use reelcut_models::{EncodingConfig, DEFAULT_FADE_DURATION};

use crate::error::{WorkerError, WorkerResult};

/// Default number of concurrent extraction processes.
pub const DEFAULT_POOL_SIZE: usize = 4;
/// Default subclip container extension.
pub const DEFAULT_SUBCLIP_EXT: &str = "mp4";

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum concurrent extraction processes
    pub pool_size: usize,
    /// Video crossfade duration in seconds (audio uses twice this)
    pub fade_duration: f64,
    /// Container extension for intermediate subclips
    pub subclip_ext: String,
    /// Cut subclips with stream copy instead of re-encoding
    pub stream_copy: bool,
    /// Check ranges against the source duration and each other before extracting
    pub validate_ranges: bool,
    /// Fail the run when any subclip is missing after extraction
    pub strict_extraction: bool,
    /// Encoding settings for re-encoded subclips and the final output
    pub encoding: EncodingConfig,
    /// FFmpeg executable
    pub ffmpeg_path: String,
    /// FFprobe executable
    pub ffprobe_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            fade_duration: DEFAULT_FADE_DURATION,
            subclip_ext: DEFAULT_SUBCLIP_EXT.to_string(),
            stream_copy: false,
            validate_ranges: false,
            strict_extraction: false,
            encoding: EncodingConfig::default(),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_flag(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut encoding = defaults.encoding.clone();
        if let Ok(preset) = std::env::var("REELCUT_PRESET") {
            encoding.preset = preset;
        }
        if let Some(crf) = env_parse("REELCUT_CRF") {
            encoding.crf = crf;
        }

        Self {
            pool_size: env_parse("REELCUT_POOL_SIZE").unwrap_or(defaults.pool_size),
            fade_duration: env_parse("REELCUT_FADE_DURATION").unwrap_or(defaults.fade_duration),
            subclip_ext: std::env::var("REELCUT_SUBCLIP_EXT").unwrap_or(defaults.subclip_ext),
            stream_copy: env_flag("REELCUT_STREAM_COPY").unwrap_or(defaults.stream_copy),
            validate_ranges: env_flag("REELCUT_VALIDATE_RANGES").unwrap_or(defaults.validate_ranges),
            strict_extraction: env_flag("REELCUT_STRICT_EXTRACTION")
                .unwrap_or(defaults.strict_extraction),
            encoding,
            ffmpeg_path: std::env::var("FFMPEG_PATH").unwrap_or(defaults.ffmpeg_path),
            ffprobe_path: std::env::var("FFPROBE_PATH").unwrap_or(defaults.ffprobe_path),
        }
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> WorkerResult<()> {
        if self.pool_size == 0 {
            return Err(WorkerError::config_error("pool_size must be at least 1"));
        }
        if !self.fade_duration.is_finite() || self.fade_duration <= 0.0 {
            return Err(WorkerError::config_error(format!(
                "fade_duration must be a positive number of seconds, got {}",
                self.fade_duration
            )));
        }
        if self.subclip_ext.is_empty() || self.subclip_ext.contains(['/', '.']) {
            return Err(WorkerError::config_error(format!(
                "subclip_ext must be a bare extension, got '{}'",
                self.subclip_ext
            )));
        }
        Ok(())
    }
}
