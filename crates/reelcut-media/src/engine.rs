//! External transcoding engine capability.
//!
//! The pipeline never decodes media itself. Everything goes through a
//! [`MediaEngine`]: metadata inspection and command execution. The production
//! implementation shells out to `ffprobe` and `ffmpeg`; tests substitute fakes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};

/// Exit information from one engine invocation.
///
/// Callers decide success by inspecting the filesystem, so this is
/// informational only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineExit {
    /// Process exit code, `None` if killed by a signal
    pub code: Option<i32>,
    /// Captured stderr
    pub stderr: String,
}

impl EngineExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Black-box media engine.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Return the raw JSON metadata document for a file
    /// (`ffprobe -print_format json -show_format -show_streams`).
    async fn probe(&self, path: &Path) -> MediaResult<String>;

    /// Execute a transcoding command to completion. No timeout is applied.
    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<EngineExit>;
}

/// [`MediaEngine`] backed by the `ffmpeg` and `ffprobe` executables.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegEngine {
    /// Use `ffmpeg` and `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self::with_binaries("ffmpeg", "ffprobe")
    }

    /// Use explicit executables.
    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Resolve both executables, failing if either is missing.
    pub fn check(&self) -> MediaResult<(PathBuf, PathBuf)> {
        let ffmpeg = which::which(&self.ffmpeg)
            .map_err(|_| MediaError::FfmpegNotFound(self.ffmpeg.clone()))?;
        let ffprobe = which::which(&self.ffprobe)
            .map_err(|_| MediaError::FfprobeNotFound(self.ffprobe.clone()))?;
        Ok((ffmpeg, ffprobe))
    }
}

#[async_trait]
impl MediaEngine for FfmpegEngine {
    async fn probe(&self, path: &Path) -> MediaResult<String> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        which::which(&self.ffprobe).map_err(|_| MediaError::FfprobeNotFound(self.ffprobe.clone()))?;

        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(MediaError::probe(
                path,
                format!(
                    "ffprobe exited with {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<EngineExit> {
        which::which(&self.ffmpeg).map_err(|_| MediaError::FfmpegNotFound(self.ffmpeg.clone()))?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: {} {}", self.ffmpeg.display(), args.join(" "));

        let started = Instant::now();
        let output = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let exit = EngineExit {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if exit.success() {
            debug!(
                output = %cmd.output_path().display(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "FFmpeg finished"
            );
        } else {
            warn!(
                output = %cmd.output_path().display(),
                exit_code = ?exit.code,
                stderr = %exit.stderr.trim(),
                "FFmpeg exited with non-zero status"
            );
        }

        Ok(exit)
    }
}
