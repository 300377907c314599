//! Source media reference with a memoized duration.

use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;

use crate::engine::MediaEngine;
use crate::error::MediaResult;
use crate::probe::probe_duration;

/// The input container for one pipeline run.
///
/// The duration is probed on first use and reused for the rest of the run.
#[derive(Debug)]
pub struct SourceMedia {
    path: PathBuf,
    duration: OnceCell<f64>,
}

impl SourceMedia {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            duration: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name up to the first `.`, used to name subclips.
    pub fn stem(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy())
            .and_then(|n| n.split('.').next().map(str::to_string))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "source".to_string())
    }

    /// Probed duration in seconds, resolved at most once.
    pub async fn duration<E>(&self, engine: &E) -> MediaResult<f64>
    where
        E: MediaEngine + ?Sized,
    {
        self.duration
            .get_or_try_init(|| probe_duration(engine, &self.path))
            .await
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FfmpegCommand;
    use crate::engine::EngineExit;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProbe {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MediaEngine for CountingProbe {
        async fn probe(&self, _path: &Path) -> MediaResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"format": {"duration": "5400.0"}}"#.to_string())
        }

        async fn run(&self, _cmd: &FfmpegCommand) -> MediaResult<EngineExit> {
            Ok(EngineExit::default())
        }
    }

    #[test]
    fn test_stem() {
        assert_eq!(SourceMedia::new("/videos/match.final.mp4").stem(), "match");
        assert_eq!(SourceMedia::new("clip.mkv").stem(), "clip");
        assert_eq!(SourceMedia::new("/").stem(), "source");
    }

    #[tokio::test]
    async fn test_duration_is_memoized() {
        let engine = CountingProbe::default();
        let source = SourceMedia::new("match.mp4");

        assert_eq!(source.duration(&engine).await.unwrap(), 5400.0);
        assert_eq!(source.duration(&engine).await.unwrap(), 5400.0);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }
}
