//! Subclip extraction.
//!
//! Each subclip is cut into its own file by one engine invocation. Two
//! strategies are offered: sequential, in list order, and concurrent, bounded
//! by a semaphore and joined before returning. Both only return once every
//! extraction has finished.
//!
//! Success is judged by the presence of the output file, never by the engine's
//! exit status.

use futures::future::join_all;
use std::path::Path;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use reelcut_models::{EncodingConfig, ExtractStrategy, TimeRange};

use crate::command::FfmpegCommand;
use crate::engine::MediaEngine;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::remove_if_exists;
use crate::subclip::Subclip;

/// How a single extraction is encoded.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Copy streams instead of re-encoding. Faster, but cuts snap to keyframes.
    pub stream_copy: bool,
    /// Encoding used when re-encoding
    pub encoding: EncodingConfig,
}

fn extract_command(
    source: &Path,
    range: &TimeRange,
    output: &Path,
    options: &ExtractOptions,
) -> FfmpegCommand {
    let cmd = FfmpegCommand::new(source, output)
        .seek(range.start())
        .duration(range.duration());

    if options.stream_copy {
        cmd.map("0").codec_copy()
    } else {
        cmd.map("0:v:0")
            .map("0:a:0?")
            .video_codec(&options.encoding.codec)
            .preset(&options.encoding.preset)
            .crf(options.encoding.crf)
            .audio_codec(&options.encoding.audio_codec)
            .audio_bitrate(&options.encoding.audio_bitrate)
    }
}

/// Cut `range` out of `source` into `output`.
///
/// Returns [`MediaError::Extraction`] if `output` does not exist afterwards.
pub async fn extract_subclip<E>(
    engine: &E,
    source: &Path,
    range: &TimeRange,
    output: &Path,
    options: &ExtractOptions,
) -> MediaResult<()>
where
    E: MediaEngine + ?Sized,
{
    debug!(
        "Extracting segment: {} -> {} (start: {:.2}s, duration: {:.2}s)",
        source.display(),
        output.display(),
        range.start(),
        range.duration()
    );

    // A stale file from an earlier run must not pass the existence check
    remove_if_exists(output).await?;

    let cmd = extract_command(source, range, output, options);
    if let Err(e) = engine.run(&cmd).await {
        warn!(output = %output.display(), "Extraction command failed to run: {}", e);
    }

    if output.exists() {
        debug!("Segment extracted: {}", output.display());
        Ok(())
    } else {
        Err(MediaError::extraction(output))
    }
}

/// Extract every subclip one at a time, in list order.
///
/// Results are returned in the same order as `subclips`.
pub async fn extract_sequential<E>(
    engine: &E,
    source: &Path,
    subclips: &[Subclip],
    options: &ExtractOptions,
) -> Vec<MediaResult<()>>
where
    E: MediaEngine + ?Sized,
{
    let mut results = Vec::with_capacity(subclips.len());
    for clip in subclips {
        results.push(extract_subclip(engine, source, &clip.range, &clip.path, options).await);
    }
    results
}

/// Extract subclips with at most `pool_size` engine processes at once.
///
/// Waits for every extraction before returning; a failing extraction does not
/// cancel the others. Results are returned in the same order as `subclips`.
pub async fn extract_concurrent<E>(
    engine: &E,
    source: &Path,
    subclips: &[Subclip],
    options: &ExtractOptions,
    pool_size: usize,
) -> Vec<MediaResult<()>>
where
    E: MediaEngine + ?Sized,
{
    let semaphore = Semaphore::new(pool_size.max(1));

    let futures: Vec<_> = subclips
        .iter()
        .map(|clip| {
            let semaphore = &semaphore;
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|_| MediaError::internal("extraction semaphore closed"))?;
                extract_subclip(engine, source, &clip.range, &clip.path, options).await
            }
        })
        .collect();

    join_all(futures).await
}

/// Run the chosen strategy over every subclip.
pub async fn extract_all<E>(
    engine: &E,
    strategy: ExtractStrategy,
    source: &Path,
    subclips: &[Subclip],
    options: &ExtractOptions,
    pool_size: usize,
) -> Vec<MediaResult<()>>
where
    E: MediaEngine + ?Sized,
{
    info!(
        strategy = %strategy,
        count = subclips.len(),
        "Extracting {} subclips from {}",
        subclips.len(),
        source.display()
    );

    match strategy {
        ExtractStrategy::Sequential => extract_sequential(engine, source, subclips, options).await,
        ExtractStrategy::Concurrent => {
            extract_concurrent(engine, source, subclips, options, pool_size).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineExit;
    use crate::subclip::plan_subclips;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Writes each command's output file, tracking peak parallelism.
    #[derive(Default)]
    struct RecordingEngine {
        active: AtomicUsize,
        peak: AtomicUsize,
        order: Mutex<Vec<String>>,
        skip_suffix: Option<&'static str>,
    }

    #[async_trait]
    impl MediaEngine for RecordingEngine {
        async fn probe(&self, _path: &Path) -> MediaResult<String> {
            Ok(r#"{"format": {"duration": "10.0"}}"#.to_string())
        }

        async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<EngineExit> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;

            let output = cmd.output_path().to_path_buf();
            self.order
                .lock()
                .unwrap()
                .push(output.file_name().unwrap().to_string_lossy().to_string());
            let skip = self
                .skip_suffix
                .map(|s| output.to_string_lossy().ends_with(s))
                .unwrap_or(false);
            if !skip {
                tokio::fs::write(&output, b"clip").await?;
            }

            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(EngineExit {
                code: Some(0),
                stderr: String::new(),
            })
        }
    }

    fn ranges(n: usize) -> Vec<TimeRange> {
        (0..n)
            .map(|i| {
                let start = 1000.0 + 300.0 * i as f64;
                TimeRange::new(start, start + 10.0).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_reencode_command() {
        let range = TimeRange::new(1000.0, 1010.0).unwrap();
        let cmd = extract_command(
            Path::new("src.mp4"),
            &range,
            Path::new("out.mp4"),
            &ExtractOptions::default(),
        );
        let args = cmd.build_args();
        let joined = args.join(" ");
        assert!(joined.contains("-ss 1000.000 -t 10.000 -i src.mp4"));
        assert!(joined.contains("-c:v libx264 -preset ultrafast"));
        assert!(!joined.contains("-c copy"));
    }

    #[test]
    fn test_stream_copy_command() {
        let range = TimeRange::new(5.0, 7.5).unwrap();
        let options = ExtractOptions {
            stream_copy: true,
            ..Default::default()
        };
        let cmd = extract_command(Path::new("src.mp4"), &range, Path::new("out.mp4"), &options);
        let joined = cmd.build_args().join(" ");
        assert!(joined.contains("-ss 5.000 -t 2.500 -i src.mp4 -map 0 -c copy out.mp4"));
    }

    #[tokio::test]
    async fn test_sequential_runs_in_order() {
        let dir = TempDir::new().unwrap();
        let engine = RecordingEngine::default();
        let subclips = plan_subclips("match", &ranges(3), dir.path(), "mp4");

        let results =
            extract_sequential(&engine, Path::new("match.mp4"), &subclips, &ExtractOptions::default())
                .await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(engine.peak.load(Ordering::SeqCst), 1);
        assert_eq!(
            *engine.order.lock().unwrap(),
            vec![
                "match_highlight_00001.mp4",
                "match_highlight_00002.mp4",
                "match_highlight_00003.mp4"
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_respects_pool_and_joins_all() {
        let dir = TempDir::new().unwrap();
        let engine = RecordingEngine::default();
        let subclips = plan_subclips("match", &ranges(8), dir.path(), "mp4");

        let results = extract_concurrent(
            &engine,
            Path::new("match.mp4"),
            &subclips,
            &ExtractOptions::default(),
            4,
        )
        .await;

        assert_eq!(results.len(), 8);
        assert!(results.iter().all(|r| r.is_ok()));
        assert!(subclips.iter().all(|s| s.path.exists()));
        let peak = engine.peak.load(Ordering::SeqCst);
        assert!(peak <= 4, "peak parallelism {} exceeded pool", peak);
        assert!(peak > 1, "extractions never overlapped");
    }

    #[tokio::test]
    async fn test_missing_output_is_extraction_error() {
        let dir = TempDir::new().unwrap();
        let engine = RecordingEngine {
            skip_suffix: Some("00002.mp4"),
            ..Default::default()
        };
        let subclips = plan_subclips("match", &ranges(3), dir.path(), "mp4");

        let results = extract_all(
            &engine,
            ExtractStrategy::Concurrent,
            Path::new("match.mp4"),
            &subclips,
            &ExtractOptions::default(),
            4,
        )
        .await;

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(MediaError::Extraction { .. })));
        // Siblings still complete
        assert!(results[2].is_ok());
    }

    #[tokio::test]
    async fn test_strategies_produce_same_files() {
        let seq_dir = TempDir::new().unwrap();
        let con_dir = TempDir::new().unwrap();
        let engine = RecordingEngine::default();
        let source = Path::new("match.mp4");

        let seq = plan_subclips("match", &ranges(5), seq_dir.path(), "mp4");
        let con = plan_subclips("match", &ranges(5), con_dir.path(), "mp4");
        extract_all(&engine, ExtractStrategy::Sequential, source, &seq, &ExtractOptions::default(), 4)
            .await;
        extract_all(&engine, ExtractStrategy::Concurrent, source, &con, &ExtractOptions::default(), 4)
            .await;

        for (a, b) in seq.iter().zip(&con) {
            assert_eq!(a.path.file_name(), b.path.file_name());
            assert_eq!(
                std::fs::read(&a.path).unwrap(),
                std::fs::read(&b.path).unwrap()
            );
        }
    }
}
