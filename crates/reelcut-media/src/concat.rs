//! Final concatenation.
//!
//! Both entry points make exactly one engine invocation. Any file already at
//! the target is deleted first so a run never appends to or merges with an
//! earlier output, and success is decided solely by whether the target exists
//! afterwards. The engine's exit status is logged but not consulted.

use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

use reelcut_models::{EncodingConfig, TimeRange};

use crate::command::FfmpegCommand;
use crate::engine::MediaEngine;
use crate::error::{MediaError, MediaResult};
use crate::filters::{build_trim_concat_graph, FilterGraph};
use crate::fs_utils::remove_if_exists;
use crate::subclip::Subclip;

async fn run_replacing<E>(engine: &E, cmd: &FfmpegCommand) -> MediaResult<()>
where
    E: MediaEngine + ?Sized,
{
    let target = cmd.output_path();
    remove_if_exists(target).await?;

    let started = Instant::now();
    match engine.run(cmd).await {
        Ok(exit) if !exit.success() => warn!(
            target = %target.display(),
            exit_code = ?exit.code,
            "Engine reported failure, checking for output anyway"
        ),
        Ok(_) => {}
        Err(e) => warn!(target = %target.display(), "Engine invocation failed: {}", e),
    }

    if target.exists() {
        info!(
            target = %target.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Concatenated file created at {}",
            target.display()
        );
        Ok(())
    } else {
        Err(MediaError::concatenation(target))
    }
}

/// Join `subclips` with the crossfade `graph` into `target`.
///
/// `subclips` must be in the same order the graph was built from.
pub async fn concat_with_transitions<E>(
    engine: &E,
    subclips: &[Subclip],
    graph: &FilterGraph,
    target: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()>
where
    E: MediaEngine + ?Sized,
{
    let cmd = FfmpegCommand::without_inputs(target)
        .inputs(subclips.iter().map(|clip| &clip.path))
        .filter_complex(graph.text())
        .preset(&encoding.preset)
        .pixel_format(&encoding.pixel_format)
        .map(graph.video_map())
        .map(graph.audio_map());

    run_replacing(engine, &cmd).await
}

/// Cut every range out of `source` and hard-cut them together into `target`
/// in a single pass, without intermediate subclip files.
pub async fn trim_and_concat<E>(
    engine: &E,
    source: &Path,
    ranges: &[TimeRange],
    target: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()>
where
    E: MediaEngine + ?Sized,
{
    let graph = build_trim_concat_graph(ranges)?;
    let cmd = FfmpegCommand::new(source, target)
        .filter_complex(graph.text())
        .map(graph.video_map())
        .map(graph.audio_map())
        .preset(&encoding.preset)
        .pixel_format(&encoding.pixel_format);

    run_replacing(engine, &cmd).await
}
