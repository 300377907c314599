//! FFprobe video information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::engine::MediaEngine;
use crate::error::{MediaError, MediaResult};

/// Video file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Video codec
    pub codec: String,
    /// Number of video frames, when the container reports it
    pub frame_count: Option<u64>,
    /// Whether an audio stream is present
    pub has_audio: bool,
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
}

fn parse_output(path: &Path, json: &str) -> MediaResult<FfprobeOutput> {
    serde_json::from_str(json)
        .map_err(|e| MediaError::probe(path, format!("unreadable metadata: {}", e)))
}

fn format_duration(path: &Path, probe: &FfprobeOutput) -> MediaResult<f64> {
    let raw = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .ok_or_else(|| MediaError::probe(path, "no format.duration in metadata"))?;

    match raw.trim().parse::<f64>() {
        Ok(d) if d.is_finite() && d >= 0.0 => Ok(d),
        _ => Err(MediaError::probe(
            path,
            format!("unparseable duration '{}'", raw),
        )),
    }
}

/// Get a file's duration in seconds from `format.duration`.
pub async fn probe_duration<E>(engine: &E, path: impl AsRef<Path>) -> MediaResult<f64>
where
    E: MediaEngine + ?Sized,
{
    let path = path.as_ref();
    let json = engine.probe(path).await.map_err(|e| match e {
        MediaError::Probe { .. } => e,
        other => MediaError::probe(path, other.to_string()),
    })?;
    let duration = format_duration(path, &parse_output(path, &json)?)?;
    debug!(path = %path.display(), duration, "Probed duration");
    Ok(duration)
}

/// Probe a video file for information.
pub async fn probe_video<E>(engine: &E, path: impl AsRef<Path>) -> MediaResult<VideoInfo>
where
    E: MediaEngine + ?Sized,
{
    let path = path.as_ref();
    let probe = parse_output(path, &engine.probe(path).await?)?;

    // Find video stream
    let video_stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::probe(path, "no video stream found"))?;

    let duration = format_duration(path, &probe)?;

    // Parse frame rate
    let fps = video_stream
        .avg_frame_rate
        .as_ref()
        .or(video_stream.r_frame_rate.as_ref())
        .and_then(|r| parse_frame_rate(r))
        .unwrap_or(30.0);

    Ok(VideoInfo {
        duration,
        width: video_stream.width.unwrap_or(0),
        height: video_stream.height.unwrap_or(0),
        fps,
        codec: video_stream.codec_name.clone().unwrap_or_default(),
        frame_count: video_stream
            .nb_frames
            .as_ref()
            .and_then(|n| n.parse::<u64>().ok()),
        has_audio: probe.streams.iter().any(|s| s.codec_type == "audio"),
    })
}

/// Parse frame rate string (e.g., "30/1" or "29.97").
fn parse_frame_rate(s: &str) -> Option<f64> {
    if let Some((num, den)) = s.split_once('/') {
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    s.parse().ok()
}
