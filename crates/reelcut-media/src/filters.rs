//! FFmpeg filter graph generation.
//!
//! Two graphs are produced here:
//! - the crossfade graph, which joins N subclip inputs with a linear chain of
//!   `xfade` nodes and an isomorphic chain of `acrossfade` nodes;
//! - the hard-cut graph, which trims N ranges out of a single source input and
//!   joins them with one `concat` node.
//!
//! Input indices in both graphs are positional: they must match the order in
//! which inputs are passed to FFmpeg.

use reelcut_models::encoding::DEFAULT_PIXEL_FORMAT;
use reelcut_models::{TimeRange, TransitionSpec};

use crate::error::{MediaError, MediaResult};
use crate::subclip::Subclip;

/// Label of the final video stream.
pub const VIDEO_OUTPUT_LABEL: &str = "video";
/// Label of the final audio stream.
pub const AUDIO_OUTPUT_LABEL: &str = "audio";

/// Filter graph text plus the labels to map into the output.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    text: String,
    transitions: usize,
}

impl FilterGraph {
    fn new(text: String, transitions: usize) -> Self {
        Self { text, transitions }
    }

    /// The `-filter_complex` argument.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `-map` argument for the video output.
    pub fn video_map(&self) -> String {
        format!("[{}]", VIDEO_OUTPUT_LABEL)
    }

    /// `-map` argument for the audio output.
    pub fn audio_map(&self) -> String {
        format!("[{}]", AUDIO_OUTPUT_LABEL)
    }

    /// Number of joins between consecutive segments.
    pub fn transition_count(&self) -> usize {
        self.transitions
    }
}

/// Offset of each video transition on the crossfaded timeline.
///
/// `durations[k]` is the length of clip `k + 1`. Transition `i` (1-based)
/// starts at the cumulative length of clips `1..=i`, minus one fade for each
/// of the `i` overlaps already introduced.
pub fn transition_offsets(durations: &[f64], fade_duration: f64) -> Vec<f64> {
    let mut cumulative = 0.0;
    durations
        .iter()
        .enumerate()
        .map(|(idx, duration)| {
            cumulative += duration;
            cumulative - fade_duration * (idx + 1) as f64
        })
        .collect()
}

/// Build the crossfade graph for `subclips`, in the order they will be passed
/// to FFmpeg.
///
/// Every subclip except the last must carry a probed duration. Fewer than two
/// subclips is an error: a single clip is copied, not filtered.
pub fn build_crossfade_graph(subclips: &[Subclip], spec: &TransitionSpec) -> MediaResult<FilterGraph> {
    let n = subclips.len();
    if n < 2 {
        return Err(MediaError::invalid_graph(format!(
            "crossfade needs at least 2 subclips, got {}",
            n
        )));
    }
    if !spec.transition.is_crossfade() {
        return Err(MediaError::invalid_graph(
            "hard cuts are built with build_trim_concat_graph",
        ));
    }
    if !spec.fade_duration.is_finite() || spec.fade_duration <= 0.0 {
        return Err(MediaError::invalid_graph(format!(
            "fade duration must be positive, got {}",
            spec.fade_duration
        )));
    }

    let durations = subclips[..n - 1]
        .iter()
        .map(|clip| {
            clip.duration.ok_or_else(|| {
                MediaError::invalid_graph(format!(
                    "subclip {} has no probed duration",
                    clip.ordinal
                ))
            })
        })
        .collect::<MediaResult<Vec<f64>>>()?;
    let offsets = transition_offsets(&durations, spec.fade_duration);

    let mut clauses = Vec::with_capacity(3 * n - 2);

    // Common timebase for every video input
    for i in 0..n {
        clauses.push(format!("[{i}:v]settb=AVTB[v{i}]"));
    }

    let mut last_video = "v0".to_string();
    for (i, offset) in (1..n).zip(&offsets) {
        let sink = if i == n - 1 {
            format!(",format={}[{}]", DEFAULT_PIXEL_FORMAT, VIDEO_OUTPUT_LABEL)
        } else {
            format!("[vx{i}]")
        };
        clauses.push(format!(
            "[{last_video}][v{i}]xfade=transition={}:duration={:.6}:offset={:.6}{sink}",
            spec.transition.as_str(),
            spec.fade_duration,
            offset,
        ));
        last_video = format!("vx{i}");
    }

    let mut last_audio = "0:a".to_string();
    for i in 1..n {
        let sink = if i == n - 1 {
            AUDIO_OUTPUT_LABEL.to_string()
        } else {
            format!("ax{i}")
        };
        clauses.push(format!(
            "[{last_audio}][{i}:a]acrossfade=d={:.6}[{sink}]",
            spec.audio_fade_duration(),
        ));
        last_audio = sink;
    }

    Ok(FilterGraph::new(clauses.join(";"), n - 1))
}

/// Build a single-pass hard-cut graph that trims every range out of input 0
/// and concatenates the pieces in order.
pub fn build_trim_concat_graph(ranges: &[TimeRange]) -> MediaResult<FilterGraph> {
    let n = ranges.len();
    if n == 0 {
        return Err(MediaError::EmptyTimeRanges);
    }

    let video_copies: String = (1..=n).map(|i| format!("[vcopy{i}]")).collect();
    let audio_copies: String = (1..=n).map(|i| format!("[acopy{i}]")).collect();

    let mut clauses = vec![
        format!("[0:v]split={n}{video_copies}"),
        format!("[0:a]asplit={n}{audio_copies}"),
    ];

    for (i, range) in (1..=n).zip(ranges) {
        clauses.push(format!(
            "[vcopy{i}]trim={:.3}:{:.3},setpts=PTS-STARTPTS[v{i}]",
            range.start(),
            range.end()
        ));
        clauses.push(format!(
            "[acopy{i}]atrim={:.3}:{:.3},asetpts=PTS-STARTPTS[a{i}]",
            range.start(),
            range.end()
        ));
    }

    let pairs: String = (1..=n).map(|i| format!("[v{i}][a{i}]")).collect();
    clauses.push(format!(
        "{pairs}concat=n={n}:v=1:a=1[{}][{}]",
        VIDEO_OUTPUT_LABEL, AUDIO_OUTPUT_LABEL
    ));

    Ok(FilterGraph::new(clauses.join(";"), n - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcut_models::Transition;
    use std::path::PathBuf;

    fn clips(durations: &[f64]) -> Vec<Subclip> {
        durations
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let start = 1000.0 + 300.0 * i as f64;
                let mut clip = Subclip::new(
                    i + 1,
                    TimeRange::new(start, start + d).unwrap(),
                    PathBuf::from(format!("clip_{}.mp4", i + 1)),
                );
                clip.duration = Some(*d);
                clip
            })
            .collect()
    }

    fn offsets_in(graph: &FilterGraph) -> Vec<String> {
        graph
            .text()
            .split("offset=")
            .skip(1)
            .map(|rest| rest.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect())
            .collect()
    }

    #[test]
    fn test_three_clip_scenario() {
        let graph = build_crossfade_graph(&clips(&[10.0, 10.0, 10.0]), &TransitionSpec::default())
            .unwrap();

        assert_eq!(graph.text().matches("xfade=").count(), 2);
        assert_eq!(graph.text().matches("acrossfade=").count(), 2);
        assert_eq!(graph.text().matches("settb=AVTB").count(), 3);
        assert_eq!(offsets_in(&graph), vec!["9.700000", "19.400000"]);
        assert_eq!(graph.transition_count(), 2);
    }

    #[test]
    fn test_full_graph_text() {
        let graph = build_crossfade_graph(&clips(&[10.0, 10.0, 10.0]), &TransitionSpec::default())
            .unwrap();

        let expected = [
            "[0:v]settb=AVTB[v0]",
            "[1:v]settb=AVTB[v1]",
            "[2:v]settb=AVTB[v2]",
            "[v0][v1]xfade=transition=fade:duration=0.300000:offset=9.700000[vx1]",
            "[vx1][v2]xfade=transition=fade:duration=0.300000:offset=19.400000,format=yuv420p[video]",
            "[0:a][1:a]acrossfade=d=0.600000[ax1]",
            "[ax1][2:a]acrossfade=d=0.600000[audio]",
        ]
        .join(";");
        assert_eq!(graph.text(), expected);
        assert_eq!(graph.video_map(), "[video]");
        assert_eq!(graph.audio_map(), "[audio]");
    }

    #[test]
    fn test_chain_is_linear() {
        let n = 6;
        let graph =
            build_crossfade_graph(&clips(&vec![8.0; n]), &TransitionSpec::default()).unwrap();
        let text = graph.text();

        assert_eq!(text.matches("xfade=transition").count(), n - 1);
        assert_eq!(text.matches("acrossfade").count(), n - 1);
        assert!(text.contains("[v0][v1]xfade"));
        assert!(text.contains("[0:a][1:a]acrossfade"));
        for i in 2..n {
            assert!(text.contains(&format!("[vx{}][v{}]xfade", i - 1, i)));
            assert!(text.contains(&format!("[ax{}][{}:a]acrossfade", i - 1, i)));
        }
        assert_eq!(text.matches("[video]").count(), 1);
        assert_eq!(text.matches("[audio]").count(), 1);
    }

    #[test]
    fn test_offsets_for_equal_clips() {
        let (len, fade) = (12.5, 0.3);
        let offsets = transition_offsets(&[len; 7], fade);
        for (idx, offset) in offsets.iter().enumerate() {
            let i = (idx + 1) as f64;
            assert!((offset - (i * len - fade * i)).abs() < 1e-9);
        }
        assert!(offsets.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_offsets_for_uneven_clips() {
        let offsets = transition_offsets(&[4.0, 6.5, 2.0], 0.5);
        assert_eq!(offsets, vec![3.5, 9.5, 11.0]);
    }

    #[test]
    fn test_last_clip_duration_not_required() {
        let mut subclips = clips(&[10.0, 10.0]);
        subclips[1].duration = None;
        assert!(build_crossfade_graph(&subclips, &TransitionSpec::default()).is_ok());

        subclips[0].duration = None;
        assert!(matches!(
            build_crossfade_graph(&subclips, &TransitionSpec::default()),
            Err(MediaError::InvalidGraph(_))
        ));
    }

    #[test]
    fn test_rejects_single_clip_and_hard_cuts() {
        let spec = TransitionSpec::default();
        assert!(build_crossfade_graph(&clips(&[10.0]), &spec).is_err());

        let cut = TransitionSpec::new(Transition::None, 0.3);
        assert!(build_crossfade_graph(&clips(&[10.0, 10.0]), &cut).is_err());

        let zero = TransitionSpec::new(Transition::Fade, 0.0);
        assert!(build_crossfade_graph(&clips(&[10.0, 10.0]), &zero).is_err());
    }

    #[test]
    fn test_transition_name_and_custom_fade() {
        let spec = TransitionSpec::new(Transition::WipeLeft, 0.5);
        let graph = build_crossfade_graph(&clips(&[5.0, 5.0]), &spec).unwrap();
        assert!(graph
            .text()
            .contains("xfade=transition=wipeleft:duration=0.500000:offset=4.500000"));
        assert!(graph.text().contains("acrossfade=d=1.000000[audio]"));
    }

    #[test]
    fn test_trim_concat_graph() {
        let ranges = vec![
            TimeRange::new(1000.0, 1010.0).unwrap(),
            TimeRange::new(1300.0, 1310.5).unwrap(),
        ];
        let graph = build_trim_concat_graph(&ranges).unwrap();
        let text = graph.text();

        assert!(text.starts_with("[0:v]split=2[vcopy1][vcopy2];[0:a]asplit=2[acopy1][acopy2]"));
        assert!(text.contains("[vcopy2]trim=1300.000:1310.500,setpts=PTS-STARTPTS[v2]"));
        assert!(text.contains("[acopy1]atrim=1000.000:1010.000,asetpts=PTS-STARTPTS[a1]"));
        assert!(text.ends_with("[v1][a1][v2][a2]concat=n=2:v=1:a=1[video][audio]"));
        assert_eq!(graph.transition_count(), 1);

        assert!(matches!(
            build_trim_concat_graph(&[]),
            Err(MediaError::EmptyTimeRanges)
        ));
    }
}
