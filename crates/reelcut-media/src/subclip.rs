//! Subclip naming and planning.

use std::path::{Path, PathBuf};

use reelcut_models::TimeRange;

/// Infix shared by every subclip file name.
pub const SUBCLIP_INFIX: &str = "_highlight_";

/// One extracted segment of the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Subclip {
    /// 1-based position in the requested time range list
    pub ordinal: usize,
    /// Segment of the source this file covers
    pub range: TimeRange,
    /// Where the segment is written
    pub path: PathBuf,
    /// Probed duration, filled in before graph building
    pub duration: Option<f64>,
}

impl Subclip {
    pub fn new(ordinal: usize, range: TimeRange, path: impl Into<PathBuf>) -> Self {
        Self {
            ordinal,
            range,
            path: path.into(),
            duration: None,
        }
    }
}

/// `<stem>_highlight_<NNNNN>.<ext>`
pub fn subclip_file_name(stem: &str, ordinal: usize, ext: &str) -> String {
    format!("{}{}{:05}.{}", stem, SUBCLIP_INFIX, ordinal, ext)
}

/// Glob pattern matching every subclip of `stem` inside `dir`.
pub fn subclip_glob(dir: &Path, stem: &str, ext: &str) -> String {
    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let escaped_stem = glob::Pattern::escape(stem);
    let sep = if escaped_dir.is_empty() || escaped_dir.ends_with('/') {
        ""
    } else {
        "/"
    };
    format!(
        "{}{}{}{}*.{}",
        escaped_dir,
        sep,
        escaped_stem,
        SUBCLIP_INFIX,
        glob::Pattern::escape(ext)
    )
}

/// Assign an output path to every range, numbering from 1 in list order.
pub fn plan_subclips(stem: &str, ranges: &[TimeRange], dir: &Path, ext: &str) -> Vec<Subclip> {
    ranges
        .iter()
        .enumerate()
        .map(|(i, range)| {
            let ordinal = i + 1;
            Subclip::new(ordinal, *range, dir.join(subclip_file_name(stem, ordinal, ext)))
        })
        .collect()
}
