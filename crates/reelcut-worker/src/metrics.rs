//! Pipeline metrics.
//!
//! Recording is a no-op until the embedding application installs a recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const SUBCLIPS_EXTRACTED_TOTAL: &str = "reelcut_subclips_extracted_total";
    pub const EXTRACTION_FAILURES_TOTAL: &str = "reelcut_extraction_failures_total";
    pub const RUNS_TOTAL: &str = "reelcut_runs_total";
    pub const FFMPEG_DURATION_SECONDS: &str = "reelcut_ffmpeg_duration_seconds";
}

/// Record successfully extracted subclips.
pub fn record_subclips_extracted(count: u64) {
    counter!(names::SUBCLIPS_EXTRACTED_TOTAL).increment(count);
}

/// Record subclips missing after extraction.
pub fn record_extraction_failures(count: u64) {
    counter!(names::EXTRACTION_FAILURES_TOTAL).increment(count);
}

/// Record a finished run.
pub fn record_run(status: &str) {
    let labels = [("status", status.to_string())];
    counter!(names::RUNS_TOTAL, &labels).increment(1);
}

/// Record time spent in engine invocations for one stage.
pub fn record_ffmpeg_duration(stage: &str, duration_secs: f64) {
    let labels = [("stage", stage.to_string())];
    histogram!(names::FFMPEG_DURATION_SECONDS, &labels).record(duration_secs);
}
