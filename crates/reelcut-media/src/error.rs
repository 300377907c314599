//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found: {0}")]
    FfmpegNotFound(PathBuf),

    #[error("FFprobe not found: {0}")]
    FfprobeNotFound(PathBuf),

    /// Duration or metadata could not be read from a file.
    #[error("Probe failed for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// A subclip file is missing after its extraction ran.
    #[error("Extraction failed: expected subclip {path} was not written")]
    Extraction { path: PathBuf },

    /// The final output is missing after the concatenation ran.
    #[error("Concatenation failed: expected output {path} was not written")]
    Concatenation { path: PathBuf },

    #[error("Invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("No time ranges given")]
    EmptyTimeRanges,

    #[error("Invalid filter graph input: {0}")]
    InvalidGraph(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a probe failure error.
    pub fn probe(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an extraction failure error.
    pub fn extraction(path: impl Into<PathBuf>) -> Self {
        Self::Extraction { path: path.into() }
    }

    /// Create a concatenation failure error.
    pub fn concatenation(path: impl Into<PathBuf>) -> Self {
        Self::Concatenation { path: path.into() }
    }

    /// Create an invalid graph input error.
    pub fn invalid_graph(message: impl Into<String>) -> Self {
        Self::InvalidGraph(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}
