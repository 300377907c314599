//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Extraction incomplete: {missing} of {total} subclips missing")]
    ExtractionIncomplete { missing: usize, total: usize },

    #[error("Media error: {0}")]
    Media(#[from] reelcut_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Short stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::ConfigError(_) => "config",
            WorkerError::ExtractionIncomplete { .. } => "extraction",
            WorkerError::Media(reelcut_media::MediaError::Extraction { .. }) => "extraction",
            WorkerError::Media(reelcut_media::MediaError::Concatenation { .. }) => "concatenation",
            WorkerError::Media(reelcut_media::MediaError::Probe { .. }) => "probe",
            WorkerError::Media(reelcut_media::MediaError::InvalidTimeRange(_)) => "invalid_range",
            WorkerError::Media(_) => "media",
            WorkerError::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcut_media::MediaError;

    #[test]
    fn test_kind_labels() {
        assert_eq!(WorkerError::config_error("x").kind(), "config");
        assert_eq!(
            WorkerError::from(MediaError::concatenation("/tmp/out.mp4")).kind(),
            "concatenation"
        );
        assert_eq!(
            WorkerError::from(MediaError::InvalidTimeRange("10-20 overlaps 15-25".into())).kind(),
            "invalid_range"
        );
        assert_eq!(
            WorkerError::ExtractionIncomplete { missing: 1, total: 3 }.to_string(),
            "Extraction incomplete: 1 of 3 subclips missing"
        );
    }
}
