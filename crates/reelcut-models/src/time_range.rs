//! Time ranges selected from a source video.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::timestamp::{format_seconds, parse_timestamp, TimestampError};

/// A `[start, end)` segment of the source, in seconds.
///
/// Always satisfies `0 <= start < end`. Serialized as a `[start, end]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct TimeRange {
    start: f64,
    end: f64,
}

impl TimeRange {
    /// Create a validated time range.
    pub fn new(start: f64, end: f64) -> Result<Self, TimeRangeError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TimeRangeError::NotFinite);
        }
        if start < 0.0 {
            return Err(TimeRangeError::NegativeStart(start));
        }
        if start >= end {
            return Err(TimeRangeError::StartNotBeforeEnd { start, end });
        }
        Ok(Self { start, end })
    }

    /// Start offset in seconds.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End offset in seconds (exclusive).
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Length of the range in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether two ranges share any part of the timeline.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl TryFrom<(f64, f64)> for TimeRange {
    type Error = TimeRangeError;

    fn try_from((start, end): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(start, end)
    }
}

impl From<TimeRange> for (f64, f64) {
    fn from(range: TimeRange) -> Self {
        (range.start, range.end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_seconds(self.start), format_seconds(self.end))
    }
}

/// Parses `START-END`, where each side is a timestamp (`SS`, `MM:SS`, `HH:MM:SS`).
impl FromStr for TimeRange {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| TimeRangeError::InvalidFormat(s.to_string()))?;
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }
}

/// Time range validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeRangeError {
    #[error("Time range bounds must be finite")]
    NotFinite,

    #[error("Time range start cannot be negative: {0}")]
    NegativeStart(f64),

    #[error("Time range start ({start}) must be before end ({end})")]
    StartNotBeforeEnd { start: f64, end: f64 },

    #[error("Invalid time range '{0}'. Use START-END, e.g. 16:40-16:50")]
    InvalidFormat(String),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_invalid_bounds() {
        assert!(TimeRange::new(0.0, 1.0).is_ok());
        assert_eq!(
            TimeRange::new(-1.0, 1.0),
            Err(TimeRangeError::NegativeStart(-1.0))
        );
        assert!(matches!(
            TimeRange::new(5.0, 5.0),
            Err(TimeRangeError::StartNotBeforeEnd { .. })
        ));
        assert_eq!(TimeRange::new(0.0, f64::NAN), Err(TimeRangeError::NotFinite));
    }

    #[test]
    fn test_parse_range() {
        let range: TimeRange = "16:40-16:50".parse().unwrap();
        assert_eq!(range.start(), 1000.0);
        assert_eq!(range.end(), 1010.0);
        assert_eq!(range.duration(), 10.0);

        let range: TimeRange = "1300-1310.5".parse().unwrap();
        assert_eq!(range.end(), 1310.5);

        assert!(matches!(
            "1300".parse::<TimeRange>(),
            Err(TimeRangeError::InvalidFormat(_))
        ));
        assert!(matches!(
            "20-10".parse::<TimeRange>(),
            Err(TimeRangeError::StartNotBeforeEnd { .. })
        ));
    }

    #[test]
    fn test_overlaps() {
        let a = TimeRange::new(0.0, 10.0).unwrap();
        let b = TimeRange::new(5.0, 15.0).unwrap();
        let c = TimeRange::new(10.0, 20.0).unwrap();
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_serde_pair_validates() {
        let range: TimeRange = serde_json::from_str("[1000, 1010]").unwrap();
        assert_eq!(range.duration(), 10.0);
        assert_eq!(serde_json::to_string(&range).unwrap(), "[1000.0,1010.0]");
        assert!(serde_json::from_str::<TimeRange>("[10, 5]").is_err());
    }
}
