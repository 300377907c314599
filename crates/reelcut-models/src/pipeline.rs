//! Pipeline strategy and result types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// How subclips are cut out of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractStrategy {
    /// One extraction at a time, in time range order
    Sequential,
    /// Bounded worker pool with a join barrier
    #[default]
    Concurrent,
}

impl ExtractStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractStrategy::Sequential => "sequential",
            ExtractStrategy::Concurrent => "concurrent",
        }
    }
}

impl fmt::Display for ExtractStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExtractStrategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(ExtractStrategy::Sequential),
            "concurrent" => Ok(ExtractStrategy::Concurrent),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown extraction strategy: {0}")]
pub struct StrategyParseError(String);

/// Terminal status of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Success,
    Failure,
}

impl PipelineStatus {
    /// Numeric status code: `0` on success, `-1` on failure.
    pub fn code(&self) -> i32 {
        match self {
            PipelineStatus::Success => 0,
            PipelineStatus::Failure => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Success => "success",
            PipelineStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    /// Final output path, only set on success
    pub output: Option<PathBuf>,
}

impl PipelineResult {
    pub fn success(output: impl Into<PathBuf>) -> Self {
        Self {
            status: PipelineStatus::Success,
            output: Some(output.into()),
        }
    }

    pub fn failure() -> Self {
        Self {
            status: PipelineStatus::Failure,
            output: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }

    pub fn code(&self) -> i32 {
        self.status.code()
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}
