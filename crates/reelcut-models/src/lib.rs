//! Shared data models for the reelcut highlight pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Time ranges selected from a source video
//! - Transition effects and crossfade timing
//! - Encoding configuration
//! - Pipeline status and results

pub mod encoding;
pub mod pipeline;
pub mod time_range;
pub mod timestamp;
pub mod transition;

// Re-export common types
pub use encoding::EncodingConfig;
pub use pipeline::{ExtractStrategy, PipelineResult, PipelineStatus, StrategyParseError};
pub use time_range::{TimeRange, TimeRangeError};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
pub use transition::{Transition, TransitionParseError, TransitionSpec, DEFAULT_FADE_DURATION};
