//! Highlight reel pipeline orchestration.
//!
//! This crate provides:
//! - [`Pipeline`], which extracts subclips and joins them into one reel
//! - Environment-driven configuration
//! - Run-scoped structured logging and metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::RunLogger;
pub use pipeline::{Pipeline, PipelineStage};
