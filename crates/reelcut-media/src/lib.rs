#![deny(unreachable_patterns)]
//! FFmpeg CLI wrapper for highlight reel assembly.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building over any number of inputs
//! - The [`MediaEngine`] capability trait and its FFmpeg process implementation
//! - Duration probing via FFprobe
//! - Sequential and concurrent subclip extraction
//! - Crossfade and hard-cut filter graph generation
//! - Single-invocation concatenation with existence-based success detection

pub mod command;
pub mod concat;
pub mod engine;
pub mod error;
pub mod extract;
pub mod filters;
pub mod fs_utils;
pub mod probe;
pub mod source;
pub mod subclip;

pub use command::FfmpegCommand;
pub use concat::{concat_with_transitions, trim_and_concat};
pub use engine::{EngineExit, FfmpegEngine, MediaEngine};
pub use error::{MediaError, MediaResult};
pub use extract::{extract_all, extract_concurrent, extract_sequential, extract_subclip, ExtractOptions};
pub use filters::{build_crossfade_graph, build_trim_concat_graph, transition_offsets, FilterGraph};
pub use probe::{probe_duration, probe_video, VideoInfo};
pub use source::SourceMedia;
pub use subclip::{plan_subclips, subclip_file_name, subclip_glob, Subclip};
