//! Shared data models for the AdScreen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Creatives (the submitted video/image asset) and probe metadata
//! - Frame samples and bounded frame sequences
//! - Audio transcripts (with the "unavailable" sentinel)
//! - The normalized compliance verdict and its schema validator

pub mod creative;
pub mod frame;
pub mod sampling;
pub mod transcript;
pub mod validate;
pub mod verdict;

// Re-export common types
pub use creative::{Creative, MediaKind, VideoInfo};
pub use frame::{FrameError, FrameSample, FrameSequence};
pub use sampling::{CLASSIFIER_FRAME_CAP, DEFAULT_FRAME_INTERVAL_SECS, DEFAULT_MAX_FRAMES};
pub use transcript::{Transcript, TRANSCRIPT_UNAVAILABLE_MARKER};
pub use validate::{validate_verdict, ValidationError};
pub use verdict::{
    AnalysisResult, OverallStatus, PlatformStatus, PlatformVerdict, Platforms, VerdictDetails,
};
