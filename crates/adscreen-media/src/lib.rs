//! FFmpeg CLI wrapper for creative frame sampling.
//!
//! Converts a variable-length video into a small, deterministic set of
//! compressed still frames, one seek+capture at a time. Still images pass
//! through as a single-sample sequence.

pub mod command;
pub mod error;
pub mod probe;
pub mod sampler;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use probe::probe_video;
pub use sampler::{plan_timestamps, FrameSampler};
