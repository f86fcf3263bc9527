//! Frame sampling configuration constants.

/// Default spacing between sampled timestamps, in seconds.
pub const DEFAULT_FRAME_INTERVAL_SECS: f64 = 2.0;

/// Default cap on the number of interval-grid timestamps per creative.
/// The end-card rule may add one sample on top of this.
pub const DEFAULT_MAX_FRAMES: usize = 10;

/// Hard ceiling on frames submitted to the classifier, applied at
/// submission time independently of the sampler's own cap. Bounds
/// request size and per-call cost.
pub const CLASSIFIER_FRAME_CAP: usize = 10;

/// JPEG quality scale for captured frames (ffmpeg -q:v, 2..=31, higher is
/// smaller). Classification does not need full fidelity.
pub const FRAME_JPEG_QSCALE: u8 = 8;

/// Captured frames are downscaled to this width (height follows aspect).
pub const FRAME_SCALE_WIDTH: u32 = 512;
