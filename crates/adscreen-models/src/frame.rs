//! Frame samples and bounded frame sequences.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sampling::DEFAULT_FRAME_INTERVAL_SECS;

/// Errors raised when a frame sequence invariant would be violated.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("timestamp {0} is not after the previous sample")]
    NonIncreasingTimestamp(f64),

    #[error("negative timestamp: {0}")]
    NegativeTimestamp(f64),

    #[error("frame sequence is empty")]
    Empty,
}

/// A single compressed still image captured at a specific timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FrameSample {
    /// Capture position in seconds from the start of the creative.
    pub timestamp_secs: f64,
    /// MIME type of the encoded payload.
    pub mime_type: String,
    /// Base64-encoded image payload (no data-URL prefix).
    pub image_base64: String,
}

impl FrameSample {
    /// A JPEG sample. Video captures and side-channel frames are always
    /// JPEG; still-image passthrough uses [`FrameSample::with_mime`].
    pub fn new(timestamp_secs: f64, image_base64: impl Into<String>) -> Self {
        Self::with_mime(timestamp_secs, "image/jpeg", image_base64)
    }

    pub fn with_mime(
        timestamp_secs: f64,
        mime_type: impl Into<String>,
        image_base64: impl Into<String>,
    ) -> Self {
        Self {
            timestamp_secs,
            mime_type: mime_type.into(),
            image_base64: image_base64.into(),
        }
    }

    /// Render as a data URL suitable for a multimodal classifier request.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.image_base64)
    }
}

/// An ordered, finite sequence of frame samples.
///
/// Invariant: timestamps are strictly increasing and unique within one
/// sequence. Image creatives always produce a one-element sequence at
/// timestamp 0.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FrameSequence(Vec<FrameSample>);

impl FrameSequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Wrap a single still image as a one-element sequence at timestamp 0.
    /// The payload passes through verbatim, so the label must carry the
    /// upload's actual MIME type.
    pub fn single_image(mime_type: impl Into<String>, image_base64: impl Into<String>) -> Self {
        Self(vec![FrameSample::with_mime(0.0, mime_type, image_base64)])
    }

    /// Build a sequence from ordered base64 images delivered as an ingress
    /// side channel. The wire format carries no timestamps, so they are
    /// synthesized on the sampling interval grid to keep the
    /// strictly-increasing invariant.
    pub fn from_ordered_images<I, S>(images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            images
                .into_iter()
                .enumerate()
                .map(|(i, img)| FrameSample::new(i as f64 * DEFAULT_FRAME_INTERVAL_SECS, img))
                .collect(),
        )
    }

    /// Append a sample, enforcing the timestamp invariant.
    pub fn push(&mut self, sample: FrameSample) -> Result<(), FrameError> {
        if sample.timestamp_secs < 0.0 {
            return Err(FrameError::NegativeTimestamp(sample.timestamp_secs));
        }
        if let Some(last) = self.0.last() {
            if sample.timestamp_secs <= last.timestamp_secs {
                return Err(FrameError::NonIncreasingTimestamp(sample.timestamp_secs));
            }
        }
        self.0.push(sample);
        Ok(())
    }

    /// Truncate to at most `cap` samples, keeping the earliest.
    pub fn truncate(&mut self, cap: usize) {
        self.0.truncate(cap);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FrameSample> {
        self.0.iter()
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.0
    }
}

impl IntoIterator for FrameSequence {
    type Item = FrameSample;
    type IntoIter = std::vec::IntoIter<FrameSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_enforces_strictly_increasing() {
        let mut seq = FrameSequence::new();
        seq.push(FrameSample::new(0.0, "a")).unwrap();
        seq.push(FrameSample::new(2.0, "b")).unwrap();
        assert!(seq.push(FrameSample::new(2.0, "c")).is_err());
        assert!(seq.push(FrameSample::new(1.0, "d")).is_err());
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn test_push_rejects_negative_timestamp() {
        let mut seq = FrameSequence::new();
        assert!(seq.push(FrameSample::new(-0.5, "a")).is_err());
    }

    #[test]
    fn test_single_image_sequence() {
        let seq = FrameSequence::single_image("image/png", "payload");
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.samples()[0].timestamp_secs, 0.0);
        assert_eq!(seq.samples()[0].mime_type, "image/png");
    }

    #[test]
    fn test_from_ordered_images_synthesizes_grid_timestamps() {
        let seq = FrameSequence::from_ordered_images(["a", "b", "c"]);
        let ts: Vec<f64> = seq.iter().map(|s| s.timestamp_secs).collect();
        assert_eq!(ts, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_truncate() {
        let mut seq = FrameSequence::from_ordered_images((0..15).map(|i| format!("f{i}")));
        seq.truncate(10);
        assert_eq!(seq.len(), 10);
    }

    #[test]
    fn test_data_url_defaults_to_jpeg() {
        let sample = FrameSample::new(0.0, "abc123");
        assert_eq!(sample.data_url(), "data:image/jpeg;base64,abc123");
    }

    #[test]
    fn test_data_url_carries_sample_mime() {
        let sample = FrameSample::with_mime(0.0, "image/png", "abc123");
        assert_eq!(sample.data_url(), "data:image/png;base64,abc123");
    }
}
