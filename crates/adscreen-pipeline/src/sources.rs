//! Frame sources beyond the local sampler.

use async_trait::async_trait;

use adscreen_media::{MediaError, MediaResult};
use adscreen_models::{Creative, FrameSequence};

use crate::traits::FrameSource;

/// Frames extracted on the submitting side and delivered through the
/// ingress side channel. The sequence was validated at the boundary; this
/// source just hands it to the orchestrator.
#[derive(Debug, Clone)]
pub struct ProvidedFrames(FrameSequence);

impl ProvidedFrames {
    pub fn new(frames: FrameSequence) -> Self {
        Self(frames)
    }
}

#[async_trait]
impl FrameSource for ProvidedFrames {
    async fn frames(&self, _creative: &Creative) -> MediaResult<FrameSequence> {
        if self.0.is_empty() {
            return Err(MediaError::invalid_video("Empty frame sequence provided"));
        }
        Ok(self.0.clone())
    }
}
