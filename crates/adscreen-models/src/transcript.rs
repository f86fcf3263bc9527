//! Audio transcripts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Marker emitted into the classifier prompt when transcription failed or
/// the creative has no audio. A literal marker (not an empty string) so the
/// classifier can tell "no transcript" apart from a silent ad.
pub const TRANSCRIPT_UNAVAILABLE_MARKER: &str = "[Audio Transcription Failed or No Audio]";

/// Text derived from a creative's audio track.
///
/// Never absent: transcription failure degrades to `Unavailable` rather
/// than blocking the visual-only assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case", tag = "kind", content = "text")]
pub enum Transcript {
    Text(String),
    Unavailable,
}

impl Transcript {
    /// Wrap transcription output, mapping blank output to `Unavailable`.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::Unavailable
        } else {
            Self::Text(text)
        }
    }

    /// The literal text handed to prompt assembly.
    pub fn as_prompt_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Unavailable => TRANSCRIPT_UNAVAILABLE_MARKER,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}
