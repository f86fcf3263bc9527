//! Pipeline stage tracking.

/// Stage of one analysis invocation.
///
/// Transcribing has no failure edge of its own: a transcription error
/// rejoins the main line with the sentinel transcript substituted. All
/// later stages can transition to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Transcribing,
    Sampling,
    Classifying,
    Validating,
    Done,
    Failed,
}

impl AnalysisStage {
    /// Returns the stage as a string for structured logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcribing => "transcribing",
            Self::Sampling => "sampling",
            Self::Classifying => "classifying",
            Self::Validating => "validating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}
