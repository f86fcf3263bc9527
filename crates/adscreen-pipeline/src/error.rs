//! Pipeline error types.
//!
//! Exactly one failure class (transcription) is absorbed inside the
//! orchestrator; everything here aborts the invocation.

use thiserror::Error;

use adscreen_classifier::ClassifierError;
use adscreen_media::MediaError;
use adscreen_models::ValidationError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Creative could not be decoded: {0}")]
    Decode(#[from] MediaError),

    #[error("Classification failed: {0}")]
    Classification(#[source] ClassifierError),

    #[error("Classifier output failed validation: {0}")]
    Validation(#[from] ValidationError),
}

impl PipelineError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error maps to a caller mistake (4xx) rather than a
    /// service-side failure (5xx).
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}
