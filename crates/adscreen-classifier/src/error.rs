//! Classifier error types.

use thiserror::Error;

pub type ClassifierResult<T> = Result<T, ClassifierError>;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Classifier API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Classifier request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No content in classifier response")]
    EmptyResponse,

    #[error("Classifier response is not valid JSON: {0}")]
    MalformedResponse(String),
}

impl ClassifierError {
    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}
