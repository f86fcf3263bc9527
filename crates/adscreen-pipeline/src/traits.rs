//! Collaborator seams.
//!
//! The orchestrator talks to its collaborators through these traits so the
//! external services (OpenAI, Supabase, the decode resource) can be mocked
//! in tests and swapped at the API boundary.

use async_trait::async_trait;
use serde_json::Value;

use adscreen_classifier::{ClassifierResult, OpenAiClient};
use adscreen_media::{FrameSampler, MediaResult};
use adscreen_models::{AnalysisResult, Creative, FrameSample, FrameSequence};
use adscreen_supabase::{SupabaseClient, SupabaseResult};

/// Converts an audio track to text. Best-effort: the orchestrator absorbs
/// any failure here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, filename: &str, payload: Vec<u8>) -> ClassifierResult<String>;
}

/// Multimodal policy classifier. Returns raw structured output; validation
/// happens at the orchestrator boundary. Failure is fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PolicyClassifier: Send + Sync {
    async fn classify(
        &self,
        transcript_text: &str,
        frames: &[FrameSample],
    ) -> ClassifierResult<Value>;
}

/// Produces the frame sequence for a creative — either by decoding it
/// locally or by handing through frames extracted on the submitting side.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn frames(&self, creative: &Creative) -> MediaResult<FrameSequence>;
}

/// Long-term analysis history. Fire-and-forget from the pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn store(
        &self,
        user_id: &str,
        filename: &str,
        result: &AnalysisResult,
    ) -> SupabaseResult<()>;
}

#[async_trait]
impl Transcriber for OpenAiClient {
    async fn transcribe(&self, filename: &str, payload: Vec<u8>) -> ClassifierResult<String> {
        OpenAiClient::transcribe(self, filename, payload).await
    }
}

#[async_trait]
impl PolicyClassifier for OpenAiClient {
    async fn classify(
        &self,
        transcript_text: &str,
        frames: &[FrameSample],
    ) -> ClassifierResult<Value> {
        OpenAiClient::classify(self, transcript_text, frames).await
    }
}

#[async_trait]
impl FrameSource for FrameSampler {
    async fn frames(&self, creative: &Creative) -> MediaResult<FrameSequence> {
        self.sample(creative).await
    }
}

#[async_trait]
impl HistoryStore for SupabaseClient {
    async fn store(
        &self,
        user_id: &str,
        filename: &str,
        result: &AnalysisResult,
    ) -> SupabaseResult<()> {
        self.insert_analysis(user_id, filename, result).await
    }
}
