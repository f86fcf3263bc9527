//! The analysis orchestrator.

use std::sync::Arc;

use tracing::{info, warn};

use adscreen_models::{
    validate_verdict, AnalysisResult, Creative, FrameSequence, Transcript, CLASSIFIER_FRAME_CAP,
};

use crate::error::{PipelineError, PipelineResult};
use crate::stage::AnalysisStage;
use crate::traits::{FrameSource, HistoryStore, PolicyClassifier, Transcriber};

/// Explicit per-invocation context, passed in by the caller. Replaces any
/// ambient "who is calling" state.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    /// Caller identity, used only for history attribution.
    pub user_id: String,
    /// Original creative filename, used for history attribution.
    pub filename: String,
}

impl AnalysisContext {
    pub fn new(user_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            filename: filename.into(),
        }
    }
}

/// The ephemeral bundle built for one classifier invocation. Never
/// persisted.
struct AnalysisRequest {
    frames: FrameSequence,
    transcript: Transcript,
}

/// Sequences one creative end-to-end: transcript (best-effort), frames,
/// classification, validation, and fire-and-forget persistence.
///
/// Stages run strictly in order — the classification prompt embeds the
/// transcript, and the decode resource behind a sampling frame source is
/// single-threaded.
pub struct AnalysisOrchestrator {
    transcriber: Arc<dyn Transcriber>,
    classifier: Arc<dyn PolicyClassifier>,
    frame_source: Arc<dyn FrameSource>,
    history: Option<Arc<dyn HistoryStore>>,
}

impl AnalysisOrchestrator {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        classifier: Arc<dyn PolicyClassifier>,
        frame_source: Arc<dyn FrameSource>,
    ) -> Self {
        Self {
            transcriber,
            classifier,
            frame_source,
            history: None,
        }
    }

    /// Attach a history store. Persistence stays fire-and-forget: store
    /// failures are logged and never alter the returned result.
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    /// Analyze one creative. Returns a fully validated result or an error,
    /// never a partial result.
    ///
    /// Every exit logs a terminal stage: `Done` on success, `Failed` on any
    /// error. Persistence only happens for successful invocations.
    pub async fn analyze(
        &self,
        ctx: &AnalysisContext,
        creative: Creative,
    ) -> PipelineResult<AnalysisResult> {
        match self.run(ctx, creative).await {
            Ok(result) => {
                self.persist(ctx, &result);
                self.log_stage(ctx, AnalysisStage::Done);
                Ok(result)
            }
            Err(e) => {
                warn!(
                    user_id = %ctx.user_id,
                    filename = %ctx.filename,
                    stage = AnalysisStage::Failed.as_str(),
                    error = %e,
                    "Analysis failed"
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        ctx: &AnalysisContext,
        creative: Creative,
    ) -> PipelineResult<AnalysisResult> {
        let transcript = self.acquire_transcript(&creative).await;

        self.log_stage(ctx, AnalysisStage::Sampling);
        let mut frames = self.frame_source.frames(&creative).await?;

        // Hard submission-time ceiling, independent of the sampler's own
        // cap: bounds classifier request size and cost.
        frames.truncate(CLASSIFIER_FRAME_CAP);
        if frames.is_empty() {
            return Err(PipelineError::input("Creative produced no frames"));
        }

        let request = AnalysisRequest { frames, transcript };

        self.log_stage(ctx, AnalysisStage::Classifying);
        let raw = self
            .classifier
            .classify(request.transcript.as_prompt_text(), request.frames.samples())
            .await
            .map_err(PipelineError::Classification)?;

        self.log_stage(ctx, AnalysisStage::Validating);
        Ok(validate_verdict(&raw)?)
    }

    /// Step 1: transcript acquisition. Audio problems must never block a
    /// visual-only assessment, so every failure path degrades to the
    /// sentinel transcript.
    async fn acquire_transcript(&self, creative: &Creative) -> Transcript {
        if !creative.kind.may_have_audio() {
            return Transcript::Unavailable;
        }

        info!(filename = %creative.filename, stage = AnalysisStage::Transcribing.as_str(), "Transcribing audio track");
        match self
            .transcriber
            .transcribe(&creative.filename, creative.payload.clone())
            .await
        {
            Ok(text) => Transcript::from_text(text),
            Err(e) => {
                warn!(filename = %creative.filename, error = %e, "Transcription failed, continuing without audio");
                Transcript::Unavailable
            }
        }
    }

    /// Step 5: fire-and-forget persistence on a detached task.
    fn persist(&self, ctx: &AnalysisContext, result: &AnalysisResult) {
        let Some(history) = self.history.clone() else {
            return;
        };

        let user_id = ctx.user_id.clone();
        let filename = ctx.filename.clone();
        let result = result.clone();
        tokio::spawn(async move {
            if let Err(e) = history.store(&user_id, &filename, &result).await {
                warn!(user_id = %user_id, filename = %filename, error = %e, "Failed to store analysis history");
            }
        });
    }

    fn log_stage(&self, ctx: &AnalysisContext, stage: AnalysisStage) {
        info!(
            user_id = %ctx.user_id,
            filename = %ctx.filename,
            stage = stage.as_str(),
            "Analysis stage"
        );
    }
}
