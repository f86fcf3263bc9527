//! Creative analysis handler.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use adscreen_media::FrameSampler;
use adscreen_models::{AnalysisResult, Creative, FrameSequence};
use adscreen_pipeline::{
    AnalysisContext, AnalysisOrchestrator, FrameSource, HistoryStore, PolicyClassifier,
    ProvidedFrames, Transcriber,
};

use crate::auth::Caller;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Analyze one uploaded creative.
///
/// Multipart fields:
/// - `file` (required): the creative binary, filename determines the kind
/// - `frames` (repeated, optional): pre-extracted frames as base64 or data
///   URLs, in playback order; when present the server skips local decoding
pub async fn analyze_creative(
    State(state): State<AppState>,
    caller: Caller,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisResult>> {
    let started = Instant::now();

    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut side_frames: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(|f| f.to_string())
                    .ok_or_else(|| ApiError::bad_request("File field must carry a filename"))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file field: {e}")))?;
                upload = Some((filename, data.to_vec()));
            }
            Some("frames") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read frames field: {e}"))
                })?;
                side_frames.push(strip_data_url(&text).to_string());
            }
            _ => {}
        }
    }

    let (filename, payload) = upload.ok_or_else(|| ApiError::bad_request("Missing 'file' field"))?;
    if payload.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is empty"));
    }

    let creative = Creative::from_upload(filename, payload);
    let kind = creative.kind;

    info!(
        user_id = %caller.user_id,
        filename = %creative.filename,
        kind = kind.as_str(),
        size_bytes = creative.payload.len(),
        provided_frames = side_frames.len(),
        "Analysis requested"
    );

    let api_key = state.resolve_openai_key().await?;
    let openai = Arc::new(state.openai_client(api_key));

    let frame_source: Arc<dyn FrameSource> = if side_frames.is_empty() {
        Arc::new(
            FrameSampler::new()
                .with_interval(state.config.frame_interval_secs)
                .with_max_frames(state.config.max_frames),
        )
    } else {
        metrics::record_frames_submitted(side_frames.len());
        Arc::new(ProvidedFrames::new(FrameSequence::from_ordered_images(
            side_frames,
        )))
    };

    let orchestrator = AnalysisOrchestrator::new(
        Arc::clone(&openai) as Arc<dyn Transcriber>,
        openai as Arc<dyn PolicyClassifier>,
        frame_source,
    )
    .with_history(Arc::clone(&state.supabase) as Arc<dyn HistoryStore>);

    let ctx = AnalysisContext::new(&caller.user_id, &creative.filename);
    let outcome = orchestrator.analyze(&ctx, creative).await;

    let label = match &outcome {
        Ok(result) => result.status.as_str(),
        Err(_) => "error",
    };
    metrics::record_analysis(kind.as_str(), label, started.elapsed().as_secs_f64());

    Ok(Json(outcome?))
}

/// Accept either a raw base64 string or a full data URL.
fn strip_data_url(value: &str) -> &str {
    match value.split_once("base64,") {
        Some((_, b64)) => b64,
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_data_url() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,abc123"), "abc123");
        assert_eq!(strip_data_url("abc123"), "abc123");
    }
}
