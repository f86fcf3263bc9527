//! OpenAI API client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use adscreen_models::FrameSample;

use crate::error::{ClassifierError, ClassifierResult};
use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Transcription model.
const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Classification model.
const CLASSIFICATION_MODEL: &str = "gpt-4o";

/// Budget for a Whisper call. Transcription is best-effort, so this bounds
/// how long a broken audio track can stall the pipeline.
const TRANSCRIPTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Budget for the classification call; fatal on expiry.
const CLASSIFICATION_TIMEOUT: Duration = Duration::from_secs(90);

/// Cap on classifier completion size.
const MAX_COMPLETION_TOKENS: u32 = 1000;

/// OpenAI API client.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    client: Client,
}

/// Chat completion request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: ResponseFormat,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    detail: &'static str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Whisper transcription response.
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiClient {
    /// Create a client for the given API credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Transcribe an audio-bearing creative with Whisper.
    ///
    /// Callers treat failure as non-fatal; this adapter just reports it.
    pub async fn transcribe(&self, filename: &str, payload: Vec<u8>) -> ClassifierResult<String> {
        info!(filename, "Transcribing creative audio");

        let part = reqwest::multipart::Part::bytes(payload)
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| ClassifierError::transcription(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .timeout(TRANSCRIPTION_TIMEOUT)
            .send()
            .await
            .map_err(|e| ClassifierError::transcription(format!("Whisper request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::transcription(format!(
                "Whisper returned {status}: {body}"
            )));
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::transcription(format!("Bad Whisper response: {e}")))?;

        Ok(parsed.text)
    }

    /// Classify a creative from its transcript and bounded frame list.
    ///
    /// Requests a strict JSON-object completion and returns the parsed raw
    /// value; the result schema is enforced downstream.
    pub async fn classify(
        &self,
        transcript_text: &str,
        frames: &[FrameSample],
    ) -> ClassifierResult<Value> {
        let mut parts = vec![ContentPart::Text {
            text: build_user_prompt(transcript_text),
        }];
        for frame in frames {
            parts.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: frame.data_url(),
                    detail: "low",
                },
            });
        }

        let request = ChatRequest {
            model: CLASSIFICATION_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(parts),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            max_tokens: MAX_COMPLETION_TOKENS,
        };

        debug!(frames = frames.len(), "Submitting classification request");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(CLASSIFICATION_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Api { status, body });
        }

        let chat: ChatResponse = response.json().await?;

        let text = chat
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or(ClassifierError::EmptyResponse)?;

        parse_json_payload(text)
    }
}

/// Parse the completion text, tolerating markdown code fences.
fn parse_json_payload(text: &str) -> ClassifierResult<Value> {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);

    serde_json::from_str(text.trim())
        .map_err(|e| ClassifierError::malformed(format!("{e}: {}", text.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_plain_json() {
        let value = parse_json_payload(r#"{"status": "approved"}"#).unwrap();
        assert_eq!(value["status"], "approved");
    }

    #[test]
    fn test_parse_fenced_json() {
        let value = parse_json_payload("```json\n{\"risk_score\": 10}\n```").unwrap();
        assert_eq!(value["risk_score"], 10);
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        assert!(matches!(
            parse_json_payload("not json at all"),
            Err(ClassifierError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_request_serialization_shape() {
        let request = ChatRequest {
            model: CLASSIFICATION_MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: "hello".to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/jpeg;base64,abc".to_string(),
                            detail: "low",
                        },
                    },
                ]),
            }],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            max_tokens: 1000,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][0]["content"][1]["image_url"]["detail"],
            "low"
        );
    }

    #[tokio::test]
    async fn test_classify_happy_path() {
        let server = MockServer::start().await;

        let completion = json!({
            "choices": [{
                "message": {
                    "content": "{\"status\": \"approved\", \"risk_score\": 5}"
                }
            }]
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key").with_base_url(server.uri());
        let frames = vec![FrameSample::new(0.0, "abc")];
        let raw = client.classify("no dialogue", &frames).await.unwrap();
        assert_eq!(raw["status"], "approved");
    }

    #[tokio::test]
    async fn test_classify_service_error_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key").with_base_url(server.uri());
        let err = client.classify("t", &[]).await.unwrap_err();
        assert!(matches!(err, ClassifierError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_transcribe_error_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unsupported format"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key").with_base_url(server.uri());
        let err = client
            .transcribe("ad.mp4", vec![0u8; 16])
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Transcription(_)));
    }

    #[tokio::test]
    async fn test_transcribe_happy_path() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"text": "limited time offer"})),
            )
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key").with_base_url(server.uri());
        let text = client.transcribe("ad.mp4", vec![0u8; 16]).await.unwrap();
        assert_eq!(text, "limited time offer");
    }
}
