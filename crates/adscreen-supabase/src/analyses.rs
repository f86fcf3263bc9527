//! Analysis history persistence.
//!
//! Append-only from the pipeline's perspective: one insert per completed
//! analysis, with the overall status and risk score denormalized for
//! history listings.

use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use adscreen_models::AnalysisResult;

use crate::client::SupabaseClient;
use crate::error::{SupabaseError, SupabaseResult};

/// Row shape for the `analyses` table.
#[derive(Debug, Serialize)]
struct AnalysisRow<'a> {
    user_id: &'a str,
    filename: &'a str,
    result: &'a AnalysisResult,
    risk_score: u8,
    status: &'a str,
    created_at: String,
}

impl SupabaseClient {
    /// Store one analysis result in the history table.
    pub async fn insert_analysis(
        &self,
        user_id: &str,
        filename: &str,
        result: &AnalysisResult,
    ) -> SupabaseResult<()> {
        let row = AnalysisRow {
            user_id,
            filename,
            result,
            risk_score: result.risk_score,
            status: result.status.as_str(),
            created_at: Utc::now().to_rfc3339(),
        };

        let response = self
            .http
            .post(self.rest_url("analyses"))
            .header("apikey", &self.config.service_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(&self.config.service_key)
            .json(&row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        debug!(user_id, filename, "Stored analysis result");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SupabaseConfig;
    use adscreen_models::{
        OverallStatus, PlatformStatus, PlatformVerdict, Platforms, VerdictDetails,
    };
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            status: OverallStatus::Warning,
            risk_score: 61,
            platforms: Platforms {
                google: PlatformVerdict {
                    status: PlatformStatus::Limited,
                    reasons: vec!["health claim".to_string()],
                },
                meta: PlatformVerdict::unknown(),
            },
            details: VerdictDetails::default(),
        }
    }

    #[tokio::test]
    async fn test_insert_analysis() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/analyses"))
            .and(body_partial_json(serde_json::json!({
                "user_id": "user-1",
                "filename": "ad.mp4",
                "risk_score": 61,
                "status": "warning"
            })))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(SupabaseConfig {
            base_url: server.uri(),
            service_key: "service-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        client
            .insert_analysis("user-1", "ad.mp4", &sample_result())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_insert_failure_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/analyses"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .mount(&server)
            .await;

        let client = SupabaseClient::new(SupabaseConfig {
            base_url: server.uri(),
            service_key: "service-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let err = client
            .insert_analysis("user-1", "ad.mp4", &sample_result())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SupabaseError::RequestFailed { status: 500, .. }
        ));
    }
}
