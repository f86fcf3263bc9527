//! Caller identity resolution.
//!
//! Authentication itself lives in Supabase; this module only resolves an
//! opaque bearer token to a user id for the 401 boundary and for history
//! attribution.

use serde::Deserialize;
use tracing::debug;

use crate::client::SupabaseClient;
use crate::error::{SupabaseError, SupabaseResult};

/// An authenticated caller.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl SupabaseClient {
    /// Resolve a bearer token to a user. `Ok(None)` means the token is
    /// missing, expired, or otherwise not a valid session.
    pub async fn get_user(&self, bearer_token: &str) -> SupabaseResult<Option<AuthUser>> {
        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.config.service_key)
            .bearer_auth(bearer_token)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            debug!("Bearer token rejected by auth service");
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupabaseError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let user: AuthUser = response
            .json()
            .await
            .map_err(|e| SupabaseError::invalid_response(e.to_string()))?;

        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SupabaseConfig;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> SupabaseClient {
        SupabaseClient::new(SupabaseConfig {
            base_url,
            service_key: "service-key".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer user-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "user-123",
                "email": "ads@example.com"
            })))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let user = client.get_user("user-token").await.unwrap().unwrap();
        assert_eq!(user.id, "user-123");
        assert_eq!(user.email.as_deref(), Some("ads@example.com"));
    }

    #[tokio::test]
    async fn test_rejected_token_is_none() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        assert!(client.get_user("bad-token").await.unwrap().is_none());
    }
}
