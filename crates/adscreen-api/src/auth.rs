//! Caller authentication.
//!
//! Every analysis request carries a bearer token that the auth backend
//! resolves to a user. No token, no analysis.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: String,
    pub email: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

        match state.supabase.get_user(token).await {
            Ok(Some(user)) => Ok(Caller {
                user_id: user.id,
                email: user.email,
            }),
            Ok(None) => Err(ApiError::unauthorized("Invalid or expired token")),
            Err(e) => {
                warn!(error = %e, "Auth backend lookup failed");
                Err(ApiError::unauthorized("Could not verify token"))
            }
        }
    }
}
