//! Application state.

use std::sync::Arc;

use tracing::warn;

use adscreen_classifier::OpenAiClient;
use adscreen_supabase::SupabaseClient;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};

/// Settings-table key holding the classifier credential.
const OPENAI_KEY_SETTING: &str = "openai_api_key";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub supabase: Arc<SupabaseClient>,
    openai_env_key: Option<String>,
}

impl AppState {
    /// Create new application state from the environment.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let supabase = SupabaseClient::from_env()?;
        let openai_env_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());

        Ok(Self {
            config,
            supabase: Arc::new(supabase),
            openai_env_key,
        })
    }

    /// Assemble state from explicit parts. Used by tests to point at local
    /// servers without touching the process environment.
    pub fn with_parts(
        config: ApiConfig,
        supabase: SupabaseClient,
        openai_env_key: Option<String>,
    ) -> Self {
        Self {
            config,
            supabase: Arc::new(supabase),
            openai_env_key,
        }
    }

    /// Resolve the classifier credential for one request.
    ///
    /// Order: settings table, then environment. A settings lookup failure
    /// falls through to the environment rather than failing the request.
    pub async fn resolve_openai_key(&self) -> ApiResult<String> {
        match self.supabase.get_setting(OPENAI_KEY_SETTING).await {
            Ok(Some(key)) if !key.trim().is_empty() => return Ok(key),
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "Settings lookup for classifier credential failed");
            }
        }

        self.openai_env_key
            .clone()
            .ok_or_else(|| ApiError::configuration("OpenAI API key is not configured"))
    }

    /// Build a classifier client for the given credential, honoring the
    /// endpoint override.
    pub fn openai_client(&self, api_key: String) -> OpenAiClient {
        let client = OpenAiClient::new(api_key);
        match &self.config.openai_base_url {
            Some(base) => client.with_base_url(base.clone()),
            None => client,
        }
    }
}
