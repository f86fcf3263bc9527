//! Supabase REST API client.

use std::time::Duration;

use reqwest::Client;

use crate::error::{SupabaseError, SupabaseResult};

/// Supabase client configuration.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. https://xyzcompany.supabase.co
    pub base_url: String,
    /// Service-role key for server-side access.
    pub service_key: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl SupabaseConfig {
    /// Create config from environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        let base_url = std::env::var("SUPABASE_URL")
            .map_err(|_| SupabaseError::config("SUPABASE_URL must be set"))?;
        let service_key = std::env::var("SUPABASE_SERVICE_KEY")
            .map_err(|_| SupabaseError::config("SUPABASE_SERVICE_KEY must be set"))?;

        if base_url.is_empty() || service_key.is_empty() {
            return Err(SupabaseError::config(
                "SUPABASE_URL and SUPABASE_SERVICE_KEY cannot be empty",
            ));
        }

        let timeout_secs: u64 = std::env::var("SUPABASE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(15);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Supabase REST API client.
#[derive(Clone)]
pub struct SupabaseClient {
    pub(crate) http: Client,
    pub(crate) config: SupabaseConfig,
}

impl SupabaseClient {
    /// Create a new client.
    pub fn new(config: SupabaseConfig) -> SupabaseResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("adscreen-supabase/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    /// PostgREST endpoint for a table.
    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    /// GoTrue (auth) endpoint.
    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base_url, path)
    }
}
