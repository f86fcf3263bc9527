//! Key/value settings store.
//!
//! Backs classifier credential resolution: a settings row overrides the
//! process-level default.

use serde::Deserialize;

use crate::client::SupabaseClient;
use crate::error::{SupabaseError, SupabaseResult};

#[derive(Debug, Deserialize)]
struct SettingRow {
    value: Option<String>,
}

impl SupabaseClient {
    /// Look up a setting by key. `Ok(None)` when the key has no row or an
    /// empty value.
    pub async fn get_setting(&self, key: &str) -> SupabaseResult<Option<String>> {
        let response = self
            .http
            .get(self.rest_url("settings"))
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
            .query(&[("key", format!("eq.{key}")), ("select", "value".to_string())])
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

        let rows: Vec<SettingRow> = response
            .json()
            .await
            .map_err(|e| SupabaseError::invalid_response(e.to_string()))?;

        Ok(rows
            .into_iter()
            .next()
            .and_then(|r| r.value)
            .filter(|v| !v.is_empty()))
    }
}
