//! HTTP document-store backend (primary)
//!
//! Upserts the full client document at `POST {base_url}/clients/{user_id}`.
//! The service is treated as an opaque key-value document API.

use super::ClientStore;
use crate::error::AdvisoryError;
use crate::models::{ClientRecord, Report};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

pub struct DocumentApiStore {
    client: Client,
    api_key: String,
    base_url: String,
}

impl DocumentApiStore {
    pub fn new(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl ClientStore for DocumentApiStore {
    async fn upsert_client(
        &self,
        record: &ClientRecord,
        report: Option<&Report>,
    ) -> crate::Result<()> {
        let url = format!("{}/clients/{}", self.base_url, record.profile.user_id);

        let document = json!({
            "user_id": record.profile.user_id,
            "record": record,
            "report": report,
            "updated_at": chrono::Utc::now().to_rfc3339(),
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&document)
            .send()
            .await
            .map_err(|e| {
                AdvisoryError::StorageError(format!("Document API request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::StorageError(format!(
                "Document API returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}
