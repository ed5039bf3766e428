//! Media vault HTTP client
//!
//! [`MediaStore`] implementation over the vault provider's REST API:
//! `POST /assets` (multipart upload), `GET /assets` (listing),
//! `DELETE /assets/{id}`. The base URL is injected through configuration so
//! tests can point the client at a local stub server.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use clearcut_core::{RemoteAsset, UploadReceipt, VaultSettings};
use serde::Deserialize;
use tokio::fs;

use crate::traits::{MediaStore, StoreError, StoreResult};

/// One provider page. The sweep reads a single page; see
/// [`MediaStore::list`] for the documented limitation.
const MAX_LIST_RESULTS: u32 = 1000;

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ListResponse {
    assets: Vec<RemoteAsset>,
}

/// HTTP client for the media vault provider.
pub struct VaultStore {
    settings: VaultSettings,
    http_client: reqwest::Client,
}

impl VaultStore {
    pub fn new(settings: VaultSettings) -> StoreResult<Self> {
        if settings.base_url.is_empty() {
            return Err(StoreError::ConfigError(
                "MEDIA_VAULT_BASE_URL is not set".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            settings,
            http_client,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.settings.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn error_text(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        format!("{status} - {body}")
    }
}

#[async_trait]
impl MediaStore for VaultStore {
    async fn upload(
        &self,
        local_path: &Path,
        filename: &str,
        content_type: &str,
    ) -> StoreResult<UploadReceipt> {
        let data = fs::read(local_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(local_path.display().to_string())
            } else {
                StoreError::Io(e)
            }
        })?;

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| StoreError::UploadFailed(format!("Invalid content type: {e}")))?;
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if let Some(folder) = &self.settings.folder {
            form = form.text("folder", folder.clone());
        }

        let url = format!("{}/assets", self.settings.base_url);
        let response = self
            .authorize(self.http_client.post(&url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StoreError::UploadFailed(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StoreError::UploadFailed(Self::error_text(response).await));
        }

        let receipt: UploadReceipt = response
            .json()
            .await
            .map_err(|e| StoreError::UploadFailed(format!("Invalid response body: {e}")))?;

        tracing::info!(
            asset_id = %receipt.id,
            url = %receipt.url,
            "Uploaded file to media vault"
        );

        Ok(receipt)
    }

    async fn list(&self, prefix: Option<&str>) -> StoreResult<Vec<RemoteAsset>> {
        let url = format!("{}/assets", self.settings.base_url);
        let mut query: Vec<(&str, String)> =
            vec![("max_results", MAX_LIST_RESULTS.to_string())];
        if let Some(prefix) = prefix {
            query.push(("prefix", prefix.to_string()));
        }

        let response = self
            .authorize(self.http_client.get(&url))
            .query(&query)
            .send()
            .await
            .map_err(|e| StoreError::ListFailed(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(StoreError::ListFailed(Self::error_text(response).await));
        }

        let listing: ListResponse = response
            .json()
            .await
            .map_err(|e| StoreError::ListFailed(format!("Invalid response body: {e}")))?;

        Ok(listing.assets)
    }

    async fn delete(&self, asset_id: &str) -> StoreResult<()> {
        let url = format!("{}/assets/{asset_id}", self.settings.base_url);
        let response = self
            .authorize(self.http_client.delete(&url))
            .send()
            .await
            .map_err(|e| StoreError::DeleteFailed(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(asset_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(StoreError::DeleteFailed(Self::error_text(response).await));
        }

        Ok(())
    }
}
