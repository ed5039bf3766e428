//! Background-removal provider client
//!
//! Single-call adapter around the remote segmentation API: send the file,
//! get PNG bytes back or a classified error. There is deliberately no retry
//! layer; a failed attempt surfaces to the caller immediately. Adding
//! resilience means wrapping this client, not changing it.
//!
//! The client owns cleanup of the local file it is given: whatever the
//! outcome, the file is deleted before the call returns. The handler layer
//! may release the same path speculatively afterwards; release is
//! idempotent.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use bytes::Bytes;
use clearcut_core::MattingSettings;
use clearcut_storage::scratch;
use tokio::fs;

/// Classified background-removal failures.
///
/// Variants carry the raw upstream detail; the boundary layer decides
/// whether to show it or a generic message.
#[derive(Debug, thiserror::Error)]
pub enum MattingError {
    #[error("REMOVE_BG_API_KEY is not configured")]
    MissingCredential,

    #[error("Image file not found: {0}")]
    FileNotFound(String),

    #[error("File size {size} bytes exceeds {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Invalid image format or corrupted file: {0}")]
    InvalidFormat(String),

    #[error("Invalid API key: {0}")]
    InvalidCredential(String),

    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Request to provider timed out")]
    Timeout,

    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Provider error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Background-removal API client.
pub struct MattingClient {
    settings: MattingSettings,
    http_client: reqwest::Client,
}

impl MattingClient {
    pub fn new(settings: MattingSettings) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to create HTTP client for background removal")?;

        Ok(Self {
            settings,
            http_client,
        })
    }

    /// Remove the background from the image at `local_path`.
    ///
    /// Preconditions (credential configured, file exists, size within the
    /// ceiling) are checked before any network I/O. On every exit, success
    /// or failure, the local file is deleted.
    pub async fn remove_background(&self, local_path: &Path) -> Result<Bytes, MattingError> {
        let result = self.attempt(local_path).await;
        scratch::release_path(local_path).await;
        result
    }

    async fn attempt(&self, local_path: &Path) -> Result<Bytes, MattingError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(MattingError::MissingCredential)?;

        let metadata = fs::metadata(local_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MattingError::FileNotFound(local_path.display().to_string())
            } else {
                MattingError::Io(e)
            }
        })?;
        let size = metadata.len();
        if size > self.settings.max_file_bytes {
            return Err(MattingError::FileTooLarge {
                size,
                limit: self.settings.max_file_bytes,
            });
        }

        let filename = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        tracing::info!(
            file = %filename,
            size,
            "Sending background-removal request"
        );

        let data = fs::read(local_path).await?;
        let form = reqwest::multipart::Form::new()
            .part(
                "image_file",
                reqwest::multipart::Part::bytes(data).file_name(filename),
            )
            .text("size", "auto");

        let response = self
            .http_client
            .post(&self.settings.endpoint)
            .header("X-Api-Key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.map_err(classify_transport)?;
            tracing::info!(output_bytes = bytes.len(), "Background removal succeeded");
            return Ok(bytes);
        }

        let detail = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(status = status.as_u16(), detail = %detail, "Provider rejected request");

        Err(match status.as_u16() {
            400 => MattingError::InvalidFormat(detail),
            401 => MattingError::InvalidCredential(detail),
            402 => MattingError::QuotaExceeded(detail),
            429 => MattingError::RateLimited(detail),
            code => MattingError::Upstream {
                status: code,
                detail,
            },
        })
    }
}

fn classify_transport(e: reqwest::Error) -> MattingError {
    if e.is_timeout() {
        MattingError::Timeout
    } else {
        MattingError::Unreachable(e.to_string())
    }
}
