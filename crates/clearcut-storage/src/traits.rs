//! Media storage abstraction trait
//!
//! The remote storage provider is treated as an opaque collaborator with a
//! three-call contract: upload a local file, list stored assets, delete one
//! asset. The retention sweep and the upload handler both work against this
//! trait rather than the concrete HTTP client.

use std::path::Path;

use async_trait::async_trait;
use clearcut_core::{RemoteAsset, UploadReceipt};
use thiserror::Error;

/// Storage provider operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote media storage provider.
///
/// Single-attempt contract: a failed call surfaces immediately, there is no
/// retry layer. Callers that hand over a local temporary file must delete it
/// themselves whether or not the call succeeded.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload the file at `local_path` and return the provider's durable
    /// record for it.
    async fn upload(
        &self,
        local_path: &Path,
        filename: &str,
        content_type: &str,
    ) -> StoreResult<UploadReceipt>;

    /// List stored assets, optionally restricted to a folder prefix.
    ///
    /// Known limitation: returns at most one provider page (1000 entries).
    /// A store holding more assets than that needs pagination before the
    /// retention sweep can see everything.
    async fn list(&self, prefix: Option<&str>) -> StoreResult<Vec<RemoteAsset>>;

    /// Delete one stored asset by provider identifier.
    async fn delete(&self, asset_id: &str) -> StoreResult<()>;
}
