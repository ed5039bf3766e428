//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Instant;

use clearcut_core::{AppError, Config};
use clearcut_services::{CleanupService, MattingClient};
use clearcut_storage::{MediaStore, ScratchStore};

pub struct AppState {
    pub config: Config,
    pub scratch: ScratchStore,
    pub matting: MattingClient,
    /// Present only when the media vault is configured.
    pub vault: Option<Arc<dyn MediaStore>>,
    pub cleanup: Option<Arc<CleanupService>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn vault(&self) -> Result<&Arc<dyn MediaStore>, AppError> {
        self.vault.as_ref().ok_or_else(|| {
            AppError::MissingCredential("MEDIA_VAULT_BASE_URL is not configured".to_string())
        })
    }

    pub fn cleanup(&self) -> Result<&Arc<CleanupService>, AppError> {
        self.cleanup.as_ref().ok_or_else(|| {
            AppError::MissingCredential("MEDIA_VAULT_BASE_URL is not configured".to_string())
        })
    }
}
