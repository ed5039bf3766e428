//! Service construction
//!
//! Builds the provider clients and the cleanup service from configuration
//! and spawns the scheduled sweep task. Providers get their settings
//! injected here; nothing reads the environment at call time.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clearcut_core::Config;
use clearcut_services::{start_sweeper, CleanupService, MattingClient, SweepSchedule, SweepTask};
use clearcut_storage::{MediaStore, ScratchStore, VaultStore};

use crate::state::AppState;

pub async fn build_state(config: Config) -> Result<(Arc<AppState>, Option<SweepTask>), anyhow::Error> {
    let scratch = ScratchStore::new(&config.scratch_dir);
    scratch
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create scratch directory {:?}", config.scratch_dir))?;

    if config.matting.api_key.is_none() {
        tracing::warn!("REMOVE_BG_API_KEY not set; background removal requests will fail");
    }
    let matting = MattingClient::new(config.matting.clone())?;

    let schedule = SweepSchedule::parse(&config.cleanup.schedule, &config.cleanup.timezone)
        .context("Invalid cleanup schedule")?;

    let vault: Option<Arc<dyn MediaStore>> = if config.vault.base_url.is_empty() {
        tracing::warn!("MEDIA_VAULT_BASE_URL not set; upload and cleanup endpoints disabled");
        None
    } else {
        Some(Arc::new(VaultStore::new(config.vault.clone())?))
    };

    let cleanup = vault.as_ref().map(|store| {
        Arc::new(CleanupService::new(
            store.clone(),
            config.vault.folder.clone(),
            Some(schedule.clone()),
        ))
    });

    let sweep_task = cleanup.as_ref().map(|service| {
        tracing::info!(
            schedule = %config.cleanup.schedule,
            timezone = %config.cleanup.timezone,
            "Starting retention sweep scheduler"
        );
        start_sweeper(service.clone(), schedule.clone())
    });

    let state = Arc::new(AppState {
        config,
        scratch,
        matting,
        vault,
        cleanup,
        started_at: Instant::now(),
    });

    Ok((state, sweep_task))
}
