//! Retention sweep
//!
//! Reconciles the media vault against the retention policy: assets whose
//! creation timestamp is strictly older than now minus three calendar
//! months are deleted. The provider's listing is authoritative; nothing is
//! cached between runs, and the cutoff is recomputed on every invocation.

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use clearcut_core::{CleanupReport, RetentionSummary};
use clearcut_storage::{MediaStore, StoreError};
use tokio::sync::Mutex;

use crate::cleanup::schedule::SweepSchedule;

/// Retention window in calendar months.
pub const RETENTION_MONTHS: u32 = 3;

/// Deletes stored assets older than the retention window.
///
/// The same instance serves the monthly scheduled firing and the manual
/// trigger endpoint; both run the identical `sweep` implementation.
pub struct CleanupService {
    store: Arc<dyn MediaStore>,
    folder: Option<String>,
    schedule: Option<SweepSchedule>,
    /// Serializes concurrent sweeps. A manual trigger racing the scheduled
    /// firing waits for it instead of double-deleting against a stale
    /// listing.
    sweep_guard: Mutex<()>,
}

impl CleanupService {
    pub fn new(
        store: Arc<dyn MediaStore>,
        folder: Option<String>,
        schedule: Option<SweepSchedule>,
    ) -> Self {
        Self {
            store,
            folder,
            schedule,
            sweep_guard: Mutex::new(()),
        }
    }

    /// Cutoff separating expired from recent assets, relative to `now`.
    pub fn retention_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_months(Months::new(RETENTION_MONTHS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Run one retention sweep and report the partition.
    ///
    /// A failure listing the store aborts and propagates. A failure
    /// deleting a single asset is logged, counted, and skipped; one bad
    /// identifier never stops the rest of the sweep.
    #[tracing::instrument(skip(self))]
    pub async fn sweep(&self) -> Result<CleanupReport, StoreError> {
        let _running = self.sweep_guard.lock().await;

        let now = Utc::now();
        let cutoff = Self::retention_cutoff(now);
        tracing::info!(cutoff = %cutoff, "Starting retention sweep");

        let assets = self.store.list(self.folder.as_deref()).await?;

        let mut deleted = 0usize;
        let mut kept = 0usize;
        let mut failed = 0usize;

        for asset in assets {
            if asset.created_at >= cutoff {
                kept += 1;
                continue;
            }

            let age_days = (now - asset.created_at).num_days();
            match self.store.delete(&asset.id).await {
                Ok(()) => {
                    deleted += 1;
                    tracing::info!(
                        asset_id = %asset.id,
                        created_at = %asset.created_at,
                        age_days,
                        "Deleted expired asset"
                    );
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!(
                        error = %e,
                        asset_id = %asset.id,
                        "Failed to delete expired asset, continuing"
                    );
                }
            }
        }

        tracing::info!(deleted, kept, failed, "Retention sweep completed");

        Ok(CleanupReport {
            deleted,
            kept,
            failed,
            cutoff,
        })
    }

    /// Read-only partition of the store against the current cutoff.
    ///
    /// Same comparison as `sweep`, no deletions. For the inspection
    /// endpoint.
    pub async fn inspect(&self) -> Result<RetentionSummary, StoreError> {
        let now = Utc::now();
        let cutoff = Self::retention_cutoff(now);

        let assets = self.store.list(self.folder.as_deref()).await?;
        let total = assets.len();
        let expired = assets.iter().filter(|a| a.created_at < cutoff).count();

        Ok(RetentionSummary {
            total,
            expired,
            recent: total - expired,
            cutoff,
            next_run: self.schedule.as_ref().and_then(|s| s.next_occurrence(now)),
        })
    }
}
