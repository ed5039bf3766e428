//! Shared value objects
//!
//! Read views of provider-held assets and the report types produced by the
//! retention sweep. None of these are persisted locally; the storage
//! provider's records stay authoritative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Read view of an asset held by the media-storage provider.
///
/// Never cached across sweep runs; each sweep re-lists the provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemoteAsset {
    /// Provider-assigned identifier.
    pub id: String,
    /// Creation timestamp as reported by the provider.
    pub created_at: DateTime<Utc>,
}

/// Result of storing one file with the media-storage provider.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadReceipt {
    pub id: String,
    /// Durable, publicly reachable URL.
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Summary of one retention sweep.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CleanupReport {
    /// Assets older than the cutoff that were deleted.
    pub deleted: usize,
    /// Assets at or newer than the cutoff, left in place.
    pub kept: usize,
    /// Assets older than the cutoff whose deletion failed. Failures are
    /// per-item; they never abort the sweep.
    pub failed: usize,
    /// The cutoff this sweep partitioned against.
    pub cutoff: DateTime<Utc>,
}

/// Read-only view of the retention partition, for observability.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RetentionSummary {
    pub total: usize,
    /// Assets that the next sweep would delete.
    pub expired: usize,
    pub recent: usize,
    pub cutoff: DateTime<Utc>,
    /// Next scheduled firing, if a schedule is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
}
