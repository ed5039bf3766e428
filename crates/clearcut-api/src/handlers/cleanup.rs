//! Retention sweep endpoints
//!
//! The manual trigger runs the exact same `CleanupService::sweep` as the
//! monthly scheduled firing and returns its report; the info endpoint is
//! the read-only partition.

use std::sync::Arc;

use axum::{extract::State, Json};
use clearcut_core::{CleanupReport, RetentionSummary};

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Run a retention sweep now.
#[utoipa::path(
    post,
    path = "/api/cleanup/run",
    tag = "cleanup",
    responses(
        (status = 200, description = "Sweep report", body = CleanupReport),
        (status = 502, description = "Storage provider listing failed", body = ErrorResponse)
    )
)]
pub async fn run_cleanup(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CleanupReport>, HttpAppError> {
    tracing::info!("Manual retention sweep triggered");
    let report = state.cleanup()?.sweep().await.map_err(HttpAppError::from)?;
    Ok(Json(report))
}

/// Inspect the retention partition without deleting anything.
#[utoipa::path(
    get,
    path = "/api/cleanup/info",
    tag = "cleanup",
    responses(
        (status = 200, description = "Retention summary", body = RetentionSummary),
        (status = 502, description = "Storage provider listing failed", body = ErrorResponse)
    )
)]
pub async fn cleanup_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<RetentionSummary>, HttpAppError> {
    let summary = state
        .cleanup()?
        .inspect()
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(summary))
}
