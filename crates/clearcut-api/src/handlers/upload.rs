//! Media vault upload endpoint
//!
//! `POST /api/upload` accepts up to five `image` fields, stores each with
//! the media vault provider, and returns the durable URLs. Every scratch
//! file is released whether its upload succeeded or not.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use clearcut_core::AppError;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::next_image_part;
use crate::state::AppState;
use crate::validation::validate_image;

/// Upper bound on files per batch upload request.
const MAX_BATCH_FILES: usize = 5;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadBatchResponse {
    pub message: String,
    pub urls: Vec<String>,
}

/// Upload images to the media vault.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "upload",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Images uploaded", body = UploadBatchResponse),
        (status = 400, description = "Missing files or invalid type", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Storage provider error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_images"))]
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadBatchResponse>, HttpAppError> {
    let vault = state.vault()?.clone();

    let mut urls = Vec::new();
    while let Some(part) = next_image_part(&mut multipart).await? {
        if urls.len() >= MAX_BATCH_FILES {
            return Err(AppError::InvalidInput(format!(
                "Too many files; at most {MAX_BATCH_FILES} images per request"
            ))
            .into());
        }

        validate_image(
            &part.content_type,
            part.data.len() as u64,
            state.config.max_upload_bytes,
        )?;

        let scratch_file = state
            .scratch
            .persist(&part.filename, &part.content_type, part.data)
            .await
            .map_err(HttpAppError::from)?;

        // Release on both arms; a failed provider call must not leak the
        // scratch file.
        let result = vault
            .upload(
                &scratch_file.path,
                &scratch_file.original_name,
                &scratch_file.content_type,
            )
            .await;
        state.scratch.release(&scratch_file).await;
        let receipt = result.map_err(HttpAppError::from)?;

        urls.push(receipt.url);
    }

    if urls.is_empty() {
        return Err(AppError::InvalidInput("No image files provided".to_string()).into());
    }

    tracing::info!(count = urls.len(), "Batch upload completed");

    Ok(Json(UploadBatchResponse {
        message: format!("Uploaded {} images successfully", urls.len()),
        urls,
    }))
}
