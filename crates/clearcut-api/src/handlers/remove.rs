//! Background-removal endpoint
//!
//! `POST /api/remove` takes a multipart `image` field, spools it to the
//! scratch store, and forwards it to the background-removal provider. The
//! success response is the raw PNG byte stream, not JSON. Whatever the
//! outcome, the scratch file is gone before the response is produced: the
//! provider client deletes it on every exit, and the handler releases
//! speculatively on top of that.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use clearcut_core::AppError;
use serde_json::json;

use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::next_image_part;
use crate::state::AppState;
use crate::validation::{validate_image, ALLOWED_MIME_TYPES};

/// Remove the background from an uploaded image.
#[utoipa::path(
    post,
    path = "/api/remove",
    tag = "remove",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PNG image with transparent background", body = Vec<u8>, content_type = "image/png"),
        (status = 400, description = "Missing file, invalid type, or invalid format", body = ErrorResponse),
        (status = 402, description = "Provider quota exceeded", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Provider error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "remove_background"))]
pub async fn remove_background(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, HttpAppError> {
    let started = Instant::now();

    let part = next_image_part(&mut multipart)
        .await?
        .ok_or_else(|| AppError::InvalidInput("No image file provided".to_string()))?;

    validate_image(
        &part.content_type,
        part.data.len() as u64,
        state.config.max_upload_bytes,
    )?;

    tracing::info!(
        file = %part.filename,
        size = part.data.len(),
        content_type = %part.content_type,
        "Processing image"
    );

    let scratch_file = state
        .scratch
        .persist(&part.filename, &part.content_type, part.data)
        .await
        .map_err(HttpAppError::from)?;

    // The matting client owns cleanup for the call; this release is the
    // handler's speculative backstop and is a no-op on the happy path.
    let result = state.matting.remove_background(&scratch_file.path).await;
    state.scratch.release(&scratch_file).await;
    let png = result.map_err(HttpAppError::from)?;

    let elapsed_ms = started.elapsed().as_millis();
    tracing::info!(file = %scratch_file.original_name, elapsed_ms, "Image processed");

    let mut response = (StatusCode::OK, png).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"removed-bg.png\""),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed_ms}ms")) {
        headers.insert("X-Processing-Time", value);
    }

    Ok(response)
}

/// Describe the background-removal endpoint.
#[utoipa::path(
    get,
    path = "/api/remove",
    tag = "remove",
    responses((status = 200, description = "Endpoint description"))
)]
pub async fn remove_info(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let max_mb = state.config.max_upload_bytes / (1024 * 1024);
    Json(json!({
        "message": "Background Removal API",
        "endpoint": "/api/remove",
        "method": "POST",
        "description": "Remove background from uploaded image",
        "parameters": {
            "image": format!(
                "Image file ({}) - max {max_mb}MB",
                ALLOWED_MIME_TYPES.join(", ")
            ),
        },
        "response": "PNG image with transparent background",
        "environment": state.config.environment,
    }))
}
