//! HTTP request handlers.

pub mod cleanup;
pub mod health;
pub mod remove;
pub mod upload;

use axum::extract::Multipart;
use bytes::Bytes;
use clearcut_core::AppError;

/// One decoded `image` field from a multipart body.
pub struct ImagePart {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Advance the multipart stream to the next `image` field, if any.
/// Fields with other names are skipped.
pub async fn next_image_part(multipart: &mut Multipart) -> Result<Option<ImagePart>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "image".to_string());
        let content_type = field
            .content_type()
            .map(|c| c.to_string())
            .unwrap_or_default();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read image field: {e}")))?;

        return Ok(Some(ImagePart {
            filename,
            content_type,
            data,
        }));
    }

    Ok(None)
}
