//! Upload validation
//!
//! Validation failures are detected here, before any scratch write or
//! provider call is attempted.

use clearcut_core::AppError;

/// The accepted upload MIME types, exactly.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Validate declared MIME type and payload size against the mode ceiling.
pub fn validate_image(content_type: &str, size: u64, max_bytes: u64) -> Result<(), AppError> {
    if !ALLOWED_MIME_TYPES.contains(&content_type) {
        return Err(AppError::InvalidInput(format!(
            "Invalid file type {content_type:?}. Only JPEG, PNG, and WebP images are allowed"
        )));
    }
    if size == 0 {
        return Err(AppError::InvalidInput("Empty image file".to_string()));
    }
    if size > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Image file size must be less than {}MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_the_three_image_types() {
        for ct in ALLOWED_MIME_TYPES {
            assert!(validate_image(ct, 1, 100).is_ok());
        }
        for ct in ["image/gif", "image/jpg", "application/pdf", "text/plain"] {
            assert!(matches!(
                validate_image(ct, 1, 100),
                Err(AppError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn size_at_ceiling_passes_one_byte_over_fails() {
        assert!(validate_image("image/png", 100, 100).is_ok());
        assert!(matches!(
            validate_image("image/png", 101, 100),
            Err(AppError::PayloadTooLarge(_))
        ));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(matches!(
            validate_image("image/png", 0, 100),
            Err(AppError::InvalidInput(_))
        ));
    }
}
