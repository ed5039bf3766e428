//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors
//! (`MattingError`, `StoreError`) convert into the core `AppError`, which
//! self-describes its HTTP presentation through `ErrorMetadata`; this module
//! renders it. In hardened mode (recorded once at startup from `Config`)
//! and for sensitive errors in any mode, the upstream detail is dropped and
//! only the safe client message is shown.

use std::sync::OnceLock;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clearcut_core::{AppError, ErrorMetadata, LogLevel};
use clearcut_services::MattingError;
use clearcut_storage::StoreError;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: IntoResponse is external, AppError lives in core).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<MattingError> for HttpAppError {
    fn from(err: MattingError) -> Self {
        let app = match err {
            MattingError::MissingCredential => {
                AppError::MissingCredential("REMOVE_BG_API_KEY is not set".to_string())
            }
            // The upload existed when the request started; a vanished
            // scratch file is a server-side problem, not client input.
            MattingError::FileNotFound(path) => {
                AppError::Internal(format!("Scratch file disappeared: {path}"))
            }
            MattingError::FileTooLarge { size, limit } => {
                tracing::debug!(size, limit, "Rejected oversized upload");
                AppError::PayloadTooLarge(format!(
                    "Image file size must be less than {}MB",
                    limit / (1024 * 1024)
                ))
            }
            MattingError::InvalidFormat(_) => {
                AppError::InvalidInput("Invalid image format or corrupted file".to_string())
            }
            MattingError::InvalidCredential(detail) => AppError::InvalidCredential(detail),
            MattingError::QuotaExceeded(detail) => AppError::QuotaExceeded(detail),
            MattingError::RateLimited(detail) => AppError::RateLimited(detail),
            MattingError::Timeout => {
                AppError::UpstreamTimeout("background removal provider".to_string())
            }
            MattingError::Unreachable(detail) => AppError::UpstreamUnreachable(detail),
            MattingError::Upstream { status, detail } => AppError::Upstream { status, detail },
            MattingError::Io(e) => AppError::Internal(format!("IO error: {e}")),
        };
        HttpAppError(app)
    }
}

impl From<StoreError> for HttpAppError {
    fn from(err: StoreError) -> Self {
        let app = match err {
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::UploadFailed(msg)
            | StoreError::ListFailed(msg)
            | StoreError::DeleteFailed(msg) => AppError::Storage(msg),
            StoreError::ConfigError(msg) => AppError::MissingCredential(msg),
            StoreError::Io(e) => AppError::Internal(format!("IO error: {e}")),
        };
        HttpAppError(app)
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Request failed");
        }
    }
}

static HARDENED_MODE: OnceLock<bool> = OnceLock::new();

/// Record the operating mode once at startup, from `Config::is_hardened`.
/// Never read from the environment again after this. Defaults to relaxed
/// if never set.
pub fn init_error_mode(hardened: bool) {
    let _ = HARDENED_MODE.set(hardened);
}

fn hardened_mode() -> bool {
    HARDENED_MODE.get().copied().unwrap_or(false)
}

fn render(app_error: &AppError, hardened: bool) -> Response {
    let status = StatusCode::from_u16(app_error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    // Always hide details in hardened mode; otherwise show them for
    // non-sensitive errors only.
    let details = if hardened || app_error.is_sensitive() {
        None
    } else {
        Some(app_error.detailed_message())
    };

    let body = Json(ErrorResponse {
        error: app_error.client_message(),
        details,
        code: app_error.error_code().to_string(),
    });

    (status, body).into_response()
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self.0);
        render(&self.0, hardened_mode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matting_errors_convert_to_documented_statuses() {
        let cases: [(MattingError, u16); 6] = [
            (MattingError::InvalidFormat("x".into()), 400),
            (MattingError::InvalidCredential("x".into()), 401),
            (MattingError::QuotaExceeded("x".into()), 402),
            (
                MattingError::FileTooLarge {
                    size: 99,
                    limit: 10,
                },
                413,
            ),
            (MattingError::RateLimited("x".into()), 429),
            (MattingError::Timeout, 504),
        ];

        for (err, expected) in cases {
            let HttpAppError(app) = err.into();
            assert_eq!(app.http_status_code(), expected);
        }
    }

    #[test]
    fn unmapped_upstream_status_is_preserved_in_detail() {
        let HttpAppError(app) = MattingError::Upstream {
            status: 418,
            detail: "teapot".into(),
        }
        .into();
        match app {
            AppError::Upstream { status, detail } => {
                assert_eq!(status, 418);
                assert_eq!(detail, "teapot");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn store_config_error_reads_as_missing_credential() {
        let HttpAppError(app) = StoreError::ConfigError("MEDIA_VAULT_BASE_URL is not set".into()).into();
        assert!(matches!(app, AppError::MissingCredential(_)));
    }

    async fn rendered_body(app_error: &AppError, hardened: bool) -> serde_json::Value {
        let response = render(app_error, hardened);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn hardened_mode_suppresses_upstream_detail() {
        let err = AppError::QuotaExceeded("monthly credits exhausted".into());

        let response = render(&err, true);
        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);

        let json = rendered_body(&err, true).await;
        assert_eq!(json["code"], "QUOTA_EXCEEDED");
        assert!(json.get("details").is_none(), "detail leaked: {json}");
        assert!(!json["error"]
            .as_str()
            .unwrap()
            .contains("monthly credits exhausted"));
    }

    #[tokio::test]
    async fn relaxed_mode_includes_upstream_detail() {
        let err = AppError::QuotaExceeded("monthly credits exhausted".into());

        let json = rendered_body(&err, false).await;
        assert!(json["details"]
            .as_str()
            .unwrap()
            .contains("monthly credits exhausted"));
    }

    #[tokio::test]
    async fn sensitive_errors_hide_detail_even_in_relaxed_mode() {
        let err = AppError::MissingCredential("REMOVE_BG_API_KEY is not set".into());

        let json = rendered_body(&err, false).await;
        assert!(json.get("details").is_none(), "detail leaked: {json}");
        assert!(!json["error"].as_str().unwrap().contains("REMOVE_BG_API_KEY"));
    }
}
