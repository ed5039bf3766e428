//! Error types module
//!
//! The unified `AppError` enum covers validation failures, classified
//! provider-call failures, and internal errors. The `ErrorMetadata` trait
//! lets each error self-describe its HTTP presentation so the boundary
//! layer can render it without matching on variants; the core itself never
//! writes an HTTP response.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like quota or rate limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "QUOTA_EXCEEDED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message, safe to show in any mode
    fn client_message(&self) -> String;

    /// Full message including upstream detail; shown only outside
    /// hardened mode and only for non-sensitive errors
    fn detailed_message(&self) -> String;

    /// Whether details should be hidden even outside hardened mode
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Provider credential not configured: {0}")]
    MissingCredential(String),

    #[error("Provider rejected credential: {0}")]
    InvalidCredential(String),

    #[error("Provider quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Provider rate limit hit: {0}")]
    RateLimited(String),

    #[error("Provider call timed out: {0}")]
    UpstreamTimeout(String),

    #[error("Provider unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Provider error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("Storage provider error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::PayloadTooLarge(_) => 413,
            AppError::NotFound(_) => 404,
            AppError::MissingCredential(_) => 500,
            AppError::InvalidCredential(_) => 401,
            AppError::QuotaExceeded(_) => 402,
            AppError::RateLimited(_) => 429,
            AppError::UpstreamTimeout(_) => 504,
            AppError::UpstreamUnreachable(_) => 502,
            AppError::Upstream { .. } => 502,
            AppError::Storage(_) => 502,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::PayloadTooLarge(_) => "FILE_TOO_LARGE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MissingCredential(_) => "MISSING_CREDENTIAL",
            AppError::InvalidCredential(_) => "INVALID_CREDENTIAL",
            AppError::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            AppError::RateLimited(_) => "RATE_LIMITED",
            AppError::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            AppError::UpstreamUnreachable(_) => "UPSTREAM_UNREACHABLE",
            AppError::Upstream { .. } => "UPSTREAM_ERROR",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::MissingCredential(_) => {
                "Background removal service is not configured".to_string()
            }
            AppError::InvalidCredential(_) => "Provider API key is invalid or missing".to_string(),
            AppError::QuotaExceeded(_) => {
                "Provider quota has been exceeded. Please try again later".to_string()
            }
            AppError::RateLimited(_) => {
                "Provider rate limit reached. Please try again later".to_string()
            }
            AppError::UpstreamTimeout(_) => "Provider request timed out".to_string(),
            AppError::UpstreamUnreachable(_) => "Provider could not be reached".to_string(),
            AppError::Upstream { .. } => "An error occurred while processing the image".to_string(),
            AppError::Storage(_) => "An error occurred while storing the image".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn detailed_message(&self) -> String {
        self.to_string()
    }

    fn is_sensitive(&self) -> bool {
        matches!(
            self,
            AppError::MissingCredential(_)
                | AppError::Internal(_)
                | AppError::InternalWithSource { .. }
        )
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::PayloadTooLarge(_) | AppError::NotFound(_) => {
                LogLevel::Debug
            }
            AppError::QuotaExceeded(_)
            | AppError::RateLimited(_)
            | AppError::UpstreamTimeout(_)
            | AppError::UpstreamUnreachable(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

impl AppError {
    /// Short variant name for structured log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::NotFound(_) => "not_found",
            AppError::MissingCredential(_) => "missing_credential",
            AppError::InvalidCredential(_) => "invalid_credential",
            AppError::QuotaExceeded(_) => "quota_exceeded",
            AppError::RateLimited(_) => "rate_limited",
            AppError::UpstreamTimeout(_) => "upstream_timeout",
            AppError::UpstreamUnreachable(_) => "upstream_unreachable",
            AppError::Upstream { .. } => "upstream_error",
            AppError::Storage(_) => "storage_error",
            AppError::Internal(_) => "internal",
            AppError::InternalWithSource { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_failures_map_to_documented_status_codes() {
        assert_eq!(AppError::InvalidInput("x".into()).http_status_code(), 400);
        assert_eq!(
            AppError::InvalidCredential("x".into()).http_status_code(),
            401
        );
        assert_eq!(AppError::QuotaExceeded("x".into()).http_status_code(), 402);
        assert_eq!(AppError::PayloadTooLarge("x".into()).http_status_code(), 413);
        assert_eq!(AppError::RateLimited("x".into()).http_status_code(), 429);
        assert_eq!(
            AppError::Upstream {
                status: 503,
                detail: "x".into()
            }
            .http_status_code(),
            502
        );
        assert_eq!(AppError::UpstreamTimeout("x".into()).http_status_code(), 504);
    }

    #[test]
    fn sensitive_errors_never_leak_detail_in_client_message() {
        let err = AppError::MissingCredential("REMOVE_BG_API_KEY is not set".into());
        assert!(err.is_sensitive());
        assert!(!err.client_message().contains("REMOVE_BG_API_KEY"));
    }

    #[test]
    fn upstream_detail_survives_in_detailed_message() {
        let err = AppError::Upstream {
            status: 500,
            detail: "upstream exploded".into(),
        };
        assert!(err.detailed_message().contains("upstream exploded"));
        assert_eq!(err.client_message(), "An error occurred while processing the image");
    }
}
