//! Clearcut Core Library
//!
//! Shared building blocks for the clearcut gateway: environment-driven
//! configuration, the unified `AppError` type with its response metadata,
//! and the value objects exchanged between the services and the API layer.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{CleanupSettings, Config, MattingSettings, VaultSettings};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{CleanupReport, RemoteAsset, RetentionSummary, UploadReceipt};
