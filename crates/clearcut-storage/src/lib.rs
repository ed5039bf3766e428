//! Clearcut Storage Library
//!
//! Two storage concerns live here:
//!
//! - the **scratch store**, which owns transient on-disk upload files and
//!   guarantees idempotent cleanup on every exit path, and
//! - the **media vault**, the remote storage provider behind the
//!   [`MediaStore`] trait, implemented over its HTTP API.
//!
//! The trait seam exists so the retention sweep can run against a fake
//! store in tests without touching the network.

pub mod scratch;
pub mod traits;
pub mod vault;

// Re-export commonly used types
pub use scratch::{ScratchFile, ScratchStore};
pub use traits::{MediaStore, StoreError, StoreResult};
pub use vault::VaultStore;
