//! Transient upload file store
//!
//! Every inbound upload is spooled to disk under a dedicated scratch
//! directory before being handed to a provider. Files here are owned by
//! exactly one in-flight request and must never outlive it: each creation
//! is paired with at least one [`release_path`] call on every exit path.
//! Release is idempotent, so the handler layer and the provider client can
//! both call it speculatively.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::Utc;
use tokio::fs;

use crate::traits::StoreResult;

/// A transient on-disk upload artifact.
///
/// Exists only until the owning request finishes; deleted unconditionally
/// before the response is produced, on success and on every failure.
#[derive(Debug, Clone)]
pub struct ScratchFile {
    pub path: PathBuf,
    pub original_name: String,
    pub content_type: String,
    pub size: u64,
}

/// Manages the scratch directory for transient upload files.
#[derive(Debug, Clone)]
pub struct ScratchStore {
    dir: PathBuf,
}

impl ScratchStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the scratch directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write an upload payload to a uniquely named file.
    ///
    /// The name combines a millisecond timestamp with a random component,
    /// so concurrent uploads cannot collide on the same path.
    pub async fn persist(
        &self,
        original_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> StoreResult<ScratchFile> {
        self.ensure_dir().await?;

        let ext = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let unique = format!(
            "upload-{}-{:09}{ext}",
            Utc::now().timestamp_millis(),
            rand::random_range(0..1_000_000_000u32),
        );
        let path = self.dir.join(unique);

        let size = data.len() as u64;
        fs::write(&path, &data).await?;

        tracing::debug!(path = %path.display(), size, "Persisted upload to scratch file");

        Ok(ScratchFile {
            path,
            original_name: original_name.to_string(),
            content_type: content_type.to_string(),
            size,
        })
    }

    /// Release a scratch file. See [`release_path`].
    pub async fn release(&self, file: &ScratchFile) {
        release_path(&file.path).await;
    }
}

/// Delete a scratch file if it still exists.
///
/// Idempotent and infallible: a missing file is a no-op, and any other
/// deletion failure is logged and swallowed. Callers invoke this
/// speculatively in failure handlers, possibly after another owner has
/// already deleted the file.
pub async fn release_path(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed scratch file");
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove scratch file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, ScratchStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ScratchStore::new(dir.path().join("uploads"));
        (dir, store)
    }

    #[tokio::test]
    async fn persist_writes_payload_and_release_removes_it() {
        let (_guard, store) = store();

        let file = store
            .persist("photo.jpg", "image/jpeg", Bytes::from_static(b"jpeg bytes"))
            .await
            .unwrap();

        assert_eq!(file.original_name, "photo.jpg");
        assert_eq!(file.content_type, "image/jpeg");
        assert_eq!(file.size, 10);
        assert_eq!(fs::read(&file.path).await.unwrap(), b"jpeg bytes");

        store.release(&file).await;
        assert!(!file.path.exists());
    }

    #[tokio::test]
    async fn release_is_idempotent() {
        let (_guard, store) = store();

        let file = store
            .persist("photo.png", "image/png", Bytes::from_static(b"png"))
            .await
            .unwrap();

        store.release(&file).await;
        // Second release on the same path must be a no-op, not an error.
        store.release(&file).await;
        assert!(!file.path.exists());
    }

    #[tokio::test]
    async fn release_on_never_created_path_is_a_noop() {
        let (_guard, store) = store();
        release_path(&store.dir().join("upload-0-000000000.png")).await;
    }

    #[tokio::test]
    async fn concurrent_persists_get_distinct_paths() {
        let (_guard, store) = store();

        let mut paths = std::collections::HashSet::new();
        for _ in 0..32 {
            let file = store
                .persist("a.webp", "image/webp", Bytes::from_static(b"x"))
                .await
                .unwrap();
            assert!(paths.insert(file.path.clone()), "path collision");
        }
    }

    #[tokio::test]
    async fn extension_is_carried_over_from_original_name() {
        let (_guard, store) = store();

        let file = store
            .persist("cat.webp", "image/webp", Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert!(file.path.to_string_lossy().ends_with(".webp"));

        let file = store
            .persist("no-extension", "image/png", Bytes::from_static(b"x"))
            .await
            .unwrap();
        let name = file.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(!name.contains('.'));
        store.release(&file).await;
    }
}
