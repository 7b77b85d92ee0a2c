//! The [`SnapshotStore`] handle: one JSON document on disk, replaced atomically.

use crate::builder::StoreBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance::{self, TMP_MARKER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug)]
pub(crate) struct StoreInner {
    /// Canonical directory holding the snapshot.
    pub(crate) directory: PathBuf,
    /// Full path of the snapshot file.
    pub(crate) path: PathBuf,
    pub(crate) tmp_counter: AtomicU64,
}

/// A handle to a single snapshot file.
///
/// Saves use an atomic swap (unique temp file, `fsync`, `rename`, directory sync) so
/// readers only ever observe a complete previous or complete new document.
/// The handle is reference-counted and cheap to clone.
///
/// # Example
///
/// ```rust
/// use rlist_storage::{SnapshotStore, StorageError};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let store = SnapshotStore::builder().path(tmp.path().join("relays.json")).connect().await?;
///
///     assert_eq!(store.load::<Vec<String>>().await?, None);
///     store.save(&vec!["https://relay.test".to_owned()]).await?;
///     assert_eq!(store.load::<Vec<String>>().await?.map(|v| v.len()), Some(1));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    pub(crate) inner: Arc<StoreInner>,
}

impl SnapshotStore {
    #[must_use = "The store is not opened until you call .connect()"]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Resolved location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Whether a snapshot has been saved.
    pub async fn exists(&self) -> bool {
        fs::try_exists(&self.inner.path).await.unwrap_or(false)
    }

    /// Loads and decodes the snapshot, returning `None` when no snapshot exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be read and
    /// [`StorageError::Serialization`] if its contents do not decode into `T`.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StorageError> {
        let Some(data) = self.read().await? else {
            return Ok(None);
        };

        let value = serde_json::from_slice(&data)
            .context(format!("Failed to decode snapshot: {}", self.inner.path.display()))?;
        Ok(Some(value))
    }

    /// Encodes `value` as pretty JSON and replaces the snapshot atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] if `value` cannot be encoded and
    /// [`StorageError::Io`] if the disk is full or the swap fails.
    pub async fn save<T: Serialize + ?Sized>(&self, value: &T) -> Result<(), StorageError> {
        let mut data = serde_json::to_vec_pretty(value).context("Failed to encode snapshot")?;
        data.push(b'\n');
        self.write(&data).await
    }

    /// Removes the snapshot. Returns `false` when there was nothing to remove.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file exists but cannot be removed.
    pub async fn delete(&self) -> Result<bool, StorageError> {
        match fs::remove_file(&self.inner.path).await {
            Ok(()) => {
                debug!(path = %self.inner.path.display(), "Snapshot deleted");
                Ok(true)
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", self.inner.path.display()).into()),
            }),
        }
    }

    pub async fn purge_tmp(&self) {
        if let Some(name) = self.inner.path.file_name().and_then(|n| n.to_str()) {
            maintenance::purge_tmp(&self.inner.directory, name).await;
        }
    }

    async fn read(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(&self.inner.path).await {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", self.inner.path.display()).into()),
            }),
        }
    }

    async fn write(&self, data: &[u8]) -> Result<(), StorageError> {
        let target = &self.inner.path;
        let temp = unique_tmp_path(target, &self.inner.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, target).await {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(target)
                    .await
                    .context(format!("Failed to replace existing file: {}", target.display()))?;
                fs::rename(&temp, target).await.context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    target.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                            .into(),
                    ),
                });
            }
        }

        Self::sync_dir(&self.inner.directory).await;

        debug!(path = %target.display(), bytes = data.len(), "Snapshot saved atomically");
        Ok(())
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    tracing::warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("snapshot");
    let tmp_name = format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id());
    target.with_file_name(tmp_name)
}
