use crate::engine::{SnapshotStore, StoreInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Default)]
pub struct NoPath;
#[derive(Debug)]
pub struct WithPath(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoPath {}
impl Sealed for WithPath {}

#[allow(private_bounds)]
#[derive(Debug)]
pub struct StoreBuilder<S: Sealed = NoPath> {
    state: S,
    create: bool,
}

impl Default for StoreBuilder<NoPath> {
    fn default() -> Self {
        Self { state: NoPath, create: true }
    }
}

#[allow(private_bounds)]
impl<S: Sealed> StoreBuilder<S> {
    #[must_use = "Sets whether the parent directory is created when missing"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.create = enable;
        self
    }
}

impl StoreBuilder<NoPath> {
    #[must_use = "Creates a new store builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the snapshot file the store manages"]
    pub fn path(self, path: impl Into<PathBuf>) -> StoreBuilder<WithPath> {
        StoreBuilder { state: WithPath(path.into()), create: self.create }
    }
}

impl StoreBuilder<WithPath> {
    /// Resolves the snapshot location and opens the store.
    ///
    /// 1. Creates the parent directory when `create(true)` (the default) is set.
    /// 2. Canonicalizes the parent so the store keeps working if the process changes directory.
    /// 3. Removes stale temporary files left next to the snapshot by an interrupted save.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidPath`] if the path has no file name,
    /// [`StorageError::DirectoryNotFound`] if the parent is missing and `create` is false,
    /// and [`StorageError::Io`] if the parent cannot be created or resolved.
    pub async fn connect(self) -> Result<SnapshotStore, StorageError> {
        let path = self.state.0;
        let Some(file_name) = path.file_name().map(ToOwned::to_owned) else {
            return Err(StorageError::InvalidPath {
                message: path.display().to_string().into(),
                context: Some("Snapshot path must name a file".into()),
            });
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if self.create {
            fs::create_dir_all(&parent)
                .await
                .context(format!("Failed to create snapshot directory: {}", parent.display()))?;
        } else if !fs::try_exists(&parent).await.unwrap_or(false) {
            return Err(StorageError::DirectoryNotFound {
                message: parent.display().to_string().into(),
                context: None,
            });
        }

        let directory = fs::canonicalize(&parent)
            .await
            .context(format!("Failed to resolve snapshot directory: {}", parent.display()))?;
        let path = directory.join(file_name);
        info!(path = %path.display(), "Opened snapshot store");

        let store = SnapshotStore {
            inner: Arc::new(StoreInner { directory, path, tmp_counter: AtomicU64::new(1) }),
        };

        store.purge_tmp().await;

        Ok(store)
    }
}
