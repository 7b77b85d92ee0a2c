use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Default hard cap on the number of relays.
pub const DEFAULT_CAPACITY: usize = 40;

/// Top-level configuration shared by the binaries.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub registry: RegistryConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Which identities may add and remove relays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessPolicy {
    /// Single owner, no manager role ("whitelist").
    OwnerOnly,
    /// Owner plus an optional delegated manager ("allowed list").
    #[default]
    OwnerOrManager,
}

/// Where recovered tokens are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecipientMode {
    /// The owner names the recipient on every call.
    #[default]
    CallerSpecified,
    /// Tokens always go to the current owner.
    Owner,
}

/// Policy constants fixed when the registry is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub capacity: usize,
    pub policy: AccessPolicy,
    pub recovery_recipient: RecipientMode,
}

/// Snapshot file location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub snapshot: PathBuf,
}

/// Log output knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub directory: Option<PathBuf>,
}

// --- Default ---

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: AccessPolicy::default(),
            recovery_recipient: RecipientMode::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { snapshot: PathBuf::from("relays.json") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, directory: None }
    }
}
