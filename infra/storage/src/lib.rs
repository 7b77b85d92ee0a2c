//! Durable snapshot files for the relay registry.
//!
//! A [`SnapshotStore`] owns exactly one JSON document. Saves go through an atomic swap
//! (unique temp write, `fsync`, `rename`) so an interrupted process never leaves a truncated
//! snapshot behind, and stale temporaries from such interruptions are removed when the store
//! is opened again.
//!
//! # Examples
//!
//! ```rust
//! use rlist_storage::{SnapshotStore, StorageError};
//!
//! #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
//! struct State {
//!     version: u64,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let file = tmp.path().join("state/relays.json");
//!     let store = SnapshotStore::builder().path(&file).create(true).connect().await?;
//!
//!     store.save(&State { version: 2 }).await?;
//!     assert_eq!(store.load::<State>().await?, Some(State { version: 2 }));
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;

pub use builder::StoreBuilder;
pub use engine::SnapshotStore;
pub use error::{StorageError, StorageErrorExt};
