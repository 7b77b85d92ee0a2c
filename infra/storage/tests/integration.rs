use rlist_storage::*;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Listing {
    version: u64,
    uris: Vec<String>,
}

fn listing(version: u64, uris: &[&str]) -> Listing {
    Listing { version, uris: uris.iter().map(ToString::to_string).collect() }
}

fn tmp_files(dir: &std::path::Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.contains(".rlisttmp."))
        .collect()
}

#[tokio::test]
async fn test_missing_snapshot_loads_as_none() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::builder().path(temp.path().join("relays.json")).connect().await.unwrap();

    assert!(!store.exists().await);
    assert_eq!(store.load::<Listing>().await.unwrap(), None);
}

#[tokio::test]
async fn test_save_load_roundtrip_and_overwrite() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::builder().path(temp.path().join("relays.json")).connect().await.unwrap();

    store.save(&listing(1, &["https://a.test"])).await.unwrap();
    store.save(&listing(2, &["https://a.test", "https://b.test"])).await.unwrap();

    assert!(store.exists().await);
    assert_eq!(
        store.load::<Listing>().await.unwrap(),
        Some(listing(2, &["https://a.test", "https://b.test"]))
    );
    assert!(tmp_files(temp.path()).is_empty(), "atomic swap must not leave temporaries");

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.ends_with('\n'));
}

#[tokio::test]
async fn test_parent_directory_is_created() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("nested/state/relays.json");
    let store = SnapshotStore::builder().path(&file).connect().await.unwrap();

    store.save(&listing(0, &[])).await.unwrap();
    assert!(file.exists());
}

#[tokio::test]
async fn test_missing_directory_without_create_fails() {
    let temp = TempDir::new().unwrap();
    let err = SnapshotStore::builder()
        .path(temp.path().join("absent/relays.json"))
        .create(false)
        .connect()
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::DirectoryNotFound { .. }));
}

#[tokio::test]
async fn test_path_without_file_name_is_rejected() {
    let err = SnapshotStore::builder().path("/").connect().await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidPath { .. }));
}

#[tokio::test]
async fn test_corrupted_snapshot_reports_serialization_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("relays.json");
    std::fs::write(&file, b"{ not json").unwrap();

    let store = SnapshotStore::builder().path(&file).connect().await.unwrap();
    let err = store.load::<Listing>().await.unwrap_err();

    assert!(matches!(err, StorageError::Serialization { context: Some(_), .. }));
    assert_eq!(err.variant(), "Serialization");
}

#[tokio::test]
async fn test_delete_reports_presence() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::builder().path(temp.path().join("relays.json")).connect().await.unwrap();

    assert!(!store.delete().await.unwrap());
    store.save(&listing(1, &[])).await.unwrap();
    assert!(store.delete().await.unwrap());
    assert_eq!(store.load::<Listing>().await.unwrap(), None);
}

#[tokio::test]
async fn test_stale_temporaries_are_purged_on_connect() {
    let temp = TempDir::new().unwrap();
    let stale = temp.path().join("relays.json.rlisttmp.1.1");
    let fresh = temp.path().join("relays.json.rlisttmp.1.2");
    let unrelated = temp.path().join("other.json.rlisttmp.1.1");

    for path in [&stale, &fresh, &unrelated] {
        std::fs::write(path, b"partial").unwrap();
    }
    let old = SystemTime::now() - Duration::from_secs(3600);
    for path in [&stale, &unrelated] {
        std::fs::File::options().write(true).open(path).unwrap().set_modified(old).unwrap();
    }

    let _store =
        SnapshotStore::builder().path(temp.path().join("relays.json")).connect().await.unwrap();

    assert!(!stale.exists(), "stale temporary should be removed");
    assert!(fresh.exists(), "fresh temporary may belong to a concurrent writer");
    assert!(unrelated.exists(), "temporaries of other snapshots are untouched");
}
