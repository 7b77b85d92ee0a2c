use rlist_domain::config::{
    AccessPolicy, AppConfig, DEFAULT_CAPACITY, LoggingConfig, RecipientMode, RegistryConfig,
    StorageConfig,
};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let registry = RegistryConfig::default();
    assert_eq!(registry.capacity, DEFAULT_CAPACITY);
    assert_eq!(registry.capacity, 40);
    assert_eq!(registry.policy, AccessPolicy::OwnerOrManager);
    assert_eq!(registry.recovery_recipient, RecipientMode::CallerSpecified);

    let storage = StorageConfig::default();
    assert_eq!(storage.snapshot, std::path::PathBuf::from("relays.json"));

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(!logging.json);
    assert!(logging.directory.is_none());
}

#[test]
fn app_config_deserializes() {
    let raw = json!({
        "registry": { "capacity": 8, "policy": "owner-only", "recovery_recipient": "owner" },
        "storage": { "snapshot": "/tmp/relays.json" },
        "logging": { "level": "debug" }
    });

    let cfg: AppConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.registry.capacity, 8);
    assert_eq!(cfg.registry.policy, AccessPolicy::OwnerOnly);
    assert_eq!(cfg.registry.recovery_recipient, RecipientMode::Owner);
    assert_eq!(cfg.storage.snapshot, std::path::PathBuf::from("/tmp/relays.json"));
    assert_eq!(cfg.logging.level, "debug");
}

#[test]
fn partial_sections_keep_defaults() {
    let cfg: AppConfig =
        serde_json::from_value(json!({ "registry": { "capacity": 3 } })).expect("deserialize");

    assert_eq!(cfg.registry.capacity, 3);
    assert_eq!(cfg.registry.policy, AccessPolicy::OwnerOrManager);
    assert_eq!(cfg.storage.snapshot, std::path::PathBuf::from("relays.json"));
}

#[test]
fn deref_mut_clones_on_write() {
    let original = AppConfig::default();
    let mut changed = original.clone();
    changed.registry.capacity = 5;

    assert_eq!(original.registry.capacity, DEFAULT_CAPACITY);
    assert_eq!(changed.registry.capacity, 5);
}
