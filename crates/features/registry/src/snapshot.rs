use rlist_domain::config::{AccessPolicy, RecipientMode};
use rlist_domain::{Address, Relay};
use serde::{Deserialize, Serialize};

/// Current layout of [`RegistrySnapshot`].
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Complete, serializable state of a registry.
///
/// `relays` keeps storage order, including the reordering done by earlier removals.
/// `manager` is [`Address::ZERO`] when no manager is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    pub format: u32,
    pub owner: Address,
    pub manager: Address,
    pub version: u64,
    pub capacity: usize,
    pub policy: AccessPolicy,
    pub recovery_recipient: RecipientMode,
    pub relays: Vec<Relay>,
}
