use crate::address::Address;
use crate::relay::{Relay, UriHash};
use serde::{Deserialize, Serialize};

/// Audit events emitted by successful registry calls.
///
/// A relay mutation emits its specific event followed by
/// [`RegistryEvent::RegistryUpdated`]; access-control and recovery calls emit a
/// single event. Failed calls emit nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "PascalCase")]
pub enum RegistryEvent {
    OwnerChanged { previous_owner: Address, new_owner: Address },
    /// `new_manager` is [`Address::ZERO`] when the manager was dismissed.
    ManagerChanged { new_manager: Address },
    RelayAdded { relay: Relay, uri_hash: UriHash },
    RelayRemoved { uri: String, uri_hash: UriHash },
    RegistryUpdated { version: u64 },
    TokenRecovered { requested_by: Address, token: Address, amount: u128, recipient: Address },
}

impl RegistryEvent {
    /// Event name as it appears in serialized form.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OwnerChanged { .. } => "OwnerChanged",
            Self::ManagerChanged { .. } => "ManagerChanged",
            Self::RelayAdded { .. } => "RelayAdded",
            Self::RelayRemoved { .. } => "RelayRemoved",
            Self::RegistryUpdated { .. } => "RegistryUpdated",
            Self::TokenRecovered { .. } => "TokenRecovered",
        }
    }
}

/// Latest registry version, published on a watch channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryVersion(pub u64);
