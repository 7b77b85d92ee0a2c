//! # Relay Allowed List
//!
//! A bounded, access-controlled registry of relays.
//!
//! * **Relays** ([`relays`]): at most `capacity` entries keyed by URI, a version counter
//!   bumped on every successful add or remove, and swap-remove ordering.
//! * **Roles** ([`access`]): an owner and, unless the policy is owner-only, a delegated
//!   manager allowed to add and remove relays.
//! * **Recovery** ([`recovery`]): the owner can move foreign tokens held by the registry
//!   through an external [`TokenTransfer`] capability.
//! * **Events**: every successful call appends to an audit journal and is published on an
//!   [`EventBus`](rlist_event_bus::EventBus).
//!
//! [`RelayAllowedList`] ties these together behind a single lock.

pub mod access;
mod allowed_list;
mod error;
pub mod events;
mod hashing;
pub mod recovery;
pub mod relays;
mod snapshot;

pub use crate::allowed_list::{
    AllowedListBuilder, FromSnapshot, NoOwner, RelayAllowedList, WithOwner,
};
pub use crate::error::{ErrorKind, RegistryError, RegistryErrorExt};
pub use crate::events::{EventJournal, JournalRecord};
pub use crate::hashing::uri_hash;
pub use crate::recovery::{
    MemoryLedger, NoTokens, TokenBehaviour, TokenTransfer, TransferSignal, settle_transfer,
};
pub use crate::snapshot::{RegistrySnapshot, SNAPSHOT_FORMAT};
