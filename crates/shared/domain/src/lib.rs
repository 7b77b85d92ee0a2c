//! # Domain Models
//!
//! Pure data types of the relay list with minimal dependencies (`serde`, `hex`, `thiserror`).
//! Keep it lean: no I/O, no hashing, no registry rules. Those live in `rlist-registry`.

pub mod address;
pub mod config;
pub mod events;
pub mod relay;

pub use address::{Address, AddressError};
pub use events::{RegistryEvent, RegistryVersion};
pub use relay::{Relay, Relays, UriHash};
