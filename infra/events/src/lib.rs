//! # Event Bus
//!
//! A small, type-safe event bus used to publish registry events to in-process observers.
//!
//! * **Broadcast** channels fan every event out to every subscriber (audit consumers, indexers).
//! * **Watch** channels keep only the latest value (e.g. the current registry version).
//!
//! Channels are keyed by the Rust type of the event and built on `tokio::sync` primitives,
//! so publishing never blocks and works without a running runtime.
//!
//! # Example
//!
//! ```rust
//! use rlist_event_bus::{EventBus, EventBusError};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Version(u64);
//!
//! fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let rx = bus.watch(Version(0))?;
//!
//!     bus.publish_latest(Version(3))?;
//!     assert_eq!(rx.borrow().0, 3);
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{ChannelKind, DEFAULT_CAPACITY, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
