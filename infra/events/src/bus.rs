use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::trace;

/// Buffer of a broadcast channel when the bus is created with [`EventBus::new`].
/// Large enough to hold the events of a full registry rebuild.
pub const DEFAULT_CAPACITY: usize = 256;
const MIN_CAPACITY: usize = 1;

/// Supported channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Broadcast (fan-out) semantics: every subscriber sees every event.
    Broadcast { capacity: usize },
    /// Watch (latest-value) semantics.
    Watch,
}

impl ChannelKind {
    const fn same_kind(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Broadcast { .. }, Self::Broadcast { .. }) | (Self::Watch, Self::Watch)
        )
    }
}

/// Marker trait for types that can be sent across the [`EventBus`].
///
/// Any type that is `Send + Sync + 'static` automatically implements this trait.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct Channel {
    kind: ChannelKind,
    sender: Box<dyn Any + Send + Sync>,
}

impl Channel {
    fn sender<S, T>(&self, requested: ChannelKind) -> Result<S, EventBusError>
    where
        S: Clone + 'static,
        T: Event,
    {
        if !self.kind.same_kind(requested) {
            return Err(EventBusError::ChannelKindMismatch {
                message: format!(
                    "Expected {requested:?} but found {:?} for {}",
                    self.kind,
                    type_name::<T>()
                )
                .into(),
                context: None,
            });
        }

        self.sender.downcast_ref::<S>().cloned().ok_or_else(|| EventBusError::TypeMismatch {
            message: type_name::<T>().into(),
            context: Some("Unexpected event type".into()),
        })
    }
}

/// A thread-safe, typed event bus.
///
/// Channels are indexed by the [`TypeId`] of the event and created lazily on first use.
/// Cloning the bus is cheap and every clone shares the same channels.
#[derive(Debug, Clone)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, Channel>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self { channels: Arc::default(), capacity: DEFAULT_CAPACITY }
    }
}

impl EventBus {
    /// Creates a new, empty `EventBus`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus whose broadcast channels buffer `capacity` events per subscriber.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, EventBusError> {
        Ok(Self { channels: Arc::default(), capacity: validate_capacity(capacity)? })
    }

    /// Subscribes to every future event of type `T`.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is already carried by a watch channel.
    ///
    /// # Examples
    /// ```rust
    /// use rlist_event_bus::{EventBus, EventReceiverExt};
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct RelayAdded(&'static str);
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), rlist_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let mut rx = bus.subscribe::<RelayAdded>()?;
    /// bus.publish(RelayAdded("https://relay.test"))?;
    /// assert_eq!(rx.recv().await.unwrap().0, "https://relay.test");
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        Ok(self.broadcast_sender::<T>()?.subscribe())
    }

    /// Subscribes to the latest value of type `T`, seeding the channel with `initial`
    /// when nobody has published one yet.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is already carried by a broadcast channel.
    pub fn watch<T: Event>(&self, initial: T) -> Result<watch::Receiver<Arc<T>>, EventBusError> {
        let initial = Arc::new(initial);
        let sender = self
            .sender::<watch::Sender<Arc<T>>, T>(ChannelKind::Watch, move || {
                watch::channel(initial).0
            })?;
        Ok(sender.subscribe())
    }

    /// Publishes an event to all current subscribers of `T`.
    ///
    /// Returns the number of subscribers that received it; zero is not an error.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is already carried by a watch channel.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes a shared event instance without re-wrapping.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is already carried by a watch channel.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.broadcast_sender::<T>()?;
        let delivered = sender.send(event).unwrap_or(0);
        trace!(event = type_name::<T>(), delivered, "Event dispatched");
        Ok(delivered)
    }

    /// Replaces the latest value of `T`, creating the watch channel if missing.
    ///
    /// # Errors
    /// Returns [`EventBusError::ChannelKindMismatch`] if `T` is already carried by a broadcast channel.
    pub fn publish_latest<T: Event>(&self, value: T) -> Result<(), EventBusError> {
        let value = Arc::new(value);
        let seed = Arc::clone(&value);
        let sender = self
            .sender::<watch::Sender<Arc<T>>, T>(ChannelKind::Watch, move || watch::channel(seed).0)?;
        sender.send_replace(value);
        Ok(())
    }

    /// Drops every channel; subscribers observe closure.
    ///
    /// Returns the number of channels that were closed.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn broadcast_sender<T: Event>(&self) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let capacity = self.capacity;
        self.sender::<broadcast::Sender<Arc<T>>, T>(ChannelKind::Broadcast { capacity }, || {
            broadcast::channel(capacity).0
        })
    }

    fn sender<S, T>(
        &self,
        kind: ChannelKind,
        create: impl FnOnce() -> S,
    ) -> Result<S, EventBusError>
    where
        S: Clone + Send + Sync + 'static,
        T: Event,
    {
        let id = TypeId::of::<T>();

        if let Some(channel) = self.channels.read().get(&id) {
            return channel.sender::<S, T>(kind);
        }

        let mut channels = self.channels.write();
        let channel = channels.entry(id).or_insert_with(|| {
            trace!(event = type_name::<T>(), ?kind, "Initializing new event channel");
            Channel { kind, sender: Box::new(create()) }
        });
        channel.sender::<S, T>(kind)
    }
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity < MIN_CAPACITY {
        return Err(EventBusError::InvalidCapacity {
            message: format!("capacity must be >= {MIN_CAPACITY}").into(),
            context: None,
        });
    }
    Ok(capacity)
}
