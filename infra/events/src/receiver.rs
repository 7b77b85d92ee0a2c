use crate::bus::Event;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::warn;

/// Ergonomic receive for bus subscriptions.
///
/// A lagging broadcast receiver skips ahead to the oldest retained event instead of
/// surfacing the lag as an error. For `watch::Receiver`, `recv` waits for a change
/// before returning the latest value.
pub trait EventReceiverExt<T> {
    /// Receive the next event, returning `None` once the channel is closed.
    fn recv(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;
}

impl<T: Event> EventReceiverExt<T> for broadcast::Receiver<Arc<T>> {
    async fn recv(&mut self) -> Option<Arc<T>> {
        loop {
            match Self::recv(self).await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        event = std::any::type_name::<T>(),
                        skipped, "Event receiver lagged; continuing from the oldest retained event"
                    );
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl<T: Event> EventReceiverExt<T> for watch::Receiver<Arc<T>> {
    async fn recv(&mut self) -> Option<Arc<T>> {
        self.changed().await.ok()?;
        Some(Arc::clone(&self.borrow_and_update()))
    }
}
