//! Typed event channels.
//!
//! A channel carries one event type. Subscribers are plain callbacks; a
//! subscription lives until it is explicitly removed with
//! [`EventChannel::unsubscribe`].
//!
//! ```
//! use opaline_core::events::EventChannel;
//!
//! let channel = EventChannel::<u32>::new();
//! let id = channel.subscribe(|value| log::debug!("received {value}"));
//! assert_eq!(channel.publish(&7), 1);
//! assert!(channel.unsubscribe(id));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Handle identifying one subscription on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Broadcast channel for events of type `E`.
pub struct EventChannel<E> {
    subscribers: Mutex<Vec<(SubscriptionId, Callback<E>)>>,
    next_id: AtomicU64,
}

impl<E> EventChannel<E> {
    /// Create a channel without subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a callback invoked for every published event.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Deliver an event to every subscriber and return how many received it.
    ///
    /// Callbacks run outside the channel lock, so they may subscribe or
    /// unsubscribe; such changes apply from the next publish on.
    pub fn publish(&self, event: &E) -> usize {
        let snapshot: Vec<Callback<E>> = self
            .subscribers
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in &snapshot {
            callback(event);
        }

        snapshot.len()
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<E> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
