//! Subscriber registry for the notification feed.
//!
//! Subscribers are plain callbacks keyed by a [`SubscriptionId`] token.
//! Tokens are handed out in increasing order, so iterating the map visits
//! subscribers in registration order.

use std::collections::BTreeMap;
use std::sync::Arc;

use ecourts_core::notification::Notification;

/// Callback invoked with the full feed after every change.
pub type Subscriber = Arc<dyn Fn(&[Notification]) + Send + Sync>;

/// Token returned by `subscribe` and accepted by `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Live subscribers in registration order.
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: u64,
    subscribers: BTreeMap<SubscriptionId, Subscriber>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback and return its token.
    pub fn insert(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.insert(id, subscriber);
        id
    }

    /// Remove a callback. Returns `false` if the token is unknown or was
    /// already removed.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    /// Invoke every callback, in registration order, with `feed`.
    pub fn notify_all(&self, feed: &[Notification]) {
        for subscriber in self.subscribers.values() {
            subscriber(feed);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
