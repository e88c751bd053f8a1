//! Synchronous, callback-based subscribers to the event bus.
//!
//! Most consumers should prefer [`crate::EventBus::subscribe`] (an async
//! [`crate::EventReceiver`]); the registry here exists for components
//! that need an immediate, in-line callback (e.g. updating an in-memory
//! counter) without spawning a task to drain a channel.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::event::WoprEvent;

/// Opaque handle identifying a registered synchronous subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// A filter restricting which events reach a synchronous subscriber.
///
/// `None` means "every event"; `Some(pattern)` filters by the event's
/// topic using the same matching algebra as WebSocket subscriptions.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pattern: Option<String>,
}

impl EventFilter {
    /// Accept every event.
    #[must_use]
    pub fn all() -> Self {
        Self { pattern: None }
    }

    /// Accept only events whose topic matches `pattern`.
    #[must_use]
    pub fn topic(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
        }
    }

    fn accepts(&self, event: &WoprEvent) -> bool {
        match &self.pattern {
            None => true,
            Some(pattern) => event.topic().matches(pattern),
        }
    }
}

/// A synchronous event subscriber.
pub trait EventSubscriber: Send + Sync {
    /// Called in-line by [`EventBus::publish`](crate::EventBus::publish)
    /// for every event accepted by this subscriber's filter.
    fn on_event(&self, event: &WoprEvent);
}

/// Adapts a closure into an [`EventSubscriber`].
pub struct FilterSubscriber<F: Fn(&WoprEvent) + Send + Sync> {
    callback: F,
}

impl<F: Fn(&WoprEvent) + Send + Sync> FilterSubscriber<F> {
    /// Wrap `callback` as a subscriber.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: Fn(&WoprEvent) + Send + Sync> EventSubscriber for FilterSubscriber<F> {
    fn on_event(&self, event: &WoprEvent) {
        (self.callback)(event);
    }
}

/// Registry of synchronous subscribers, keyed by [`SubscriberId`].
#[derive(Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    entries: DashMap<SubscriberId, (EventFilter, Arc<dyn EventSubscriber>)>,
}

impl std::fmt::Debug for SubscriberRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl SubscriberRegistry {
    /// Construct an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber`, accepting events matching `filter`.
    pub fn register(
        &self,
        filter: EventFilter,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(id, (filter, subscriber));
        id
    }

    /// Remove a previously registered subscriber.
    pub fn unregister(&self, id: SubscriberId) {
        self.entries.remove(&id);
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Invoke every subscriber whose filter accepts `event`.
    pub fn notify(&self, event: &WoprEvent) {
        for entry in &self.entries {
            let (filter, subscriber) = entry.value();
            if filter.accepts(event) {
                subscriber.on_event(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventMetadata;
    use std::sync::atomic::AtomicUsize;

    fn sample_event(session: &str) -> WoprEvent {
        WoprEvent::SessionCreate {
            metadata: EventMetadata::new("test"),
            session: session.to_owned(),
        }
    }

    #[test]
    fn test_registry_notifies_matching_subscriber() {
        let registry = SubscriberRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        registry.register(
            EventFilter::topic("session:alice"),
            Arc::new(FilterSubscriber::new(move |_| {
                count_clone.fetch_add(1, Ordering::Relaxed);
            })),
        );

        registry.notify(&sample_event("alice"));
        registry.notify(&sample_event("bob"));

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unregister_stops_notifications() {
        let registry = SubscriberRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let id = registry.register(
            EventFilter::all(),
            Arc::new(FilterSubscriber::new(move |_| {
                count_clone.fetch_add(1, Ordering::Relaxed);
            })),
        );

        registry.notify(&sample_event("alice"));
        registry.unregister(id);
        registry.notify(&sample_event("alice"));

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }
}
