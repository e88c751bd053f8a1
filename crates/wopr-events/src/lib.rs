//! WOPR Events - the event bus feeding the daemon's WebSocket fan-out.
//!
//! This crate provides:
//! - [`WoprEvent`], the tagged event taxonomy every subsystem publishes
//! - [`Topic`] and its hierarchical matching algebra (§4.9)
//! - [`EventBus`], a broadcast-based bus for async subscribers
//! - [`SubscriberRegistry`], for synchronous, callback-based subscribers
//!
//! # Example
//!
//! ```rust
//! use wopr_events::{EventBus, EventMetadata, WoprEvent};
//!
//! # async fn example() {
//! let bus = EventBus::new();
//! let mut receiver = bus.subscribe();
//!
//! bus.publish(WoprEvent::SessionCreate {
//!     metadata: EventMetadata::new("queue"),
//!     session: "alice".to_string(),
//! });
//!
//! let event = receiver.recv().await.unwrap();
//! assert_eq!(event.event_type(), "session_create");
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod event;
mod subscriber;
mod topic;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventReceiver};
pub use event::{EventMetadata, WoprEvent};
pub use subscriber::{
    EventFilter, EventSubscriber, FilterSubscriber, SubscriberId, SubscriberRegistry,
};
pub use topic::Topic;
