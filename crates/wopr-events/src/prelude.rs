//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wopr_events::prelude::*;` to import all essential types.

// Event bus
pub use crate::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventReceiver};

// Events & topics
pub use crate::{EventMetadata, Topic, WoprEvent};

// Subscriber system
pub use crate::{EventFilter, EventSubscriber, FilterSubscriber, SubscriberId, SubscriberRegistry};
