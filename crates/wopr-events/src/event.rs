//! The daemon's event taxonomy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::topic::Topic;

/// Metadata attached to every published event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique id for this event instance.
    pub id: Uuid,
    /// The component that published the event.
    pub source: String,
    /// Wall-clock time the event was published.
    pub timestamp: DateTime<Utc>,
}

impl EventMetadata {
    /// Stamp a new metadata record for an event published by `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Every event the daemon's subsystems publish to the event bus.
///
/// Each variant carries a concrete payload (replacing a dynamically-typed
/// name-keyed event bus) and knows its own routing [`Topic`] via
/// [`WoprEvent::topic`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WoprEvent {
    /// An injection was accepted onto a session's FIFO queue.
    QueueEnqueue {
        /// Common metadata.
        metadata: EventMetadata,
        /// The session the injection targets.
        session: String,
        /// The injection's id.
        injection_id: String,
    },
    /// The queue began executing an injection (its turn came up).
    QueueStart {
        /// Common metadata.
        metadata: EventMetadata,
        /// The session the injection targets.
        session: String,
        /// The injection's id.
        injection_id: String,
    },
    /// An injection completed successfully.
    QueueComplete {
        /// Common metadata.
        metadata: EventMetadata,
        /// The session the injection targets.
        session: String,
        /// The injection's id.
        injection_id: String,
    },
    /// An injection was cancelled before completion.
    QueueCancel {
        /// Common metadata.
        metadata: EventMetadata,
        /// The session the injection targets.
        session: String,
        /// The injection's id.
        injection_id: String,
    },
    /// An injection failed.
    QueueError {
        /// Common metadata.
        metadata: EventMetadata,
        /// The session the injection targets.
        session: String,
        /// The injection's id.
        injection_id: String,
        /// A human-readable description of the failure.
        message: String,
    },
    /// A session was created (first injection, or explicit create).
    SessionCreate {
        /// Common metadata.
        metadata: EventMetadata,
        /// The session name.
        session: String,
    },
    /// A session was explicitly destroyed.
    SessionDestroy {
        /// Common metadata.
        metadata: EventMetadata,
        /// The session name.
        session: String,
        /// The session's conversation history at the moment of deletion.
        history: serde_json::Value,
        /// An optional caller-supplied reason.
        reason: Option<String>,
    },
    /// An incremental text chunk streamed from a provider during an
    /// in-flight injection.
    SessionResponseChunk {
        /// Common metadata.
        metadata: EventMetadata,
        /// The session name.
        session: String,
        /// The injection's id.
        injection_id: String,
        /// The text delta.
        text: String,
    },
    /// A provider's health/availability flag changed.
    ProviderHealth {
        /// Common metadata.
        metadata: EventMetadata,
        /// The provider id.
        provider_id: String,
        /// Whether the provider is currently considered available.
        available: bool,
    },
}

impl WoprEvent {
    /// The short, stable event-type tag (matches the `type` field in the
    /// serialized form), used in log lines.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::QueueEnqueue { .. } => "queue_enqueue",
            Self::QueueStart { .. } => "queue_start",
            Self::QueueComplete { .. } => "queue_complete",
            Self::QueueCancel { .. } => "queue_cancel",
            Self::QueueError { .. } => "queue_error",
            Self::SessionCreate { .. } => "session_create",
            Self::SessionDestroy { .. } => "session_destroy",
            Self::SessionResponseChunk { .. } => "session_response_chunk",
            Self::ProviderHealth { .. } => "provider_health",
        }
    }

    /// The routing [`Topic`] this event is published under.
    #[must_use]
    pub fn topic(&self) -> Topic {
        match self {
            Self::QueueEnqueue { session, .. }
            | Self::QueueStart { session, .. }
            | Self::QueueComplete { session, .. }
            | Self::QueueCancel { session, .. }
            | Self::QueueError { session, .. }
            | Self::SessionCreate { session }
            | Self::SessionDestroy { session, .. } => Topic::session(session),
            Self::SessionResponseChunk { session, .. } => Topic::session_scoped(session, "logs"),
            Self::ProviderHealth { provider_id, .. } => {
                Topic::new(format!("provider:{provider_id}:status"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_tags() {
        let event = WoprEvent::SessionCreate {
            metadata: EventMetadata::new("queue"),
            session: "alice".to_owned(),
        };
        assert_eq!(event.event_type(), "session_create");
    }

    #[test]
    fn test_event_topic_routing() {
        let event = WoprEvent::QueueEnqueue {
            metadata: EventMetadata::new("queue"),
            session: "alice".to_owned(),
            injection_id: "inj-1".to_owned(),
        };
        assert_eq!(event.topic().as_str(), "session:alice");
    }
}
