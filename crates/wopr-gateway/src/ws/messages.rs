//! Wire messages for the `/ws` pub/sub protocol (§4.9).

use serde::{Deserialize, Serialize};

/// A message a client sends to the gateway.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Authenticate the connection. Must precede any `subscribe`.
    Auth {
        /// The bearer token to verify.
        token: String,
    },
    /// Subscribe to one or more topics.
    Subscribe(SubscribeRequest),
    /// Unsubscribe from one or more topics.
    Unsubscribe(SubscribeRequest),
    /// Liveness probe; answered with `pong`.
    Ping,
}

/// The three equivalent shapes a subscribe/unsubscribe request may use:
/// an explicit topic list, a list of session names (expanded to
/// `session:{name}`), or a single session name.
#[derive(Debug, Deserialize, Default)]
pub struct SubscribeRequest {
    /// Raw topic patterns (e.g. `"session:alice:logs"`, `"sessions"`, `"*"`).
    #[serde(default)]
    pub topics: Vec<String>,
    /// Session names, expanded to `session:{name}`.
    #[serde(default)]
    pub sessions: Vec<String>,
    /// A single session name, expanded to `session:{name}`.
    #[serde(default)]
    pub session: Option<String>,
}

impl SubscribeRequest {
    /// Flatten the three input shapes into one list of topic patterns,
    /// dropping empty entries.
    #[must_use]
    pub fn into_patterns(self) -> Vec<String> {
        let mut patterns: Vec<String> = self.topics.into_iter().filter(|t| !t.is_empty()).collect();
        patterns.extend(self.sessions.into_iter().filter(|s| !s.is_empty()).map(|s| format!("session:{s}")));
        if let Some(session) = self.session.filter(|s| !s.is_empty()) {
            patterns.push(format!("session:{session}"));
        }
        patterns
    }
}

/// A message the gateway sends to a client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent immediately on connect, before authentication.
    Connected,
    /// Acknowledges an accepted `subscribe`, echoing the patterns that
    /// were actually added (invalid/empty entries are filtered out).
    Subscribed {
        /// Patterns accepted.
        topics: Vec<String>,
    },
    /// Acknowledges an `unsubscribe`.
    Unsubscribed {
        /// Patterns removed.
        topics: Vec<String>,
    },
    /// Answers a client `ping`.
    Pong,
    /// A published event matching one of the client's subscriptions.
    Event {
        /// The topic the event was published under.
        topic: String,
        /// The event payload.
        data: serde_json::Value,
    },
    /// An error: bad auth, backpressure, malformed message.
    Error {
        /// Human-readable description.
        message: String,
        /// A stable machine-readable code, when applicable.
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl ServerMessage {
    /// Serialize to the JSON text frame sent over the socket.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{\"type\":\"error\",\"message\":\"encode failure\"}".to_string())
    }
}
