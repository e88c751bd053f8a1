//! Hierarchical, dotted-colon topic names and the WebSocket matching algebra.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A hierarchical topic name (e.g. `"session:alice"`, `"session:alice:logs"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Wrap a raw topic string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The `instances` meta-topic that subscribes to every `instance:*`
    /// sub-topic for every instance.
    #[must_use]
    pub fn instances_root() -> Self {
        Self("instances".to_owned())
    }

    /// The root topic for one instance (`instance:{id}`).
    #[must_use]
    pub fn instance(id: &str) -> Self {
        Self(format!("instance:{id}"))
    }

    /// A sub-topic scoped to one instance (`instance:{id}:{suffix}`, e.g.
    /// `logs`/`status`/`session`).
    #[must_use]
    pub fn instance_scoped(id: &str, suffix: &str) -> Self {
        Self(format!("instance:{id}:{suffix}"))
    }

    /// The `sessions` meta-topic that subscribes to every `session:*`
    /// sub-topic for every session (legacy family, §4.9).
    #[must_use]
    pub fn sessions_root() -> Self {
        Self("sessions".to_owned())
    }

    /// The root topic for one session (`session:{name}`, legacy).
    #[must_use]
    pub fn session(name: &str) -> Self {
        Self(format!("session:{name}"))
    }

    /// A sub-topic scoped to one session (`session:{name}:{suffix}`, e.g.
    /// `logs`/`status`, legacy).
    #[must_use]
    pub fn session_scoped(name: &str, suffix: &str) -> Self {
        Self(format!("session:{name}:{suffix}"))
    }

    /// Borrow the raw topic string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Does this topic satisfy a client's subscription `pattern`?
    ///
    /// Matching rules, in order:
    /// - `*` matches everything.
    /// - `instances` matches any `instance:*` topic; `sessions` matches
    ///   any `session:*` topic (the legacy family gets the same
    ///   meta-topic treatment).
    /// - A generic `X:Y` pattern matches any `X:Y:*` topic (and `X:Y`
    ///   itself) — this covers `instance:{id}` against
    ///   `instance:{id}:logs`/`:status`/`:session`, and `session:{name}`
    ///   against its own sub-topics, with the same rule.
    /// - Otherwise, exact string match.
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        if pattern == "*" {
            return true;
        }
        if pattern == "instances" {
            return self.0.starts_with("instance:");
        }
        if pattern == "sessions" {
            return self.0.starts_with("session:");
        }
        if let Some((family, scope)) = pattern.split_once(':') {
            let prefix = format!("{family}:");
            if let Some(topic_scope) = self.0.strip_prefix(&prefix) {
                return topic_scope == scope
                    || topic_scope
                        .strip_prefix(scope)
                        .is_some_and(|rest| rest.starts_with(':'));
            }
            return false;
        }
        self.0 == pattern
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
