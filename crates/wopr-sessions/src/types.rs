//! Data model for sessions and conversation entries (§3).

use serde::{Deserialize, Serialize};
use wopr_core::Timestamp;

/// A session's per-session provider selection (§3 `ProviderConfig`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderSelection {
    /// Provider id (matches a name registered in `wopr_llm::ProviderRegistry`).
    pub name: String,
    /// Model override; falls back to the provider's default when unset.
    #[serde(default)]
    pub model: Option<String>,
    /// Provider ids tried, in order, if `name` is unavailable.
    #[serde(default)]
    pub fallback: Vec<String>,
}

impl ProviderSelection {
    /// Select a provider by name with no model override or fallback.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: None,
            fallback: Vec::new(),
        }
    }
}

/// A joined, read-only view of one session's stored state
/// (`listSessions` in §4.1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    /// The session name.
    pub name: String,
    /// Current provider conversation id, if any.
    pub conversation_id: Option<String>,
    /// Persisted system context text, if any.
    pub context: Option<String>,
    /// Persisted provider selection, if any.
    pub provider: Option<ProviderSelection>,
    /// Creation timestamp, if the session has ever been created.
    pub created_at: Option<Timestamp>,
}

/// The kind of a conversation log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// An inbound message.
    Message,
    /// A model response.
    Response,
    /// Context assembled for an injection, including middleware-block
    /// notices ("Message blocked by hook.", "Response blocked by hook.").
    Context,
    /// A tool call or its result.
    Tool,
    /// A system-level notice.
    System,
}

/// One append-only conversation log record (§3 `ConversationEntry`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationEntry {
    /// Monotonic timestamp of this entry.
    pub ts: Timestamp,
    /// Free-text origin label (e.g. a user name, `cli`, a plugin id).
    pub from: String,
    /// Optional stable sender identifier distinct from `from`.
    #[serde(default)]
    pub sender_id: Option<String>,
    /// Entry content.
    pub content: String,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Optional external platform channel reference.
    #[serde(default)]
    pub channel: Option<String>,
}

impl ConversationEntry {
    /// Construct an entry with the given kind, timestamped now.
    #[must_use]
    pub fn new(from: impl Into<String>, content: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            ts: Timestamp::now(),
            from: from.into(),
            sender_id: None,
            content: content.into(),
            kind,
            channel: None,
        }
    }

    /// Attach a sender id.
    #[must_use]
    pub fn with_sender_id(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// Attach an external channel reference.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_selection_new_has_no_fallback() {
        let selection = ProviderSelection::new("anthropic");
        assert_eq!(selection.name, "anthropic");
        assert!(selection.fallback.is_empty());
    }

    #[test]
    fn test_conversation_entry_builder() {
        let entry = ConversationEntry::new("alice", "hello", EntryKind::Message)
            .with_sender_id("u-123")
            .with_channel("discord");
        assert_eq!(entry.sender_id.as_deref(), Some("u-123"));
        assert_eq!(entry.channel.as_deref(), Some("discord"));
    }
}
