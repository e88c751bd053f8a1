//! Request/response shapes for the queue manager.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wopr_core::InjectionSource;

/// The payload handed to the executor for one injection.
///
/// The queue manager treats `message` as opaque; unifying string and
/// multimodal shapes is the executor's concern (§4.6 step 3), not the
/// queue's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InjectPayload {
    /// The raw message content.
    pub message: Value,
    /// Who sent this injection, for prompt prefixing and logging.
    pub from: String,
    /// The originating channel/platform, if any.
    pub channel: Option<String>,
    /// Where this injection came from, for the executor's security check
    /// (§4.6 step 1). Defaults to a local CLI source.
    pub source: InjectionSource,
}

impl InjectPayload {
    /// Construct a payload with no channel set and a default CLI source.
    #[must_use]
    pub fn new(message: impl Into<Value>, from: impl Into<String>) -> Self {
        Self { message: message.into(), from: from.into(), channel: None, source: InjectionSource::cli() }
    }

    /// Attach a channel to this payload.
    #[must_use]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Attach an explicit source, replacing the default CLI source.
    #[must_use]
    pub fn with_source(mut self, source: InjectionSource) -> Self {
        self.source = source;
        self
    }
}

/// What one injection resolves to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InjectResult {
    /// The assembled response text.
    pub response: String,
    /// The provider conversation id, if the executor established or resumed
    /// one.
    pub conversation_id: Option<String>,
}

impl InjectResult {
    /// Construct a result.
    #[must_use]
    pub fn new(response: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self { response: response.into(), conversation_id }
    }
}

/// Queue depth for one session, or aggregated across all sessions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// `1` if an entry is currently executing, `0` otherwise (a session
    /// lane runs at most one entry at a time).
    pub active: usize,
    /// Entries waiting for the lane to free up.
    pub queued: usize,
}
