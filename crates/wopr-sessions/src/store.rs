//! The session store (§4.1): name → conversation id, context text, and
//! provider config, backed by a [`KvStore`].
//!
//! Reads of state that was never written return `None`, not an error —
//! "unset, not error" per §4.1's failure semantics. A malformed stored
//! value is logged once and treated as unset rather than propagated.

use std::collections::BTreeSet;
use std::sync::Arc;

use wopr_core::Timestamp;
use wopr_events::{EventBus, EventMetadata, WoprEvent};
use wopr_storage::KvStore;

use crate::error::SessionResult;
use crate::log::ConversationLog;
use crate::types::{ProviderSelection, SessionInfo};

fn id_key(name: &str) -> String {
    format!("id:{name}")
}

fn context_key(name: &str) -> String {
    format!("context:{name}")
}

fn provider_key(name: &str) -> String {
    format!("provider:{name}")
}

fn created_key(name: &str) -> String {
    format!("created:{name}")
}

/// Name→conversation-id mapping plus per-session context and provider
/// config, all persisted through a [`KvStore`].
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Construct a store over `kv`.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn decode<T: serde::de::DeserializeOwned>(key: &str, bytes: Vec<u8>) -> Option<T> {
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, %error, "discarding malformed stored value");
                None
            }
        }
    }

    /// `getSessions() -> map<name, convId>`: every session with a stored
    /// conversation id.
    pub async fn get_sessions(&self) -> SessionResult<std::collections::HashMap<String, String>> {
        let mut out = std::collections::HashMap::new();
        for key in self.kv.keys_with_prefix("id:").await? {
            let name = key.trim_start_matches("id:").to_string();
            if let Some(bytes) = self.kv.get(&key).await? {
                let conv_id = String::from_utf8_lossy(&bytes).into_owned();
                out.insert(name, conv_id);
            }
        }
        Ok(out)
    }

    /// `saveSessionId(name, convId)`: upserts the conversation id. The
    /// creation timestamp is set the first time a session is seen and
    /// never touched again.
    pub async fn save_session_id(&self, name: &str, conv_id: &str) -> SessionResult<()> {
        self.kv.set(&id_key(name), conv_id.as_bytes().to_vec()).await?;
        if self.kv.get(&created_key(name)).await?.is_none() {
            let now = Timestamp::now();
            let encoded = serde_json::to_vec(&now).expect("Timestamp always serializes");
            self.kv.set(&created_key(name), encoded).await?;
        }
        Ok(())
    }

    /// `deleteSessionId(name)`: removes the id only; context/provider
    /// survive.
    pub async fn delete_session_id(&self, name: &str) -> SessionResult<()> {
        self.kv.delete(&id_key(name)).await?;
        Ok(())
    }

    /// `getContext(name)`.
    pub async fn get_context(&self, name: &str) -> SessionResult<Option<String>> {
        Ok(self
            .kv
            .get(&context_key(name))
            .await?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// `setContext(name, context)`: overwrites any existing context.
    pub async fn set_context(&self, name: &str, context: &str) -> SessionResult<()> {
        self.kv.set(&context_key(name), context.as_bytes().to_vec()).await?;
        Ok(())
    }

    /// `getProvider(name)`.
    pub async fn get_provider(&self, name: &str) -> SessionResult<Option<ProviderSelection>> {
        let Some(bytes) = self.kv.get(&provider_key(name)).await? else {
            return Ok(None);
        };
        Ok(Self::decode(&provider_key(name), bytes))
    }

    /// `setProvider(name, provider)`: overwrites any existing selection.
    pub async fn set_provider(&self, name: &str, provider: &ProviderSelection) -> SessionResult<()> {
        let encoded = serde_json::to_vec(provider).expect("ProviderSelection always serializes");
        self.kv.set(&provider_key(name), encoded).await?;
        Ok(())
    }

    async fn created_at(&self, name: &str) -> SessionResult<Option<Timestamp>> {
        let Some(bytes) = self.kv.get(&created_key(name)).await? else {
            return Ok(None);
        };
        Ok(Self::decode(&created_key(name), bytes))
    }

    async fn known_names(&self) -> SessionResult<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for prefix in ["id:", "context:", "provider:", "created:"] {
            for key in self.kv.keys_with_prefix(prefix).await? {
                names.insert(key.trim_start_matches(prefix).to_string());
            }
        }
        Ok(names)
    }

    /// `listSessions()`: joins id, context, provider, and creation
    /// timestamp for every known session.
    pub async fn list_sessions(&self) -> SessionResult<Vec<SessionInfo>> {
        let mut infos = Vec::new();
        for name in self.known_names().await? {
            let conversation_id = self
                .kv
                .get(&id_key(&name))
                .await?
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
            let context = self.get_context(&name).await?;
            let provider = self.get_provider(&name).await?;
            let created_at = self.created_at(&name).await?;
            infos.push(SessionInfo {
                name,
                conversation_id,
                context,
                provider,
                created_at,
            });
        }
        Ok(infos)
    }

    /// `deleteSession(name, reason?)`: reads the session's conversation
    /// history, clears id/context/provider/creation marker, then
    /// publishes `session:destroy` carrying that history and `reason`.
    /// The conversation log file itself is never removed.
    pub async fn delete_session(
        &self,
        name: &str,
        reason: Option<&str>,
        log: &ConversationLog,
        events: &EventBus,
    ) -> SessionResult<()> {
        let history = log.read(name, None)?;
        let history_json = serde_json::to_value(&history).unwrap_or(serde_json::Value::Null);

        self.kv.delete(&id_key(name)).await?;
        self.kv.delete(&context_key(name)).await?;
        self.kv.delete(&provider_key(name)).await?;
        self.kv.delete(&created_key(name)).await?;

        events.publish(WoprEvent::SessionDestroy {
            metadata: EventMetadata::new("session-store"),
            session: name.to_string(),
            history: history_json,
            reason: reason.map(ToString::to_string),
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wopr_storage::MemoryKvStore;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryKvStore::new()))
    }

    #[tokio::test]
    async fn test_unset_reads_return_none() {
        let store = store();
        assert_eq!(store.get_context("alice").await.unwrap(), None);
        assert_eq!(store.get_provider("alice").await.unwrap(), None);
        assert!(store.get_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_session_id_sets_created_once() {
        let store = store();
        store.save_session_id("alice", "conv-1").await.unwrap();
        let first = store.created_at("alice").await.unwrap();

        store.save_session_id("alice", "conv-2").await.unwrap();
        let second = store.created_at("alice").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(
            store.get_sessions().await.unwrap().get("alice"),
            Some(&"conv-2".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_session_id_preserves_context_and_provider() {
        let store = store();
        store.save_session_id("alice", "conv-1").await.unwrap();
        store.set_context("alice", "some context").await.unwrap();
        store
            .set_provider("alice", &ProviderSelection::new("anthropic"))
            .await
            .unwrap();

        store.delete_session_id("alice").await.unwrap();

        assert!(store.get_sessions().await.unwrap().get("alice").is_none());
        assert_eq!(store.get_context("alice").await.unwrap(), Some("some context".to_string()));
        assert!(store.get_provider("alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_set_context_overwrites() {
        let store = store();
        store.set_context("alice", "first").await.unwrap();
        store.set_context("alice", "second").await.unwrap();
        assert_eq!(store.get_context("alice").await.unwrap(), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_list_sessions_joins_all_fields() {
        let store = store();
        store.save_session_id("alice", "conv-1").await.unwrap();
        store.set_context("alice", "ctx").await.unwrap();

        let infos = store.list_sessions().await.unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "alice");
        assert_eq!(infos[0].conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(infos[0].context.as_deref(), Some("ctx"));
        assert!(infos[0].created_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_session_publishes_destroy_with_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = store();
        let log = ConversationLog::new(dir.path());
        let bus = EventBus::new();
        let mut receiver = bus.subscribe();

        store.save_session_id("alice", "conv-1").await.unwrap();
        log.log_message("alice", "cli", "hello", crate::types::EntryKind::Message)
            .unwrap();

        store.delete_session("alice", Some("user requested"), &log, &bus).await.unwrap();

        assert!(store.get_sessions().await.unwrap().get("alice").is_none());
        let event = receiver.recv().await.unwrap();
        match &*event {
            WoprEvent::SessionDestroy { session, reason, history, .. } => {
                assert_eq!(session, "alice");
                assert_eq!(reason.as_deref(), Some("user requested"));
                assert!(history.as_array().is_some_and(|a| !a.is_empty()));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        // The conversation log itself survives session deletion.
        assert_eq!(log.read("alice", None).unwrap().len(), 1);
    }
}
