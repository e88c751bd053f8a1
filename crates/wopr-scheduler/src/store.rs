//! Persisted trigger storage (§4.10), backed by a [`KvStore`].

use std::sync::Arc;

use wopr_storage::KvStore;

use crate::error::{SchedulerError, SchedulerResult};
use crate::types::Trigger;

fn trigger_key(name: &str) -> String {
    format!("trigger:{name}")
}

/// Name-keyed persistence for cron and one-shot triggers.
pub struct TriggerStore {
    kv: Arc<dyn KvStore>,
}

impl std::fmt::Debug for TriggerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerStore").finish_non_exhaustive()
    }
}

impl TriggerStore {
    /// Construct a store over `kv`.
    #[must_use]
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Persist `trigger`, overwriting any existing trigger of the same name.
    pub async fn save(&self, trigger: &Trigger) -> SchedulerResult<()> {
        let encoded = serde_json::to_vec(trigger).expect("Trigger always serializes");
        self.kv.set(&trigger_key(trigger.name()), encoded).await?;
        Ok(())
    }

    /// Fetch one trigger by name.
    pub async fn get(&self, name: &str) -> SchedulerResult<Option<Trigger>> {
        let Some(bytes) = self.kv.get(&trigger_key(name)).await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(trigger) => Ok(Some(trigger)),
            Err(error) => {
                tracing::warn!(name, %error, "discarding malformed stored trigger");
                Ok(None)
            }
        }
    }

    /// Remove a trigger by name. Removing an absent trigger is not an error.
    pub async fn delete(&self, name: &str) -> SchedulerResult<()> {
        self.kv.delete(&trigger_key(name)).await?;
        Ok(())
    }

    /// Remove a trigger by name, returning an error if it did not exist.
    pub async fn delete_existing(&self, name: &str) -> SchedulerResult<()> {
        if self.get(name).await?.is_none() {
            return Err(SchedulerError::NotFound { name: name.to_string() });
        }
        self.delete(name).await
    }

    /// List every persisted trigger.
    pub async fn list(&self) -> SchedulerResult<Vec<Trigger>> {
        let mut triggers = Vec::new();
        for key in self.kv.keys_with_prefix("trigger:").await? {
            if let Some(bytes) = self.kv.get(&key).await? {
                match serde_json::from_slice(&bytes) {
                    Ok(trigger) => triggers.push(trigger),
                    Err(error) => tracing::warn!(key, %error, "discarding malformed stored trigger"),
                }
            }
        }
        Ok(triggers)
    }
}
