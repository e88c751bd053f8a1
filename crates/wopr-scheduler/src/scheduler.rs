//! The tick loop (§4.10): wakes once a minute, fires any cron trigger whose
//! schedule landed in the tick window and any one-shot trigger whose time
//! has passed.

use std::sync::Arc;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use wopr_audit::{AuditAction, AuditEntry, AuditLog, AuditOutcome, AuthorizationProof};
use wopr_core::{InjectionSource, InjectionSourceKind};
use wopr_queue::{InjectPayload, QueueManager};

use crate::error::SchedulerResult;
use crate::store::TriggerStore;
use crate::types::{parse_cron_expression, Trigger};

/// How often the scheduler wakes to check for due triggers (§4.10: cron
/// granularity is one minute).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

fn scheduler_source(trigger_name: &str) -> InjectionSource {
    InjectionSource {
        kind: InjectionSourceKind::Scheduler,
        origin: trigger_name.to_string(),
        granted_capabilities: Vec::new(),
        trust_override: None,
    }
}

/// Drives cron and one-shot triggers against a [`QueueManager`].
///
/// Restart semantics are at-most-once: the watermark a tick compares
/// against starts at construction time, so triggers that would have
/// fired while the process was not running are never replayed.
pub struct Scheduler {
    store: Arc<TriggerStore>,
    queue: Arc<QueueManager>,
    audit: Arc<AuditLog>,
    last_tick: RwLock<DateTime<Utc>>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Construct a scheduler whose watermark starts at the current instant.
    #[must_use]
    pub fn new(store: Arc<TriggerStore>, queue: Arc<QueueManager>, audit: Arc<AuditLog>) -> Self {
        Self { store, queue, audit, last_tick: RwLock::new(Utc::now()) }
    }

    /// Register a new (or replace an existing) trigger.
    pub async fn add_trigger(&self, trigger: Trigger) -> SchedulerResult<()> {
        if let Trigger::Cron(cron) = &trigger {
            parse_cron_expression(&cron.expression)?;
        }
        self.store.save(&trigger).await
    }

    /// Remove a trigger by name.
    pub async fn remove_trigger(&self, name: &str) -> SchedulerResult<()> {
        self.store.delete_existing(name).await
    }

    /// List every persisted trigger.
    pub async fn list_triggers(&self) -> SchedulerResult<Vec<Trigger>> {
        self.store.list().await
    }

    /// Run one tick against `now`: fire every due trigger, remove one-shots
    /// and `once`-marked cron triggers that fired, and return the names of
    /// everything that fired, for tests and logging.
    pub async fn tick(&self, now: DateTime<Utc>) -> SchedulerResult<Vec<String>> {
        let since = {
            let mut last_tick = self.last_tick.write().expect("scheduler watermark lock poisoned");
            let since = *last_tick;
            *last_tick = now;
            since
        };

        let mut fired = Vec::new();
        for trigger in self.store.list().await? {
            let due = match &trigger {
                Trigger::OneShot(one_shot) => one_shot.fire_at_ms <= now.timestamp_millis(),
                Trigger::Cron(cron) => {
                    let schedule = parse_cron_expression(&cron.expression)?;
                    schedule.after(&since).take_while(|fire_at| *fire_at <= now).count() > 0
                }
            };

            if !due {
                continue;
            }

            self.fire(&trigger).await;
            fired.push(trigger.name().to_string());

            let remove_after_fire = match &trigger {
                Trigger::OneShot(_) => true,
                Trigger::Cron(cron) => cron.once,
            };
            if remove_after_fire {
                self.store.delete(trigger.name()).await?;
            }
        }

        Ok(fired)
    }

    async fn fire(&self, trigger: &Trigger) {
        let source = scheduler_source(trigger.name());
        let mut payload = InjectPayload::new(trigger.message().clone(), "scheduler").with_source(source);
        if let Some(channel) = trigger.channel() {
            payload = payload.with_channel(channel);
        }

        let entry = AuditEntry::new(
            Some(trigger.session()),
            AuditAction::SchedulerTriggerFired { trigger_id: trigger.name().to_string() },
            AuthorizationProof::System { reason: "scheduler tick".to_string() },
            AuditOutcome::success(),
        );
        if let Err(error) = self.audit.record(&entry) {
            tracing::warn!(%error, "failed to record scheduler audit entry");
        }

        let queue = Arc::clone(&self.queue);
        let session = trigger.session().to_string();
        let trigger_name = trigger.name().to_string();
        tokio::spawn(async move {
            if let Err(error) = queue.inject(&session, payload).await {
                tracing::warn!(trigger = %trigger_name, %session, %error, "scheduled injection failed");
            }
        });
    }

    /// Spawn the minute-tick loop as a background task.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(error) = self.tick(Utc::now()).await {
                    tracing::warn!(%error, "scheduler tick failed");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CronTrigger, OneShotTrigger};
    use std::sync::Arc;
    use wopr_events::EventBus;
    use wopr_queue::{Executor, ExecutorOutcome};
    use wopr_storage::MemoryKvStore;

    struct EchoExecutor;

    #[async_trait::async_trait]
    impl Executor for EchoExecutor {
        async fn execute(
            &self,
            _session: &str,
            payload: InjectPayload,
            _abort: tokio_util::sync::CancellationToken,
        ) -> ExecutorOutcome {
            Ok(wopr_queue::InjectResult::new(payload.message.to_string(), None))
        }
    }

    fn scheduler() -> Scheduler {
        let queue = Arc::new(QueueManager::new(Arc::new(EventBus::new())));
        queue.set_executor(Arc::new(EchoExecutor)).unwrap();
        let store = Arc::new(TriggerStore::new(Arc::new(MemoryKvStore::new())));
        let dir = tempfile::tempdir().unwrap();
        Scheduler::new(store, queue, Arc::new(AuditLog::new(dir.path().join("audit.jsonl"))))
    }

    #[tokio::test]
    async fn test_one_shot_fires_once_past_its_time() {
        let scheduler = scheduler();
        let now = Utc::now();
        scheduler
            .add_trigger(Trigger::OneShot(OneShotTrigger {
                name: "reminder".to_string(),
                fire_at_ms: now.timestamp_millis() - 1000,
                session: "alice".to_string(),
                message: serde_json::json!("wake up"),
                channel: None,
            }))
            .await
            .unwrap();

        let fired = scheduler.tick(now).await.unwrap();
        assert_eq!(fired, vec!["reminder".to_string()]);
        assert!(scheduler.store.get("reminder").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_one_shot_not_yet_due_does_not_fire() {
        let scheduler = scheduler();
        let now = Utc::now();
        scheduler
            .add_trigger(Trigger::OneShot(OneShotTrigger {
                name: "later".to_string(),
                fire_at_ms: now.timestamp_millis() + 60_000,
                session: "alice".to_string(),
                message: serde_json::json!("too soon"),
                channel: None,
            }))
            .await
            .unwrap();

        let fired = scheduler.tick(now).await.unwrap();
        assert!(fired.is_empty());
        assert!(scheduler.store.get("later").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cron_once_trigger_removed_after_first_fire() {
        let scheduler = scheduler();
        scheduler
            .add_trigger(Trigger::Cron(CronTrigger {
                name: "daily".to_string(),
                expression: "* * * * *".to_string(),
                once: true,
                session: "alice".to_string(),
                message: serde_json::json!("daily check-in"),
                channel: None,
            }))
            .await
            .unwrap();

        let now = Utc::now();
        let fired = scheduler.tick(now).await.unwrap();
        assert_eq!(fired, vec!["daily".to_string()]);
        assert!(scheduler.store.get("daily").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_recurring_cron_trigger_survives_fire() {
        let scheduler = scheduler();
        scheduler
            .add_trigger(Trigger::Cron(CronTrigger {
                name: "minutely".to_string(),
                expression: "* * * * *".to_string(),
                once: false,
                session: "alice".to_string(),
                message: serde_json::json!("tick"),
                channel: None,
            }))
            .await
            .unwrap();

        let now = Utc::now();
        let fired = scheduler.tick(now).await.unwrap();
        assert_eq!(fired, vec!["minutely".to_string()]);
        assert!(scheduler.store.get("minutely").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_trigger_rejects_invalid_cron_expression() {
        let scheduler = scheduler();
        let result = scheduler
            .add_trigger(Trigger::Cron(CronTrigger {
                name: "broken".to_string(),
                expression: "not a cron".to_string(),
                once: false,
                session: "alice".to_string(),
                message: serde_json::json!("x"),
                channel: None,
            }))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_trigger_errors_when_absent() {
        let scheduler = scheduler();
        assert!(scheduler.remove_trigger("nope").await.is_err());
    }
}
