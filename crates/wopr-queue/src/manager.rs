//! The FIFO queue manager (§4.3): one cooperative, single-threaded lane per
//! session, parallel across sessions.
//!
//! Each session's lane is a [`tokio::sync::Mutex`]; tokio grants a mutex's
//! waiters access in the order they started waiting, so serializing one
//! entry's execution behind it gives the enqueue-order completion guarantee
//! for free, without hand-rolling a promise-tail chain.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use wopr_events::{EventBus, EventMetadata, WoprEvent};

use crate::error::{QueueError, QueueResult};
use crate::executor::{Executor, ExecutorError};
use crate::types::{InjectPayload, InjectResult, QueueStats};

struct ActiveEntry {
    abort: CancellationToken,
}

/// One session's serialization lane: a mutex to enforce single-threaded
/// cooperative execution, plus bookkeeping for `getStats`/`cancelActive`.
struct SessionLane {
    lane: AsyncMutex<()>,
    active: AsyncMutex<Option<ActiveEntry>>,
    queued: AtomicUsize,
}

impl SessionLane {
    fn new() -> Self {
        Self { lane: AsyncMutex::new(()), active: AsyncMutex::new(None), queued: AtomicUsize::new(0) }
    }
}

/// The per-session FIFO injection queue (§4.3).
pub struct QueueManager {
    executor: OnceLock<Arc<dyn Executor>>,
    sessions: AsyncMutex<HashMap<String, Arc<SessionLane>>>,
    events: Arc<EventBus>,
}

impl std::fmt::Debug for QueueManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueManager").finish_non_exhaustive()
    }
}

impl QueueManager {
    /// Construct an empty queue manager publishing lifecycle events to
    /// `events`.
    #[must_use]
    pub fn new(events: Arc<EventBus>) -> Self {
        Self { executor: OnceLock::new(), sessions: AsyncMutex::new(HashMap::new()), events }
    }

    /// Wire the executor (§4.6). Must be called exactly once, before the
    /// first [`QueueManager::inject`].
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ExecutorAlreadySet`] on a second call.
    pub fn set_executor(&self, executor: Arc<dyn Executor>) -> QueueResult<()> {
        self.executor.set(executor).map_err(|_| QueueError::ExecutorAlreadySet)
    }

    async fn lane_for(&self, session: &str) -> Arc<SessionLane> {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(sessions.entry(session.to_string()).or_insert_with(|| Arc::new(SessionLane::new())))
    }

    /// Enqueue one injection and await its result (§4.3).
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::ExecutorNotSet`] if no executor has been wired,
    /// [`QueueError::Cancelled`] if `cancel_active` fired while this entry
    /// was executing, or [`QueueError::Failed`] if the executor errored.
    pub async fn inject(&self, session: &str, payload: InjectPayload) -> QueueResult<InjectResult> {
        let executor = self.executor.get().cloned().ok_or(QueueError::ExecutorNotSet)?;
        let lane = self.lane_for(session).await;
        let injection_id = Uuid::new_v4().to_string();

        lane.queued.fetch_add(1, Ordering::SeqCst);
        self.events.publish(WoprEvent::QueueEnqueue {
            metadata: EventMetadata::new("queue-manager"),
            session: session.to_string(),
            injection_id: injection_id.clone(),
        });

        let guard = lane.lane.lock().await;
        lane.queued.fetch_sub(1, Ordering::SeqCst);

        let abort = CancellationToken::new();
        *lane.active.lock().await = Some(ActiveEntry { abort: abort.clone() });

        self.events.publish(WoprEvent::QueueStart {
            metadata: EventMetadata::new("queue-manager"),
            session: session.to_string(),
            injection_id: injection_id.clone(),
        });

        let outcome = executor.execute(session, payload, abort).await;

        *lane.active.lock().await = None;
        drop(guard);

        match outcome {
            Ok(result) => {
                self.events.publish(WoprEvent::QueueComplete {
                    metadata: EventMetadata::new("queue-manager"),
                    session: session.to_string(),
                    injection_id,
                });
                Ok(result)
            },
            Err(ExecutorError::Cancelled) => {
                self.events.publish(WoprEvent::QueueCancel {
                    metadata: EventMetadata::new("queue-manager"),
                    session: session.to_string(),
                    injection_id,
                });
                Err(QueueError::Cancelled)
            },
            Err(ExecutorError::Failed(message)) => {
                self.events.publish(WoprEvent::QueueError {
                    metadata: EventMetadata::new("queue-manager"),
                    session: session.to_string(),
                    injection_id,
                    message: message.clone(),
                });
                Err(QueueError::Failed(message))
            },
        }
    }

    /// Signal the active entry's abort handle, if any (§4.3).
    ///
    /// Queued-but-not-yet-active entries are unaffected; only the entry
    /// currently holding the lane is cancelled.
    pub async fn cancel_active(&self, session: &str) -> bool {
        let lane = { self.sessions.lock().await.get(session).cloned() };
        let Some(lane) = lane else { return false };
        let active = lane.active.lock().await;
        if let Some(entry) = active.as_ref() {
            entry.abort.cancel();
            true
        } else {
            false
        }
    }

    /// True iff any entry is active or queued for `session`.
    pub async fn has_pending(&self, session: &str) -> bool {
        let stats = self.stats_for(session).await;
        stats.active > 0 || stats.queued > 0
    }

    async fn stats_for(&self, session: &str) -> QueueStats {
        let lane = { self.sessions.lock().await.get(session).cloned() };
        let Some(lane) = lane else { return QueueStats::default() };
        let active = usize::from(lane.active.lock().await.is_some());
        let queued = lane.queued.load(Ordering::SeqCst);
        QueueStats { active, queued }
    }

    /// Stats for one session, or aggregated across every session the
    /// manager has seen when `session` is `None`.
    pub async fn get_stats(&self, session: Option<&str>) -> QueueStats {
        if let Some(session) = session {
            return self.stats_for(session).await;
        }
        let names: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        let mut total = QueueStats::default();
        for name in names {
            let stats = self.stats_for(&name).await;
            total.active = total.active.saturating_add(stats.active);
            total.queued = total.queued.saturating_add(stats.queued);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct EchoExecutor;

    #[async_trait::async_trait]
    impl Executor for EchoExecutor {
        async fn execute(
            &self,
            session: &str,
            payload: InjectPayload,
            _abort: CancellationToken,
        ) -> crate::executor::ExecutorOutcome {
            Ok(InjectResult::new(format!("echo:{session}:{}", payload.from), None))
        }
    }

    struct SlowExecutor {
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl Executor for SlowExecutor {
        async fn execute(
            &self,
            _session: &str,
            payload: InjectPayload,
            abort: CancellationToken,
        ) -> crate::executor::ExecutorOutcome {
            tokio::select! {
                () = tokio::time::sleep(self.delay) => Ok(InjectResult::new(payload.from, None)),
                () = abort.cancelled() => Err(ExecutorError::Cancelled),
            }
        }
    }

    fn bus() -> Arc<EventBus> {
        Arc::new(EventBus::new())
    }

    #[tokio::test]
    async fn test_inject_before_set_executor_errors() {
        let manager = QueueManager::new(bus());
        let result = manager.inject("alice", InjectPayload::new(serde_json::Value::Null, "cli")).await;
        assert!(matches!(result, Err(QueueError::ExecutorNotSet)));
    }

    #[tokio::test]
    async fn test_set_executor_twice_errors() {
        let manager = QueueManager::new(bus());
        manager.set_executor(Arc::new(EchoExecutor)).unwrap();
        assert!(matches!(manager.set_executor(Arc::new(EchoExecutor)), Err(QueueError::ExecutorAlreadySet)));
    }

    #[tokio::test]
    async fn test_inject_returns_executor_result() {
        let manager = QueueManager::new(bus());
        manager.set_executor(Arc::new(EchoExecutor)).unwrap();
        let result =
            manager.inject("alice", InjectPayload::new(serde_json::Value::Null, "cli")).await.unwrap();
        assert_eq!(result.response, "echo:alice:cli");
    }

    #[tokio::test]
    async fn test_fifo_order_within_session() {
        let manager = Arc::new(QueueManager::new(bus()));
        manager.set_executor(Arc::new(SlowExecutor { delay: Duration::from_millis(30) })).unwrap();

        let order = Arc::new(AsyncMutex::new(Vec::new()));
        let mut handles = Vec::new();
        for i in 0..3 {
            let manager = Arc::clone(&manager);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let result = manager
                    .inject("alice", InjectPayload::new(serde_json::Value::Null, i.to_string()))
                    .await
                    .unwrap();
                order.lock().await.push(result.response);
            }));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*order.lock().await, vec!["0", "1", "2"]);
    }

    #[tokio::test]
    async fn test_cancel_active_signals_abort_for_the_running_entry() {
        let manager = Arc::new(QueueManager::new(bus()));
        manager.set_executor(Arc::new(SlowExecutor { delay: Duration::from_millis(200) })).unwrap();

        let runner = Arc::clone(&manager);
        let handle = tokio::spawn(async move {
            runner.inject("alice", InjectPayload::new(serde_json::Value::Null, "cli")).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(manager.cancel_active("alice").await);
        assert!(matches!(handle.await.unwrap(), Err(QueueError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_active_false_when_nothing_active() {
        let manager = QueueManager::new(bus());
        assert!(!manager.cancel_active("alice").await);
    }

    #[tokio::test]
    async fn test_get_stats_reports_active_entry() {
        let manager = Arc::new(QueueManager::new(bus()));
        manager.set_executor(Arc::new(SlowExecutor { delay: Duration::from_millis(100) })).unwrap();

        let runner = Arc::clone(&manager);
        let handle = tokio::spawn(async move {
            let _ = runner.inject("alice", InjectPayload::new(serde_json::Value::Null, "cli")).await;
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let stats = manager.get_stats(Some("alice")).await;
        assert_eq!(stats.active, 1);
        manager.cancel_active("alice").await;
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_has_pending_false_for_unknown_session() {
        let manager = QueueManager::new(bus());
        assert!(!manager.has_pending("nobody").await);
    }
}
