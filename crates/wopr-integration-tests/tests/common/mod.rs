//! Shared test harness wiring the queue, executor, and their
//! collaborators the same way `woprd`'s `main.rs` does, minus the HTTP
//! layer — enough surface for the end-to-end scenarios in spec.md §8.

use std::sync::Arc;

use tempfile::TempDir;

use wopr_audit::AuditLog;
use wopr_events::EventBus;
use wopr_executor::InjectionExecutor;
use wopr_hooks::{ContextRegistry, MiddlewareChain};
use wopr_llm::ProviderRegistry;
use wopr_queue::QueueManager;
use wopr_security::{PolicyEngine, SecurityConfig};
use wopr_sessions::{ConversationLog, SessionStore};
use wopr_storage::MemoryKvStore;

/// A fully wired injection pipeline over in-memory stores.
#[allow(dead_code)]
pub struct Harness {
    pub queue: Arc<QueueManager>,
    pub sessions: Arc<SessionStore>,
    pub log: Arc<ConversationLog>,
    pub events: Arc<EventBus>,
    pub providers: Arc<ProviderRegistry>,
    pub security: Arc<PolicyEngine>,
    pub middleware: Arc<MiddlewareChain>,
    pub context: Arc<ContextRegistry>,
    pub audit: Arc<AuditLog>,
    _dir: TempDir,
}

#[allow(dead_code)]
impl Harness {
    /// A harness with a permissive policy, so every scenario test starts
    /// unauthenticated-friendly and opts into stricter policy explicitly.
    pub fn new() -> Self {
        Self::with_security(SecurityConfig::permissive())
    }

    /// A harness built around an explicit security policy, for scenarios
    /// that exercise enforcement.
    pub fn with_security(security_config: SecurityConfig) -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");

        let events = Arc::new(EventBus::new());
        let sessions = Arc::new(SessionStore::new(Arc::new(MemoryKvStore::new())));
        let log = Arc::new(ConversationLog::new(dir.path()));
        let security = Arc::new(PolicyEngine::new(security_config));
        let context = Arc::new(ContextRegistry::new());
        let middleware = Arc::new(MiddlewareChain::new());
        let audit = Arc::new(AuditLog::new(dir.path().join("audit.jsonl")));
        let providers = Arc::new(ProviderRegistry::new());

        let queue = Arc::new(QueueManager::new(Arc::clone(&events)));
        let executor = Arc::new(InjectionExecutor::new(
            Arc::clone(&security),
            Arc::clone(&context),
            Arc::clone(&middleware),
            Arc::clone(&sessions),
            Arc::clone(&log),
            Arc::clone(&providers),
            Arc::clone(&events),
            Arc::clone(&audit),
            &wopr_config::ExecutorConfig::default(),
        ));
        queue.set_executor(executor).expect("set_executor is only called once per harness");

        Self { queue, sessions, log, events, providers, security, middleware, context, audit, _dir: dir }
    }
}
