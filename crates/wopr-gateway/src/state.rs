//! Shared application state passed to every HTTP and WebSocket handler.

use std::sync::Arc;

use wopr_audit::AuditLog;
use wopr_config::Config;
use wopr_events::EventBus;
use wopr_hooks::{ContextRegistry, MiddlewareChain};
use wopr_llm::ProviderRegistry;
use wopr_queue::QueueManager;
use wopr_scheduler::Scheduler;
use wopr_security::PolicyEngine;
use wopr_sessions::{ConversationLog, SessionStore};

use crate::capabilities::RateLimiter;
use crate::ws::{WsAuth, WsHub};

/// Every long-lived, daemon-root-owned collaborator a route handler may
/// need. Constructed once in `wopr-daemon`'s `main` and cloned per
/// request (every field is an `Arc`, so cloning is cheap).
#[derive(Clone)]
pub struct AppState {
    /// Effective runtime configuration (HTTP, gateway, executor, enforcement).
    pub config: Arc<Config>,

    // ── Sessions ──────────────────────────────────────────────────────
    /// Session metadata (context, provider selection, conversation id).
    pub sessions: Arc<SessionStore>,
    /// Append-only per-session conversation history.
    pub log: Arc<ConversationLog>,

    // ── Injection pipeline ───────────────────────────────────────────
    /// The FIFO queue manager injections are submitted through.
    pub queue: Arc<QueueManager>,
    /// Security policy engine (capability/trust checks).
    pub security: Arc<PolicyEngine>,
    /// Registered LLM providers and the fallback resolver.
    pub providers: Arc<ProviderRegistry>,
    /// Incoming/outgoing middleware chain.
    pub middleware: Arc<MiddlewareChain>,
    /// Context assembly providers.
    pub context: Arc<ContextRegistry>,

    // ── Scheduling ────────────────────────────────────────────────────
    /// Cron and one-shot trigger scheduler.
    pub scheduler: Arc<Scheduler>,

    // ── Events / WebSocket fan-out ───────────────────────────────────
    /// The event bus every subsystem publishes to.
    pub events: Arc<EventBus>,
    /// Live WebSocket client registry (§4.9).
    pub ws: Arc<WsHub>,
    /// Verifies the ticket a `/ws` client presents before subscribing.
    pub ws_auth: Arc<dyn WsAuth>,

    // ── Audit ─────────────────────────────────────────────────────────
    /// Append-only security/injection audit log.
    pub audit: Arc<AuditLog>,

    // ── Rate limiting ─────────────────────────────────────────────────
    /// Per-session capability activate/deactivate rate limiter (10/min).
    pub capability_limiter: Arc<RateLimiter>,
}
