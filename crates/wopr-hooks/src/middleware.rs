//! Middleware chain (§4.5).
//!
//! A registry of [`Middleware`]s, run by priority (lowest first) over a
//! message as it enters or leaves the injection executor. A middleware
//! may mutate the payload or set `prevented = true` to short-circuit
//! the entire injection. A middleware that errors is treated as "did
//! nothing" and logged; it never aborts the chain.

use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::warn;

use crate::error::HookError;

/// Identifies the session and channel a middleware call is running for.
#[derive(Debug, Clone)]
pub struct MiddlewareContext {
    /// Session the message belongs to.
    pub session: String,
    /// Who triggered the injection.
    pub from: String,
    /// The channel the message arrived on or will be sent on.
    pub channel: String,
}

impl MiddlewareContext {
    /// Construct a new `MiddlewareContext`.
    #[must_use]
    pub fn new(
        session: impl Into<String>,
        from: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            session: session.into(),
            from: from.into(),
            channel: channel.into(),
        }
    }
}

/// Outcome of a single middleware's `on_incoming`/`on_outgoing` call.
#[derive(Debug, Clone)]
pub struct HookOutcome {
    /// Whether this middleware wants to short-circuit the injection.
    pub prevented: bool,
    /// The (possibly modified) payload.
    pub payload: String,
}

impl HookOutcome {
    /// Pass `payload` through unmodified.
    #[must_use]
    pub fn unchanged(payload: impl Into<String>) -> Self {
        Self {
            prevented: false,
            payload: payload.into(),
        }
    }

    /// Pass a modified payload through.
    #[must_use]
    pub fn modified(payload: impl Into<String>) -> Self {
        Self {
            prevented: false,
            payload: payload.into(),
        }
    }

    /// Short-circuit the injection.
    #[must_use]
    pub fn prevent() -> Self {
        Self {
            prevented: true,
            payload: String::new(),
        }
    }
}

/// A named participant in the incoming/outgoing middleware chain.
///
/// Both hooks default to passing the payload through unchanged; a
/// middleware implements only the direction it cares about.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Stable name identifying this middleware in logs.
    fn name(&self) -> &str;

    /// Called with the message as it enters the executor.
    async fn on_incoming(
        &self,
        _ctx: &MiddlewareContext,
        message: String,
    ) -> Result<HookOutcome, HookError> {
        Ok(HookOutcome::unchanged(message))
    }

    /// Called with the accumulated response as it leaves the executor.
    async fn on_outgoing(
        &self,
        _ctx: &MiddlewareContext,
        response: String,
    ) -> Result<HookOutcome, HookError> {
        Ok(HookOutcome::unchanged(response))
    }
}

struct MiddlewareEntry {
    priority: i32,
    enabled: bool,
    middleware: Arc<dyn Middleware>,
}

/// One middleware's registered name, priority, and enabled state, for
/// the HTTP `/api/middleware` listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MiddlewareInfo {
    /// Registered name.
    pub name: String,
    /// Run order (lower runs earlier).
    pub priority: i32,
    /// Whether this middleware currently participates in the chain.
    pub enabled: bool,
}

/// Result of running the full incoming or outgoing chain.
#[derive(Debug, Clone)]
pub struct ChainResult {
    /// Whether some middleware short-circuited the chain.
    pub prevented: bool,
    /// The final payload (empty if prevented).
    pub payload: String,
    /// Name of the middleware that prevented the chain, if any.
    pub prevented_by: Option<String>,
}

/// Registry of incoming/outgoing middleware.
#[derive(Default)]
pub struct MiddlewareChain {
    entries: RwLock<Vec<(String, MiddlewareEntry)>>,
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or_default();
        f.debug_struct("MiddlewareChain").field("count", &count).finish()
    }
}

impl MiddlewareChain {
    /// Construct an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a middleware, replacing any prior registration with the
    /// same name.
    pub fn register(&self, middleware: Arc<dyn Middleware>, priority: i32) {
        let name = middleware.name().to_string();
        let mut entries = self.entries.write().expect("middleware chain lock poisoned");
        entries.retain(|(existing, _)| existing != &name);
        entries.push((
            name,
            MiddlewareEntry {
                priority,
                enabled: true,
                middleware,
            },
        ));
    }

    /// Remove a middleware by name.
    pub fn unregister(&self, name: &str) {
        let mut entries = self.entries.write().expect("middleware chain lock poisoned");
        entries.retain(|(existing, _)| existing != name);
    }

    /// Enable or disable a middleware by name. Returns `false` if no
    /// such middleware is registered.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut entries = self.entries.write().expect("middleware chain lock poisoned");
        match entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, entry)) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Change a middleware's priority. Returns `false` if no such
    /// middleware is registered.
    pub fn set_priority(&self, name: &str, priority: i32) -> bool {
        let mut entries = self.entries.write().expect("middleware chain lock poisoned");
        match entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, entry)) => {
                entry.priority = priority;
                true
            }
            None => false,
        }
    }

    /// Every registered middleware's name, priority, and enabled state,
    /// sorted by priority.
    #[must_use]
    pub fn list(&self) -> Vec<MiddlewareInfo> {
        let entries = self.entries.read().expect("middleware chain lock poisoned");
        let mut info: Vec<MiddlewareInfo> = entries
            .iter()
            .map(|(name, entry)| MiddlewareInfo {
                name: name.clone(),
                priority: entry.priority,
                enabled: entry.enabled,
            })
            .collect();
        info.sort_by_key(|entry| entry.priority);
        info
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn Middleware>)> {
        let entries = self.entries.read().expect("middleware chain lock poisoned");
        let mut snapshot: Vec<(String, i32, Arc<dyn Middleware>)> = entries
            .iter()
            .filter(|(_, entry)| entry.enabled)
            .map(|(name, entry)| (name.clone(), entry.priority, Arc::clone(&entry.middleware)))
            .collect();
        snapshot.sort_by_key(|(_, priority, _)| *priority);
        snapshot.into_iter().map(|(name, _, mw)| (name, mw)).collect()
    }

    /// Run the incoming chain over `message`.
    pub async fn run_incoming(&self, ctx: &MiddlewareContext, message: String) -> ChainResult {
        let mut payload = message;
        for (name, middleware) in self.snapshot() {
            match middleware.on_incoming(ctx, payload.clone()).await {
                Ok(outcome) if outcome.prevented => {
                    return ChainResult {
                        prevented: true,
                        payload: String::new(),
                        prevented_by: Some(name),
                    };
                }
                Ok(outcome) => payload = outcome.payload,
                Err(err) => {
                    warn!(middleware = %name, error = %err, "incoming middleware failed, treated as no-op");
                }
            }
        }
        ChainResult {
            prevented: false,
            payload,
            prevented_by: None,
        }
    }

    /// Run the outgoing chain over `response`.
    pub async fn run_outgoing(&self, ctx: &MiddlewareContext, response: String) -> ChainResult {
        let mut payload = response;
        for (name, middleware) in self.snapshot() {
            match middleware.on_outgoing(ctx, payload.clone()).await {
                Ok(outcome) if outcome.prevented => {
                    return ChainResult {
                        prevented: true,
                        payload: String::new(),
                        prevented_by: Some(name),
                    };
                }
                Ok(outcome) => payload = outcome.payload,
                Err(err) => {
                    warn!(middleware = %name, error = %err, "outgoing middleware failed, treated as no-op");
                }
            }
        }
        ChainResult {
            prevented: false,
            payload,
            prevented_by: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upcaser;

    #[async_trait]
    impl Middleware for Upcaser {
        fn name(&self) -> &str {
            "upcaser"
        }

        async fn on_incoming(
            &self,
            _ctx: &MiddlewareContext,
            message: String,
        ) -> Result<HookOutcome, HookError> {
            Ok(HookOutcome::modified(message.to_uppercase()))
        }
    }

    struct Blocker;

    #[async_trait]
    impl Middleware for Blocker {
        fn name(&self) -> &str {
            "blocker"
        }

        async fn on_incoming(
            &self,
            _ctx: &MiddlewareContext,
            _message: String,
        ) -> Result<HookOutcome, HookError> {
            Ok(HookOutcome::prevent())
        }
    }

    struct Exploding;

    #[async_trait]
    impl Middleware for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        async fn on_incoming(
            &self,
            _ctx: &MiddlewareContext,
            _message: String,
        ) -> Result<HookOutcome, HookError> {
            Err(HookError::Middleware("boom".to_string()))
        }
    }

    fn ctx() -> MiddlewareContext {
        MiddlewareContext::new("alice", "cli", "cli")
    }

    #[tokio::test]
    async fn test_incoming_mutates_payload() {
        let chain = MiddlewareChain::new();
        chain.register(Arc::new(Upcaser), 10);

        let result = chain.run_incoming(&ctx(), "hello".to_string()).await;
        assert!(!result.prevented);
        assert_eq!(result.payload, "HELLO");
    }

    #[tokio::test]
    async fn test_incoming_short_circuits_on_prevent() {
        let chain = MiddlewareChain::new();
        chain.register(Arc::new(Upcaser), 10);
        chain.register(Arc::new(Blocker), 20);

        let result = chain.run_incoming(&ctx(), "hello".to_string()).await;
        assert!(result.prevented);
        assert_eq!(result.prevented_by, Some("blocker".to_string()));
        assert_eq!(result.payload, "");
    }

    #[tokio::test]
    async fn test_incoming_failed_middleware_is_noop() {
        let chain = MiddlewareChain::new();
        chain.register(Arc::new(Exploding), 10);
        chain.register(Arc::new(Upcaser), 20);

        let result = chain.run_incoming(&ctx(), "hello".to_string()).await;
        assert!(!result.prevented);
        assert_eq!(result.payload, "HELLO");
    }

    #[tokio::test]
    async fn test_disabled_middleware_does_not_run() {
        let chain = MiddlewareChain::new();
        chain.register(Arc::new(Upcaser), 10);
        chain.set_enabled("upcaser", false);

        let result = chain.run_incoming(&ctx(), "hello".to_string()).await;
        assert_eq!(result.payload, "hello");
    }

    #[test]
    fn test_list_sorted_by_priority_reflects_enabled_state() {
        let chain = MiddlewareChain::new();
        chain.register(Arc::new(Blocker), 20);
        chain.register(Arc::new(Upcaser), 10);
        chain.set_enabled("blocker", false);

        let info = chain.list();
        let names: Vec<_> = info.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["upcaser", "blocker"]);
        assert!(!info.iter().find(|entry| entry.name == "blocker").unwrap().enabled);
    }

    #[tokio::test]
    async fn test_outgoing_default_passthrough() {
        let chain = MiddlewareChain::new();
        chain.register(Arc::new(Upcaser), 10);

        let result = chain.run_outgoing(&ctx(), "response".to_string()).await;
        assert!(!result.prevented);
        assert_eq!(result.payload, "response");
    }
}
