//! Request-scoped span correlation.
//!
//! Every injection moving through the queue/executor carries a
//! [`RequestContext`] so logs from security checks, context assembly,
//! middleware, and provider streaming can be correlated by session name,
//! injection id, and (once resolved) provider id.

use tracing::Span;

/// Correlation context for one injection's trip through the executor.
#[derive(Debug, Clone)]
pub struct RequestContext {
    component: String,
    operation: Option<String>,
    session: Option<String>,
    injection_id: Option<String>,
    provider_id: Option<String>,
}

impl RequestContext {
    /// Start a context for the given component name (e.g. `"executor"`,
    /// `"queue"`, `"gateway"`).
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            operation: None,
            session: None,
            injection_id: None,
            provider_id: None,
        }
    }

    /// Attach the operation name (e.g. `"inject"`, `"cancel_active"`).
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Attach the session name.
    #[must_use]
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Attach the injection id.
    #[must_use]
    pub fn with_injection_id(mut self, injection_id: impl Into<String>) -> Self {
        self.injection_id = Some(injection_id.into());
        self
    }

    /// Attach the resolved provider id.
    #[must_use]
    pub fn with_provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Build a `tracing::Span` carrying every attached field.
    #[must_use]
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "request",
            component = %self.component,
            operation = self.operation.as_deref().unwrap_or(""),
            session = self.session.as_deref().unwrap_or(""),
            injection_id = self.injection_id.as_deref().unwrap_or(""),
            provider_id = self.provider_id.as_deref().unwrap_or(""),
        )
    }

    /// Enter the span for the lifetime of the returned guard.
    #[must_use]
    pub fn enter(&self) -> RequestGuard {
        RequestGuard {
            _span: self.span(),
        }
    }
}

/// RAII guard keeping a [`RequestContext`]'s span entered.
#[must_use = "dropping this immediately exits the span"]
pub struct RequestGuard {
    _span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_context_builder() {
        let ctx = RequestContext::new("executor")
            .with_operation("inject")
            .with_session("alice")
            .with_injection_id("inj-1");

        assert_eq!(ctx.component, "executor");
        assert_eq!(ctx.operation.as_deref(), Some("inject"));
        assert_eq!(ctx.session.as_deref(), Some("alice"));
    }

    #[test]
    fn test_request_context_enter_does_not_panic() {
        let ctx = RequestContext::new("queue");
        let _guard = ctx.enter();
        tracing::info!("inside span");
    }
}
