//! The injection executor (§4.6): the pipeline driven by one
//! [`wopr_queue::QueueManager::inject`] call, start to finish.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use wopr_audit::{AuditAction, AuditEntry, AuditLog, AuditOutcome, AuthorizationProof};
use wopr_config::EnforcementLevel;
use wopr_core::{InjectionSource, Timestamp};
use wopr_events::{EventBus, EventMetadata, WoprEvent};
use wopr_hooks::{AssembleOptions, ContextRegistry, MessageInfo, MiddlewareChain, MiddlewareContext};
use wopr_llm::{Message, ProviderRegistry, ResolveConfig, StreamEvent};
use wopr_queue::{InjectPayload, InjectResult};
use wopr_security::PolicyEngine;
use wopr_sessions::{ConversationLog, EntryKind, ProviderSelection, SessionStore};

use crate::error::ExecutorError;
use crate::types::{annotate_images, compose_prompt, normalize_payload, SecurityContext};

/// How many recent log entries to replay as conversation history when
/// building the messages sent to the provider.
const HISTORY_REPLAY_LIMIT: usize = 50;

/// Substring the stale-resume check looks for in a provider stream error
/// to recognize "no such conversation" (§4.6 step 11). No provider in
/// this codebase's surface reports a structured variant for this, so
/// the check is string-based, same as the teacher's pattern-matched
/// error classification elsewhere in the stack.
const STALE_CONVERSATION_SIGNATURE: &str = "no such conversation";

/// Guards one session's [`SecurityContext`] entry, removing it on drop so
/// teardown happens on every exit path from [`InjectionExecutor::run`],
/// including early returns and panics unwinding through it.
struct SecurityContextGuard<'a> {
    active: &'a RwLock<HashMap<String, Arc<SecurityContext>>>,
    session: String,
}

impl Drop for SecurityContextGuard<'_> {
    fn drop(&mut self) {
        self.active
            .write()
            .expect("executor active-context lock poisoned")
            .remove(&self.session);
    }
}

/// The injection executor (§4.6): wires security, context assembly,
/// middleware, the session store/log, provider resolution, and the
/// audit trail into the one pipeline [`wopr_queue::QueueManager`] drives.
pub struct InjectionExecutor {
    security: Arc<PolicyEngine>,
    context: Arc<ContextRegistry>,
    middleware: Arc<MiddlewareChain>,
    sessions: Arc<SessionStore>,
    log: Arc<ConversationLog>,
    providers: Arc<ProviderRegistry>,
    events: Arc<EventBus>,
    audit: Arc<AuditLog>,
    idle_timeout: Duration,
    active: RwLock<HashMap<String, Arc<SecurityContext>>>,
    last_trigger: RwLock<HashMap<String, Timestamp>>,
}

impl std::fmt::Debug for InjectionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectionExecutor").finish_non_exhaustive()
    }
}

#[allow(clippy::too_many_arguments)]
impl InjectionExecutor {
    /// Construct an executor from its collaborators, using
    /// `executor_config.idle_timeout_secs` for the streaming idle-timeout
    /// guard (§4.6 step 10).
    #[must_use]
    pub fn new(
        security: Arc<PolicyEngine>,
        context: Arc<ContextRegistry>,
        middleware: Arc<MiddlewareChain>,
        sessions: Arc<SessionStore>,
        log: Arc<ConversationLog>,
        providers: Arc<ProviderRegistry>,
        events: Arc<EventBus>,
        audit: Arc<AuditLog>,
        executor_config: &wopr_config::ExecutorConfig,
    ) -> Self {
        Self {
            security,
            context,
            middleware,
            sessions,
            log,
            providers,
            events,
            audit,
            idle_timeout: Duration::from_secs(executor_config.idle_timeout_secs),
            active: RwLock::new(HashMap::new()),
            last_trigger: RwLock::new(HashMap::new()),
        }
    }

    /// The security context currently in effect for `session`'s in-flight
    /// injection, if one is running.
    #[must_use]
    pub fn active_security_context(&self, session: &str) -> Option<Arc<SecurityContext>> {
        self.active.read().expect("executor active-context lock poisoned").get(session).cloned()
    }

    /// The last time a trigger fired for `session`, for time-windowed
    /// context providers to consult.
    #[must_use]
    pub fn last_trigger_at(&self, session: &str) -> Option<Timestamp> {
        self.last_trigger.read().expect("executor last-trigger lock poisoned").get(session).copied()
    }

    fn record_audit(
        &self,
        session: Option<&str>,
        action: AuditAction,
        authorization: AuthorizationProof,
        outcome: AuditOutcome,
    ) {
        let entry = AuditEntry::new(session, action, authorization, outcome);
        if let Err(error) = self.audit.record(&entry) {
            tracing::warn!(%error, "failed to record audit entry");
        }
    }

    /// Step 1: resolve the security context and enforce session access.
    fn check_security(&self, session: &str, source: &InjectionSource) -> Result<SecurityContext, ExecutorError> {
        let policy = self.security.resolve_policy(source, Some(session));
        let outcome = self.security.check_session_access(source, session);

        if !outcome.allowed {
            let reason = outcome.reason.clone().unwrap_or_else(|| "access denied".to_string());
            match self.security.effective_enforcement() {
                EnforcementLevel::Enforce => {
                    self.record_audit(
                        Some(session),
                        AuditAction::SecurityCheckDenied {
                            session: Some(session.to_string()),
                            check: "session_access".to_string(),
                            reason: reason.clone(),
                        },
                        AuthorizationProof::Denied { reason: reason.clone() },
                        AuditOutcome::failure(reason.clone()),
                    );
                    return Err(ExecutorError::SecurityDenied { session: session.to_string(), reason });
                }
                EnforcementLevel::Warn | EnforcementLevel::Off => {
                    self.record_audit(
                        Some(session),
                        AuditAction::SecurityCheckWarned {
                            session: Some(session.to_string()),
                            check: "session_access".to_string(),
                            reason: reason.clone(),
                        },
                        AuthorizationProof::Source { kind: source.kind, origin: source.origin.clone() },
                        AuditOutcome::success_with(reason),
                    );
                }
            }
        }

        Ok(SecurityContext { session: session.to_string(), source: source.clone(), policy })
    }

    /// Steps 9-11: resolve a provider, model, and stream the response.
    #[allow(clippy::too_many_lines)]
    async fn run_provider(
        &self,
        session: &str,
        prompt: &str,
        system: &str,
        abort: &CancellationToken,
    ) -> Result<(String, Option<String>), ExecutorError> {
        let selection = self.resolve_provider_selection(session).await?;
        let resolve_config = ResolveConfig { name: selection.name.clone(), fallback: selection.fallback.clone() };

        let history = self.replay_history(session).await?;
        let mut messages = history;
        messages.push(Message::user(prompt));

        let was_resuming = self.sessions.get_context(session).await.map_err(ExecutorError::Session)?.is_some()
            || self.sessions.get_sessions().await.map_err(ExecutorError::Session)?.contains_key(session);

        let mut retry_used = !was_resuming;
        let mut excluded: Vec<String> = Vec::new();
        let mut conversation_id = None;
        let mut response = String::new();

        loop {
            let resolved = match self.providers.resolve_provider_excluding(&resolve_config, &excluded) {
                Ok(resolved) => resolved,
                Err(_) => {
                    self.record_audit(
                        Some(session),
                        AuditAction::ProviderUnavailable { session: session.to_string(), requested: selection.name.clone() },
                        AuthorizationProof::NotRequired { reason: "provider resolution".to_string() },
                        AuditOutcome::failure("no provider available in chain"),
                    );
                    return Err(ExecutorError::NoProviderAvailable { session: session.to_string() });
                }
            };

            if resolved.name != selection.name {
                self.record_audit(
                    Some(session),
                    AuditAction::ProviderFallback {
                        session: session.to_string(),
                        from: selection.name.clone(),
                        to: resolved.name.clone(),
                    },
                    AuthorizationProof::NotRequired { reason: "provider resolution".to_string() },
                    AuditOutcome::success(),
                );
            }

            let model = selection.model.clone().unwrap_or_else(|| resolved.provider.model().to_string());
            self.record_audit(
                Some(session),
                AuditAction::ProviderResolved { session: session.to_string(), provider: resolved.name.clone(), model: Some(model) },
                AuthorizationProof::NotRequired { reason: "provider resolution".to_string() },
                AuditOutcome::success(),
            );

            let attempt = self
                .stream_once(session, &resolved.provider, &messages, system, abort, &mut response, &mut conversation_id)
                .await;

            match attempt {
                Ok(()) => break,
                Err(ExecutorError::ProviderStream { message, .. }) if !retry_used && is_stale_conversation(&message) => {
                    self.sessions.delete_session_id(session).await.map_err(ExecutorError::Session)?;
                    self.record_audit(
                        Some(session),
                        AuditAction::StaleResumeRetried { session: session.to_string() },
                        AuthorizationProof::NotRequired { reason: "stale conversation recovery".to_string() },
                        AuditOutcome::success(),
                    );
                    retry_used = true;
                    response.clear();
                    continue;
                }
                // A provider that looked available failed mid-stream: move to
                // the next name in the fallback chain without flipping the
                // registry's own `available` flag (§9 health-vs-fallback note).
                Err(ExecutorError::ProviderStream { .. }) => {
                    excluded.push(resolved.name.clone());
                    response.clear();
                    continue;
                }
                Err(other) => return Err(other),
            }
        }

        Ok((response, conversation_id))
    }

    async fn resolve_provider_selection(&self, session: &str) -> Result<ProviderSelection, ExecutorError> {
        if let Some(selection) = self.sessions.get_provider(session).await.map_err(ExecutorError::Session)? {
            return Ok(selection);
        }

        for name in self.providers.list_providers() {
            if self.providers.resolve_provider(&ResolveConfig::single(name.clone())).is_ok() {
                let selection = ProviderSelection::new(name);
                self.sessions.set_provider(session, &selection).await.map_err(ExecutorError::Session)?;
                return Ok(selection);
            }
        }

        self.record_audit(
            Some(session),
            AuditAction::ProviderUnavailable { session: session.to_string(), requested: "<none registered>".to_string() },
            AuthorizationProof::NotRequired { reason: "provider resolution".to_string() },
            AuditOutcome::failure("no registered provider is available"),
        );
        Err(ExecutorError::NoProviderAvailable { session: session.to_string() })
    }

    async fn replay_history(&self, session: &str) -> Result<Vec<Message>, ExecutorError> {
        let entries = self.log.read(session, Some(HISTORY_REPLAY_LIMIT)).map_err(ExecutorError::Session)?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| match entry.kind {
                EntryKind::Message => Some(Message::user(entry.content)),
                EntryKind::Response => Some(Message::assistant(entry.content)),
                EntryKind::Context | EntryKind::Tool | EntryKind::System => None,
            })
            .collect())
    }

    #[allow(clippy::too_many_arguments)]
    async fn stream_once(
        &self,
        session: &str,
        provider: &Arc<dyn wopr_llm::LlmProvider>,
        messages: &[Message],
        system: &str,
        abort: &CancellationToken,
        response: &mut String,
        conversation_id: &mut Option<String>,
    ) -> Result<(), ExecutorError> {
        let mut stream = provider.stream(messages, &[], system).await.map_err(|error| ExecutorError::ProviderStream {
            session: session.to_string(),
            message: error.to_string(),
        })?;

        let injection_id = Uuid::new_v4().to_string();

        loop {
            tokio::select! {
                () = abort.cancelled() => return Err(ExecutorError::Cancelled),
                next = tokio::time::timeout(self.idle_timeout, stream.next()) => {
                    let Ok(next) = next else {
                        return Err(ExecutorError::IdleTimeout { session: session.to_string() });
                    };
                    let Some(event) = next else { break };

                    match event {
                        Ok(StreamEvent::SystemInit { conversation_id: id }) => {
                            self.sessions.save_session_id(session, &id).await.map_err(ExecutorError::Session)?;
                            *conversation_id = Some(id);
                        }
                        Ok(StreamEvent::TextDelta(delta)) => {
                            response.push_str(&delta);
                            self.events.publish(WoprEvent::SessionResponseChunk {
                                metadata: EventMetadata::new("executor"),
                                session: session.to_string(),
                                injection_id: injection_id.clone(),
                                text: delta,
                            });
                        }
                        // TODO: forward as a `tool_use` stream message once the
                        // gateway's client-facing stream protocol exists.
                        Ok(StreamEvent::ToolCallStart { .. } | StreamEvent::ToolCallDelta { .. } | StreamEvent::ToolCallEnd { .. }) => {}
                        Ok(StreamEvent::ReasoningDelta(_) | StreamEvent::Usage { .. }) => {}
                        Ok(StreamEvent::Done) => break,
                        Ok(StreamEvent::Error(message)) => {
                            return Err(ExecutorError::ProviderStream { session: session.to_string(), message });
                        }
                        Err(error) => {
                            return Err(ExecutorError::ProviderStream { session: session.to_string(), message: error.to_string() });
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Run one injection end to end (§4.6 steps 1-15).
    async fn run(
        &self,
        session: &str,
        payload: InjectPayload,
        abort: CancellationToken,
    ) -> Result<InjectResult, ExecutorError> {
        // Step 1: security.
        let security_context = self.check_security(session, &payload.source)?;
        let _guard = {
            self.active
                .write()
                .expect("executor active-context lock poisoned")
                .insert(session.to_string(), Arc::new(security_context.clone()));
            SecurityContextGuard { active: &self.active, session: session.to_string() }
        };

        // Step 2: abort check.
        if abort.is_cancelled() {
            return Err(ExecutorError::Cancelled);
        }

        // Step 3: normalize payload.
        let normalized = normalize_payload(&payload.message);

        // Step 4: new-session event.
        let known_sessions = self.sessions.get_sessions().await.map_err(ExecutorError::Session)?;
        let is_new_session = !known_sessions.contains_key(session);
        if is_new_session {
            self.events.publish(WoprEvent::SessionCreate {
                metadata: EventMetadata::new("executor"),
                session: session.to_string(),
            });
            self.record_audit(
                Some(session),
                AuditAction::SessionCreated { session: session.to_string() },
                AuthorizationProof::Source { kind: payload.source.kind, origin: payload.source.origin.clone() },
                AuditOutcome::success(),
            );
        }
        self.record_audit(
            Some(session),
            AuditAction::InjectionAccepted {
                session: session.to_string(),
                source_kind: payload.source.kind,
                origin: payload.source.origin.clone(),
            },
            AuthorizationProof::Source { kind: payload.source.kind, origin: payload.source.origin.clone() },
            AuditOutcome::success(),
        );

        // Step 5: context assembly.
        let message_info = MessageInfo::new(normalized.text.clone(), payload.from.clone());
        let assembled = self.context.assemble(session, &message_info, &AssembleOptions::all()).await;
        if !assembled.system.is_empty() || !assembled.context.is_empty() {
            let combined = [assembled.system.as_str(), assembled.context.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");
            self.log
                .log_message(session, "context-assembly", &combined, EntryKind::Context)
                .map_err(ExecutorError::Session)?;
        }

        // Step 6: incoming middleware.
        let channel = payload.channel.clone().unwrap_or_else(|| "api".to_string());
        let mw_ctx = MiddlewareContext::new(session, payload.from.clone(), channel);
        let incoming = self.middleware.run_incoming(&mw_ctx, normalized.text.clone()).await;
        if incoming.prevented {
            let middleware_name = incoming.prevented_by.clone().unwrap_or_default();
            self.log
                .log_message(session, "middleware", "Message blocked by hook.", EntryKind::Context)
                .map_err(ExecutorError::Session)?;
            self.record_audit(
                Some(session),
                AuditAction::MiddlewarePrevented {
                    session: session.to_string(),
                    direction: "incoming".to_string(),
                    middleware: middleware_name,
                    reason: None,
                },
                AuthorizationProof::NotRequired { reason: "middleware short-circuit".to_string() },
                AuditOutcome::success(),
            );
            return Ok(InjectResult::new(String::new(), known_sessions.get(session).cloned()));
        }
        let processed_message = incoming.payload;

        // Step 7: log user message.
        let annotated = annotate_images(&processed_message, &normalized.images);
        self.log.log_message(session, &payload.from, &annotated, EntryKind::Message).map_err(ExecutorError::Session)?;

        // Step 8: compose prompt.
        let prompt = compose_prompt(&processed_message, &assembled.context, &payload.from);

        // Steps 9-11: provider resolution and streaming.
        let (response, conversation_id) =
            self.run_provider(session, &prompt, &assembled.system, &abort).await?;

        // Step 12: outgoing middleware.
        let outgoing = self.middleware.run_outgoing(&mw_ctx, response).await;
        if outgoing.prevented {
            let middleware_name = outgoing.prevented_by.clone().unwrap_or_default();
            self.log
                .log_message(session, "middleware", "Response blocked by hook.", EntryKind::Context)
                .map_err(ExecutorError::Session)?;
            self.record_audit(
                Some(session),
                AuditAction::MiddlewarePrevented {
                    session: session.to_string(),
                    direction: "outgoing".to_string(),
                    middleware: middleware_name,
                    reason: None,
                },
                AuthorizationProof::NotRequired { reason: "middleware short-circuit".to_string() },
                AuditOutcome::success(),
            );
            return Ok(InjectResult::new(String::new(), conversation_id));
        }
        let final_response = outgoing.payload;

        // Step 13: log response.
        if !final_response.is_empty() {
            self.log.log_message(session, "assistant", &final_response, EntryKind::Response).map_err(ExecutorError::Session)?;
        }

        // Step 14: last-trigger watermark.
        self.last_trigger
            .write()
            .expect("executor last-trigger lock poisoned")
            .insert(session.to_string(), Timestamp::now());

        // Step 15 (guaranteed teardown) happens via `_guard`'s Drop.
        Ok(InjectResult::new(final_response, conversation_id))
    }
}

fn is_stale_conversation(message: &str) -> bool {
    message.to_lowercase().contains(STALE_CONVERSATION_SIGNATURE)
}

#[async_trait]
impl wopr_queue::Executor for InjectionExecutor {
    async fn execute(
        &self,
        session: &str,
        payload: InjectPayload,
        abort: CancellationToken,
    ) -> wopr_queue::ExecutorOutcome {
        match self.run(session, payload, abort).await {
            Ok(result) => Ok(result),
            Err(ExecutorError::Cancelled) => Err(wopr_queue::ExecutorError::Cancelled),
            Err(other) => Err(wopr_queue::ExecutorError::Failed(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use wopr_audit::AuditLog;
    use wopr_events::EventBus;
    use wopr_hooks::{ContextRegistry, MiddlewareChain};
    use wopr_llm::{EchoProvider, ProviderRegistry};
    use wopr_queue::Executor as _;
    use wopr_security::{PolicyEngine, SecurityConfig};
    use wopr_sessions::{ConversationLog, SessionStore};
    use wopr_storage::MemoryKvStore;

    fn executor_with(dir: &std::path::Path) -> InjectionExecutor {
        let providers = Arc::new(ProviderRegistry::new());
        providers.register("echo", Arc::new(EchoProvider::new("echo-model")));
        InjectionExecutor::new(
            Arc::new(PolicyEngine::new(SecurityConfig::permissive())),
            Arc::new(ContextRegistry::new()),
            Arc::new(MiddlewareChain::new()),
            Arc::new(SessionStore::new(Arc::new(MemoryKvStore::new()))),
            Arc::new(ConversationLog::new(dir)),
            providers,
            Arc::new(EventBus::new()),
            Arc::new(AuditLog::new(dir.join("audit.jsonl"))),
            &wopr_config::ExecutorConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_execute_echoes_through_the_full_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_with(dir.path());

        let payload = InjectPayload::new(serde_json::json!("hello there"), "cli");
        let result = executor.execute("alice", payload, CancellationToken::new()).await.unwrap();

        assert_eq!(result.response, "hello there");
        assert_eq!(executor.log.read("alice", None).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_execute_prefixes_non_trivial_sender_into_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_with(dir.path());

        let payload = InjectPayload::new(serde_json::json!("hi"), "alice");
        let result = executor.execute("team", payload, CancellationToken::new()).await.unwrap();

        assert_eq!(result.response, "alice: hi");
    }

    #[tokio::test]
    async fn test_execute_publishes_session_create_for_new_session() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_with(dir.path());
        let mut receiver = executor.events.subscribe();

        let payload = InjectPayload::new(serde_json::json!("hi"), "cli");
        executor.execute("new-session", payload, CancellationToken::new()).await.unwrap();

        let event = receiver.recv().await.unwrap();
        assert!(matches!(&*event, WoprEvent::SessionCreate { session, .. } if session == "new-session"));
    }

    #[tokio::test]
    async fn test_execute_denies_when_security_check_fails_enforce_mode() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SecurityConfig::default();
        config.defaults.min_trust_level = wopr_core::TrustLevel::Owner;
        let providers = Arc::new(ProviderRegistry::new());
        providers.register("echo", Arc::new(EchoProvider::default()));
        let executor = InjectionExecutor::new(
            Arc::new(PolicyEngine::new(config)),
            Arc::new(ContextRegistry::new()),
            Arc::new(MiddlewareChain::new()),
            Arc::new(SessionStore::new(Arc::new(MemoryKvStore::new()))),
            Arc::new(ConversationLog::new(dir.path())),
            providers,
            Arc::new(EventBus::new()),
            Arc::new(AuditLog::new(dir.path().join("audit.jsonl"))),
            &wopr_config::ExecutorConfig::default(),
        );

        let source = InjectionSource {
            kind: wopr_core::InjectionSourceKind::P2p,
            origin: "untrusted-peer".to_string(),
            granted_capabilities: Vec::new(),
            trust_override: None,
        };
        let payload = InjectPayload::new(serde_json::json!("hi"), "peer").with_source(source);
        let result = executor.execute("alice", payload, CancellationToken::new()).await;

        assert!(matches!(result, Err(wopr_queue::ExecutorError::Failed(_))));
    }

    #[tokio::test]
    async fn test_execute_aborts_before_start_when_already_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_with(dir.path());
        let token = CancellationToken::new();
        token.cancel();

        let payload = InjectPayload::new(serde_json::json!("hi"), "cli");
        let result = executor.execute("alice", payload, token).await;
        assert!(matches!(result, Err(wopr_queue::ExecutorError::Cancelled)));
    }

    #[tokio::test]
    async fn test_slash_command_is_not_prefixed_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_with(dir.path());

        struct AlwaysContext;
        #[async_trait::async_trait]
        impl wopr_hooks::ContextProvider for AlwaysContext {
            fn name(&self) -> &str {
                "always"
            }
            async fn provide(
                &self,
                _session: &str,
                _message: &MessageInfo,
            ) -> Result<wopr_hooks::ContextContribution, wopr_hooks::HookError> {
                Ok(wopr_hooks::ContextContribution::context("some context"))
            }
        }
        executor.context.register(Arc::new(AlwaysContext), 10);

        let payload = InjectPayload::new(serde_json::json!("/status"), "cli");
        let result = executor.execute("alice", payload, CancellationToken::new()).await.unwrap();
        assert_eq!(result.response, "/status");
    }

    #[tokio::test]
    async fn test_active_security_context_cleared_after_completion() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_with(dir.path());

        let payload = InjectPayload::new(serde_json::json!("hi"), "cli");
        executor.execute("alice", payload, CancellationToken::new()).await.unwrap();

        assert!(executor.active_security_context("alice").is_none());
    }

    #[tokio::test]
    async fn test_last_trigger_recorded_after_completion() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_with(dir.path());

        let payload = InjectPayload::new(serde_json::json!("hi"), "cli");
        executor.execute("alice", payload, CancellationToken::new()).await.unwrap();

        assert!(executor.last_trigger_at("alice").is_some());
    }

    #[tokio::test]
    async fn test_incoming_middleware_prevention_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let executor = executor_with(dir.path());

        struct Blocker;
        #[async_trait::async_trait]
        impl wopr_hooks::Middleware for Blocker {
            fn name(&self) -> &str {
                "blocker"
            }
            async fn on_incoming(
                &self,
                _ctx: &MiddlewareContext,
                _message: String,
            ) -> Result<wopr_hooks::HookOutcome, wopr_hooks::HookError> {
                Ok(wopr_hooks::HookOutcome::prevent())
            }
        }
        executor.middleware.register(Arc::new(Blocker), 10);

        let payload = InjectPayload::new(serde_json::json!("hi"), "cli");
        let result = executor.execute("alice", payload, CancellationToken::new()).await.unwrap();
        assert_eq!(result.response, "");
    }
}
