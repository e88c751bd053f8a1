//! The audit entry taxonomy: what happened, who authorized it, and how it
//! came out.

use serde::{Deserialize, Serialize};
use wopr_core::{InjectionSourceKind, Timestamp};

/// A single audited action, tagged by kind.
///
/// This mirrors the daemon's own vocabulary (sessions, injections, security
/// checks, provider resolution, scheduler triggers) rather than any
/// particular caller's internals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditAction {
    /// A session was created because no stored conversation id existed yet.
    SessionCreated {
        /// The session name.
        session: String,
    },
    /// A session was destroyed via the session store's delete operation.
    SessionDestroyed {
        /// The session name.
        session: String,
        /// Caller-supplied reason, if any.
        reason: Option<String>,
    },
    /// An injection was accepted into a session's queue.
    InjectionAccepted {
        /// The session name.
        session: String,
        /// The kind of surface the injection arrived through.
        source_kind: InjectionSourceKind,
        /// The origin identifier within that surface.
        origin: String,
    },
    /// A security policy check denied an action.
    SecurityCheckDenied {
        /// The session involved, if the check was session-scoped.
        session: Option<String>,
        /// Which check failed (`session_access`, `capability`, `tool_access`, ...).
        check: String,
        /// The denial reason.
        reason: String,
    },
    /// A security policy check would have denied, but enforcement is in
    /// `warn` mode, so the action proceeded.
    SecurityCheckWarned {
        /// The session involved, if the check was session-scoped.
        session: Option<String>,
        /// Which check was downgraded.
        check: String,
        /// The reason the check would otherwise have denied.
        reason: String,
    },
    /// Middleware prevented a message from continuing through the chain.
    MiddlewarePrevented {
        /// The session name.
        session: String,
        /// `"incoming"` or `"outgoing"`.
        direction: String,
        /// The middleware's name.
        middleware: String,
        /// Why the middleware prevented continuation, if supplied.
        reason: Option<String>,
    },
    /// The provider registry resolved a provider for a session's injection.
    ProviderResolved {
        /// The session name.
        session: String,
        /// The resolved provider id.
        provider: String,
        /// The resolved model, if one was selected.
        model: Option<String>,
    },
    /// Resolution skipped past an unavailable provider to the next in the
    /// fallback chain, within the same injection.
    ProviderFallback {
        /// The session name.
        session: String,
        /// The provider that was skipped.
        from: String,
        /// The provider resolution moved to.
        to: String,
    },
    /// No provider in the resolution chain was available.
    ProviderUnavailable {
        /// The session name.
        session: String,
        /// The primary provider id that was requested.
        requested: String,
    },
    /// The executor's stale-resume recovery cleared a stored conversation id
    /// and retried once with a fresh conversation.
    StaleResumeRetried {
        /// The session name.
        session: String,
    },
    /// A scheduler trigger fired and enqueued an injection.
    SchedulerTriggerFired {
        /// The trigger's id.
        trigger_id: String,
    },
    /// The daemon's configuration was reloaded from disk.
    ConfigReloaded,
}

impl AuditAction {
    /// A short, human-readable description of this action, independent of
    /// its outcome.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::SessionCreated { session } => format!("session '{session}' created"),
            Self::SessionDestroyed { session, .. } => format!("session '{session}' destroyed"),
            Self::InjectionAccepted { session, source_kind, origin } => {
                format!("injection accepted into '{session}' from {source_kind:?}:{origin}")
            },
            Self::SecurityCheckDenied { check, .. } => format!("security check '{check}' denied"),
            Self::SecurityCheckWarned { check, .. } => {
                format!("security check '{check}' warned (enforcement=warn)")
            },
            Self::MiddlewarePrevented { middleware, direction, .. } => {
                format!("{direction} middleware '{middleware}' prevented continuation")
            },
            Self::ProviderResolved { provider, .. } => format!("provider '{provider}' resolved"),
            Self::ProviderFallback { from, to, .. } => {
                format!("fell back from provider '{from}' to '{to}'")
            },
            Self::ProviderUnavailable { requested, .. } => {
                format!("no available provider starting at '{requested}'")
            },
            Self::StaleResumeRetried { session } => {
                format!("session '{session}' retried with a fresh conversation")
            },
            Self::SchedulerTriggerFired { trigger_id } => format!("trigger '{trigger_id}' fired"),
            Self::ConfigReloaded => "configuration reloaded".to_string(),
        }
    }
}

/// How an audited action was authorized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthorizationProof {
    /// Authorized by an injection source's resolved policy.
    Source {
        /// The kind of surface the source arrived through.
        kind: InjectionSourceKind,
        /// The origin identifier within that surface.
        origin: String,
    },
    /// Authorized by the daemon itself, outside any injection (startup,
    /// config reload, scheduler housekeeping).
    System {
        /// Why no external authorization was needed.
        reason: String,
    },
    /// No authorization was required for this action.
    NotRequired {
        /// Why authorization does not apply here.
        reason: String,
    },
    /// The action was attempted but denied.
    Denied {
        /// The denial reason.
        reason: String,
    },
}

/// The result of an audited action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The action completed successfully.
    Success {
        /// Optional free-form detail.
        details: Option<String>,
    },
    /// The action failed.
    Failure {
        /// The error that caused the failure.
        error: String,
    },
}

impl AuditOutcome {
    /// A bare success with no extra detail.
    #[must_use]
    pub fn success() -> Self {
        Self::Success { details: None }
    }

    /// A success carrying a free-form detail string.
    #[must_use]
    pub fn success_with(details: impl Into<String>) -> Self {
        Self::Success { details: Some(details.into()) }
    }

    /// A failure carrying its error message.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure { error: error.into() }
    }

    /// Whether this outcome represents success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// A single line in the audit trail: what happened, who authorized it, when,
/// and how it came out.
///
/// Unlike the teacher's chain-linked entries, these are plain records with no
/// signature or hash-chain fields — the audit trail is an observability
/// artifact, not a tamper-evidence mechanism.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    /// When this entry was recorded.
    pub timestamp: Timestamp,
    /// The session this entry concerns, if any.
    pub session: Option<String>,
    /// What happened.
    pub action: AuditAction,
    /// How it was authorized.
    pub authorization: AuthorizationProof,
    /// How it came out.
    pub outcome: AuditOutcome,
}

impl AuditEntry {
    /// Construct a new entry stamped with the current time.
    #[must_use]
    pub fn new(
        session: Option<impl Into<String>>,
        action: AuditAction,
        authorization: AuthorizationProof,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            timestamp: Timestamp::now(),
            session: session.map(Into::into),
            action,
            authorization,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_description_covers_every_variant() {
        let actions = [
            AuditAction::SessionCreated { session: "alice".into() },
            AuditAction::SessionDestroyed { session: "alice".into(), reason: None },
            AuditAction::InjectionAccepted {
                session: "alice".into(),
                source_kind: InjectionSourceKind::Cli,
                origin: "local".into(),
            },
            AuditAction::SecurityCheckDenied {
                session: Some("alice".into()),
                check: "tool_access".into(),
                reason: "missing capability".into(),
            },
            AuditAction::SecurityCheckWarned {
                session: Some("alice".into()),
                check: "tool_access".into(),
                reason: "missing capability".into(),
            },
            AuditAction::MiddlewarePrevented {
                session: "alice".into(),
                direction: "incoming".into(),
                middleware: "rate-limit".into(),
                reason: None,
            },
            AuditAction::ProviderResolved {
                session: "alice".into(),
                provider: "claude".into(),
                model: Some("opus".into()),
            },
            AuditAction::ProviderFallback {
                session: "alice".into(),
                from: "claude".into(),
                to: "echo".into(),
            },
            AuditAction::ProviderUnavailable { session: "alice".into(), requested: "claude".into() },
            AuditAction::StaleResumeRetried { session: "alice".into() },
            AuditAction::SchedulerTriggerFired { trigger_id: "daily-digest".into() },
            AuditAction::ConfigReloaded,
        ];
        for action in &actions {
            assert!(!action.description().is_empty());
        }
    }

    #[test]
    fn test_outcome_constructors() {
        assert!(AuditOutcome::success().is_success());
        assert!(AuditOutcome::success_with("ok").is_success());
        assert!(!AuditOutcome::failure("nope").is_success());
    }

    #[test]
    fn test_entry_roundtrips_through_json() {
        let entry = AuditEntry::new(
            Some("alice"),
            AuditAction::SessionCreated { session: "alice".into() },
            AuthorizationProof::System { reason: "startup".into() },
            AuditOutcome::success(),
        );
        let line = serde_json::to_string(&entry).unwrap();
        let parsed: AuditEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, entry);
    }
}
