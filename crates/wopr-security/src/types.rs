//! Data model for the security policy engine (§3, §4.8).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wopr_config::EnforcementLevel;
use wopr_core::TrustLevel;

/// Sandbox settings attached to a trust level's base policy.
///
/// Implementation-defined: the daemon does not sandbox tool execution
/// itself, but carries the flag through so a tool-execution layer can
/// honor it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SandboxSettings {
    /// Whether tool calls from this trust level should be sandboxed.
    #[serde(default)]
    pub enabled: bool,
}

/// Rate-limit numbers attached to a trust level's base policy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateLimit {
    /// Maximum injections per minute for this trust level.
    pub injections_per_minute: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            injections_per_minute: 60,
        }
    }
}

/// Rules governing whether a session may forward injections to others.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForwardRules {
    /// Session name patterns this session is allowed to forward to.
    /// An empty list with `ForwardRules` present still requires
    /// `cross.inject`; it carries no targets of its own.
    #[serde(default)]
    pub allowed_targets: Vec<String>,
}

/// Base policy attached to one trust level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustPolicy {
    /// Capabilities granted by default at this trust level. May contain
    /// `*` for "all capabilities".
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// If set, only these sessions are reachable at this trust level.
    #[serde(default)]
    pub allowed_sessions: Option<Vec<String>>,
    /// Sessions explicitly unreachable at this trust level.
    #[serde(default)]
    pub blocked_sessions: Vec<String>,
    /// Sandbox settings for tool calls at this trust level.
    #[serde(default)]
    pub sandbox: SandboxSettings,
    /// Rate limit for this trust level.
    #[serde(default)]
    pub rate_limit: RateLimit,
    /// Tools explicitly allowed regardless of wildcard deny rules.
    #[serde(default)]
    pub tool_allow: Vec<String>,
    /// Tools explicitly denied regardless of capability grants.
    #[serde(default)]
    pub tool_deny: Vec<String>,
}

/// Per-session override layered on top of a source's trust-level policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionOverride {
    /// Access patterns a source's origin must match to reach this
    /// session (glob-style, matched against `InjectionSource::origin`).
    #[serde(default)]
    pub access: Vec<String>,
    /// Additional capabilities granted while targeting this session.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Forwarding rules if this session is a gateway session.
    #[serde(default)]
    pub forward: Option<ForwardRules>,
}

/// Global defaults applied during policy resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalDefaults {
    /// Minimum trust level required to reach any session at all.
    #[serde(default)]
    pub min_trust_level: TrustLevel,
    /// Access patterns applied when a session defines none of its own.
    #[serde(default)]
    pub default_access_patterns: Vec<String>,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            min_trust_level: TrustLevel::Untrusted,
            default_access_patterns: Vec::new(),
        }
    }
}

/// The full, persisted security policy (`security.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Stored enforcement level. Takes effect only if no environment
    /// override is set; see `wopr_config::env::enforcement_override`.
    #[serde(default)]
    pub enforcement: Option<EnforcementLevel>,
    /// Base policy per trust level.
    #[serde(default)]
    pub trust_policies: HashMap<TrustLevel, TrustPolicy>,
    /// Per-session overrides, keyed by session name.
    #[serde(default)]
    pub session_overrides: HashMap<String, SessionOverride>,
    /// Global defaults.
    #[serde(default)]
    pub defaults: GlobalDefaults,
}

impl SecurityConfig {
    /// A permissive config: every trust level gets `*`, no restrictions.
    ///
    /// Used for tests and as a starting point before an operator tunes
    /// `security.json`.
    #[must_use]
    pub fn permissive() -> Self {
        let mut trust_policies = HashMap::new();
        for level in [
            TrustLevel::Untrusted,
            TrustLevel::SemiTrusted,
            TrustLevel::Trusted,
            TrustLevel::Owner,
        ] {
            trust_policies.insert(
                level,
                TrustPolicy {
                    capabilities: vec!["*".to_string()],
                    ..TrustPolicy::default()
                },
            );
        }
        Self {
            enforcement: None,
            trust_policies,
            session_overrides: HashMap::new(),
            defaults: GlobalDefaults::default(),
        }
    }
}

/// Which sessions a policy allows a source to reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFilter {
    /// Every session is reachable.
    All,
    /// Only these sessions are reachable.
    List(Vec<String>),
}

/// The effective policy computed for one injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPolicy {
    /// Effective trust level (source override or source-kind default).
    pub trust_level: TrustLevel,
    /// Deduplicated effective capabilities.
    pub capabilities: Vec<String>,
    /// Sessions this policy permits.
    pub allowed_sessions: SessionFilter,
    /// Sessions explicitly blocked.
    pub blocked_sessions: Vec<String>,
    /// Sandbox settings in effect.
    pub sandbox: SandboxSettings,
    /// Rate limit in effect.
    pub rate_limit: RateLimit,
    /// Whether the target session is a gateway session.
    pub is_gateway: bool,
    /// Whether this source may forward injections from the target
    /// session to another.
    pub can_forward: bool,
    /// Forward rules, if `is_gateway`.
    pub forward_rules: Option<ForwardRules>,
}

/// Outcome of an access or capability check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Whether the check passed.
    pub allowed: bool,
    /// Reason for denial, or a warning when `warn` mode downgraded a
    /// denial to an allow.
    pub reason: Option<String>,
}

impl CheckOutcome {
    /// An unconditional allow.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// A denial with `reason`.
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    /// An allow carrying a warning (used by `warn`-mode downgrades).
    #[must_use]
    pub fn allow_with_warning(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_grants_wildcard() {
        let config = SecurityConfig::permissive();
        assert_eq!(
            config.trust_policies[&TrustLevel::Owner].capabilities,
            vec!["*".to_string()]
        );
    }

    #[test]
    fn test_check_outcome_constructors() {
        assert!(CheckOutcome::allow().allowed);
        assert!(!CheckOutcome::deny("nope").allowed);
        assert!(CheckOutcome::allow_with_warning("hmm").allowed);
    }
}
