//! The security policy engine (§4.8).
//!
//! All checks read a shared, live-editable [`SecurityConfig`]; callers
//! hold no lock across a check. `resolve_policy` is the one operation
//! every other check is built on: it walks trust level → per-session
//! overrides → effective capabilities, the same resolution every other
//! operation here reuses rather than re-deriving.

use std::sync::RwLock;

use wopr_config::EnforcementLevel;
use wopr_core::{InjectionSource, InjectionSourceKind, TrustLevel};

use crate::types::{CheckOutcome, ResolvedPolicy, SecurityConfig, SessionFilter, TrustPolicy};

/// Static `tool -> required capability` map consulted by
/// `check_tool_access`. Tools absent from this map require no
/// capability beyond passing the deny-list check.
const TOOL_CAPABILITIES: &[(&str, &str)] = &[
    ("read_file", "fs.read"),
    ("write_file", "fs.write"),
    ("list_files", "fs.read"),
    ("exec", "inject.exec"),
    ("list_tools", "inject.tools"),
    ("config_set", "config.write"),
    ("config_get", "config.read"),
    ("forward_session", "cross.inject"),
];

fn tool_capability(tool: &str) -> Option<&'static str> {
    TOOL_CAPABILITIES
        .iter()
        .find(|(name, _)| *name == tool)
        .map(|(_, cap)| *cap)
}

/// The default trust level for a source kind (§3 GLOSSARY).
#[must_use]
pub fn default_trust_level(kind: InjectionSourceKind) -> TrustLevel {
    match kind {
        InjectionSourceKind::Cli | InjectionSourceKind::Scheduler => TrustLevel::Owner,
        InjectionSourceKind::Plugin | InjectionSourceKind::Daemon => TrustLevel::Trusted,
        InjectionSourceKind::Api => TrustLevel::SemiTrusted,
        InjectionSourceKind::P2p => TrustLevel::Untrusted,
    }
}

/// Whether `held` grants `requested`, applying the wildcard and
/// parent-capability implication rules (holding `inject` implies
/// `inject.*`).
#[must_use]
pub fn has_capability(held: &[String], requested: &str) -> bool {
    held.iter().any(|cap| {
        if cap == "*" || cap == requested {
            return true;
        }
        if let Some(base) = cap.strip_suffix(".*") {
            return requested == base || requested.starts_with(&format!("{base}."));
        }
        requested.starts_with(&format!("{cap}."))
    })
}

fn matches_any_pattern(patterns: &[String], origin: &str) -> bool {
    patterns.iter().any(|pattern| {
        globset::Glob::new(pattern)
            .map(|glob| glob.compile_matcher().is_match(origin))
            .unwrap_or(false)
    })
}

fn resolve_enforcement(stored: Option<EnforcementLevel>) -> EnforcementLevel {
    wopr_config::env::enforcement_override().unwrap_or_else(|| stored.unwrap_or_default())
}

/// The security policy engine.
pub struct PolicyEngine {
    config: RwLock<SecurityConfig>,
}

impl std::fmt::Debug for PolicyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyEngine").finish_non_exhaustive()
    }
}

impl PolicyEngine {
    /// Construct an engine from an already-loaded config.
    #[must_use]
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Replace the live config, e.g. after an operator edits
    /// `security.json` and the daemon reloads it.
    pub fn replace_config(&self, config: SecurityConfig) {
        *self.config.write().expect("security config lock poisoned") = config;
    }

    /// Snapshot the live config, for read-only API exposure (the HTTP
    /// `/api/capabilities` listing).
    #[must_use]
    pub fn config_snapshot(&self) -> SecurityConfig {
        self.config.read().expect("security config lock poisoned").clone()
    }

    /// Replace one session's granted-capability override list, used by
    /// the HTTP `/api/capabilities/activate` and `/deactivate` routes.
    pub fn set_session_capabilities(&self, session: &str, capabilities: Vec<String>) {
        let mut config = self.config.write().expect("security config lock poisoned");
        config.session_overrides.entry(session.to_string()).or_default().capabilities = capabilities;
    }

    /// The enforcement level currently in effect (env override > stored
    /// value > compiled default).
    #[must_use]
    pub fn effective_enforcement(&self) -> EnforcementLevel {
        let config = self.config.read().expect("security config lock poisoned");
        resolve_enforcement(config.enforcement)
    }

    /// `resolvePolicy(source, sessionName?) -> ResolvedPolicy` (§4.8).
    #[must_use]
    pub fn resolve_policy(&self, source: &InjectionSource, session: Option<&str>) -> ResolvedPolicy {
        let config = self.config.read().expect("security config lock poisoned");
        let trust_level = source
            .trust_override
            .unwrap_or_else(|| default_trust_level(source.kind));
        let trust_policy = config
            .trust_policies
            .get(&trust_level)
            .cloned()
            .unwrap_or_default();

        let mut capabilities = trust_policy.capabilities.clone();
        push_unique(&mut capabilities, &source.granted_capabilities);

        let mut is_gateway = false;
        let mut forward_rules = None;
        if let Some(session_name) = session
            && let Some(session_override) = config.session_overrides.get(session_name)
        {
            push_unique(&mut capabilities, &session_override.capabilities);
            if let Some(rules) = &session_override.forward {
                is_gateway = true;
                forward_rules = Some(rules.clone());
            }
        }

        let can_forward = has_capability(&capabilities, "cross.inject");
        let allowed_sessions = match &trust_policy.allowed_sessions {
            Some(list) => SessionFilter::List(list.clone()),
            None => SessionFilter::All,
        };

        ResolvedPolicy {
            trust_level,
            capabilities,
            allowed_sessions,
            blocked_sessions: trust_policy.blocked_sessions,
            sandbox: trust_policy.sandbox,
            rate_limit: trust_policy.rate_limit,
            is_gateway,
            can_forward,
            forward_rules,
        }
    }

    /// `checkSessionAccess(source, session) -> {allowed, reason?}` (§4.8).
    #[must_use]
    pub fn check_session_access(&self, source: &InjectionSource, session: &str) -> CheckOutcome {
        let config = self.config.read().expect("security config lock poisoned");
        let trust_level = source
            .trust_override
            .unwrap_or_else(|| default_trust_level(source.kind));

        if trust_level == TrustLevel::Owner {
            return CheckOutcome::allow();
        }

        if trust_level < config.defaults.min_trust_level {
            return CheckOutcome::deny(format!(
                "trust level '{trust_level}' is below the minimum required '{}'",
                config.defaults.min_trust_level
            ));
        }

        if let Some(trust_policy) = config.trust_policies.get(&trust_level) {
            if trust_policy.blocked_sessions.iter().any(|s| s == session) {
                return CheckOutcome::deny(format!(
                    "session '{session}' is blocked for trust level '{trust_level}'"
                ));
            }
            if let Some(allowed) = &trust_policy.allowed_sessions
                && !allowed.iter().any(|s| s == session)
            {
                return CheckOutcome::deny(format!(
                    "session '{session}' is not in the allowed list for trust level '{trust_level}'"
                ));
            }
        }

        let session_patterns = config
            .session_overrides
            .get(session)
            .map(|ov| &ov.access)
            .filter(|access| !access.is_empty());
        let patterns = session_patterns.unwrap_or(&config.defaults.default_access_patterns);

        if !patterns.is_empty() && !matches_any_pattern(patterns, &source.origin) {
            return CheckOutcome::deny(format!(
                "origin '{}' does not match session '{session}' access patterns",
                source.origin
            ));
        }

        CheckOutcome::allow()
    }

    /// `checkCapability(source, cap) -> {allowed, reason?}` (§4.8).
    #[must_use]
    pub fn check_capability(&self, source: &InjectionSource, cap: &str) -> CheckOutcome {
        let policy = self.resolve_policy(source, None);
        if has_capability(&policy.capabilities, cap) {
            CheckOutcome::allow()
        } else {
            CheckOutcome::deny(format!("missing capability '{cap}'"))
        }
    }

    /// `checkToolAccess(source, toolName)` (§4.8).
    ///
    /// Deny-list wins over capability grants; explicit allow wins over
    /// a wildcard deny. Under `warn` enforcement a capability-driven
    /// deny is downgraded to an allow with a warning, but wildcard-deny
    /// filtering is still enforced regardless of enforcement level.
    #[must_use]
    pub fn check_tool_access(&self, source: &InjectionSource, tool: &str) -> CheckOutcome {
        let policy = self.resolve_policy(source, None);

        let (trust_policy, enforcement) = {
            let config = self.config.read().expect("security config lock poisoned");
            let trust_policy: TrustPolicy = config
                .trust_policies
                .get(&policy.trust_level)
                .cloned()
                .unwrap_or_default();
            (trust_policy, resolve_enforcement(config.enforcement))
        };

        let explicitly_allowed = trust_policy.tool_allow.iter().any(|t| t == tool);
        let wildcard_denied = trust_policy
            .tool_deny
            .iter()
            .any(|t| t == "*" || t == tool);

        if wildcard_denied && !explicitly_allowed {
            return CheckOutcome::deny(format!("tool '{tool}' is denied by policy"));
        }

        let Some(required_cap) = tool_capability(tool) else {
            return CheckOutcome::allow();
        };

        if has_capability(&policy.capabilities, required_cap) {
            return CheckOutcome::allow();
        }

        match enforcement {
            EnforcementLevel::Enforce => {
                CheckOutcome::deny(format!("tool '{tool}' requires capability '{required_cap}'"))
            }
            EnforcementLevel::Warn => CheckOutcome::allow_with_warning(format!(
                "tool '{tool}' requires capability '{required_cap}', allowed under warn enforcement"
            )),
            EnforcementLevel::Off => CheckOutcome::allow(),
        }
    }

    /// `filterToolsByPolicy(source, toolNames[])` (§4.8).
    #[must_use]
    pub fn filter_tools_by_policy(&self, source: &InjectionSource, tools: &[String]) -> Vec<String> {
        tools
            .iter()
            .filter(|tool| self.check_tool_access(source, tool).allowed)
            .cloned()
            .collect()
    }

    /// `canSessionForward(from, to, source)` (§4.8).
    ///
    /// Denies unless `from_session` is a gateway session, the source
    /// holds `cross.inject`, and the source passes session access for
    /// `to_session`.
    #[must_use]
    pub fn can_session_forward(
        &self,
        from_session: &str,
        to_session: &str,
        source: &InjectionSource,
    ) -> CheckOutcome {
        let policy = self.resolve_policy(source, Some(from_session));
        if !policy.is_gateway {
            return CheckOutcome::deny(format!("session '{from_session}' is not a gateway session"));
        }
        if !has_capability(&policy.capabilities, "cross.inject") {
            return CheckOutcome::deny("source lacks 'cross.inject' capability");
        }
        self.check_session_access(source, to_session)
    }
}

fn push_unique(target: &mut Vec<String>, additions: &[String]) {
    for cap in additions {
        if !target.contains(cap) {
            target.push(cap.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ForwardRules, GlobalDefaults, SessionOverride};
    use std::collections::HashMap;

    fn source(kind: InjectionSourceKind) -> InjectionSource {
        InjectionSource {
            kind,
            origin: "test-origin".to_string(),
            granted_capabilities: Vec::new(),
            trust_override: None,
        }
    }

    #[test]
    fn test_default_trust_level_mapping() {
        assert_eq!(default_trust_level(InjectionSourceKind::Cli), TrustLevel::Owner);
        assert_eq!(
            default_trust_level(InjectionSourceKind::Scheduler),
            TrustLevel::Owner
        );
        assert_eq!(
            default_trust_level(InjectionSourceKind::Plugin),
            TrustLevel::Trusted
        );
        assert_eq!(
            default_trust_level(InjectionSourceKind::Api),
            TrustLevel::SemiTrusted
        );
        assert_eq!(
            default_trust_level(InjectionSourceKind::P2p),
            TrustLevel::Untrusted
        );
    }

    #[test]
    fn test_has_capability_wildcard_and_parent() {
        let held = vec!["inject".to_string()];
        assert!(has_capability(&held, "inject"));
        assert!(has_capability(&held, "inject.tools"));
        assert!(has_capability(&held, "inject.exec"));
        assert!(!has_capability(&held, "config.write"));

        let wildcard = vec!["*".to_string()];
        assert!(has_capability(&wildcard, "anything.at.all"));
    }

    #[test]
    fn test_check_capability_parent_grant() {
        let mut config = SecurityConfig::default();
        config.trust_policies.insert(
            TrustLevel::Untrusted,
            TrustPolicy {
                capabilities: vec!["inject".to_string()],
                ..TrustPolicy::default()
            },
        );
        let engine = PolicyEngine::new(config);
        let src = source(InjectionSourceKind::P2p);

        assert!(engine.check_capability(&src, "inject.tools").allowed);
        assert!(engine.check_capability(&src, "inject.exec").allowed);
        assert!(!engine.check_capability(&src, "config.write").allowed);
    }

    #[test]
    fn test_owner_bypasses_session_access_but_not_capability_checks() {
        let engine = PolicyEngine::new(SecurityConfig::default());
        let src = source(InjectionSourceKind::Cli);

        // checkSessionAccess alone grants Owner a blanket bypass (§4.8).
        assert!(engine.check_session_access(&src, "any-session").allowed);

        // checkCapability/checkToolAccess apply the same */literal/parent/
        // grants algebra to Owner as to any other trust level: with no
        // trust policy configured for Owner, neither check is granted.
        assert!(!engine.check_capability(&src, "anything").allowed);
        assert!(!engine.check_tool_access(&src, "exec").allowed);
    }

    #[test]
    fn test_owner_capability_and_tool_access_follow_granted_policy() {
        let engine = PolicyEngine::new(SecurityConfig::permissive());
        let src = source(InjectionSourceKind::Cli);

        assert!(engine.check_capability(&src, "anything").allowed);
        assert!(engine.check_tool_access(&src, "exec").allowed);
    }

    #[test]
    fn test_check_session_access_blocked_list() {
        let mut config = SecurityConfig::default();
        config.trust_policies.insert(
            TrustLevel::Untrusted,
            TrustPolicy {
                blocked_sessions: vec!["private".to_string()],
                ..TrustPolicy::default()
            },
        );
        let engine = PolicyEngine::new(config);
        let src = source(InjectionSourceKind::P2p);

        assert!(!engine.check_session_access(&src, "private").allowed);
        assert!(engine.check_session_access(&src, "public").allowed);
    }

    #[test]
    fn test_check_session_access_min_trust_level() {
        let mut config = SecurityConfig::default();
        config.defaults = GlobalDefaults {
            min_trust_level: TrustLevel::SemiTrusted,
            default_access_patterns: Vec::new(),
        };
        let engine = PolicyEngine::new(config);
        let src = source(InjectionSourceKind::P2p);

        let outcome = engine.check_session_access(&src, "any-session");
        assert!(!outcome.allowed);
    }

    #[test]
    fn test_check_session_access_pattern_match() {
        let mut config = SecurityConfig::default();
        let mut overrides = HashMap::new();
        overrides.insert(
            "locked".to_string(),
            SessionOverride {
                access: vec!["trusted-*".to_string()],
                ..SessionOverride::default()
            },
        );
        config.session_overrides = overrides;
        let engine = PolicyEngine::new(config);

        let mut matching = source(InjectionSourceKind::Api);
        matching.origin = "trusted-plugin-7".to_string();
        assert!(engine.check_session_access(&matching, "locked").allowed);

        let mut rejected = source(InjectionSourceKind::Api);
        rejected.origin = "random-caller".to_string();
        assert!(!engine.check_session_access(&rejected, "locked").allowed);
    }

    #[test]
    fn test_check_tool_access_explicit_allow_wins_over_wildcard_deny() {
        let mut config = SecurityConfig::default();
        config.trust_policies.insert(
            TrustLevel::Untrusted,
            TrustPolicy {
                tool_deny: vec!["*".to_string()],
                tool_allow: vec!["read_file".to_string()],
                capabilities: vec!["fs.read".to_string()],
                ..TrustPolicy::default()
            },
        );
        let engine = PolicyEngine::new(config);
        let src = source(InjectionSourceKind::P2p);

        assert!(engine.check_tool_access(&src, "read_file").allowed);
        assert!(!engine.check_tool_access(&src, "write_file").allowed);
    }

    #[test]
    fn test_check_tool_access_warn_mode_downgrades_capability_deny() {
        let mut config = SecurityConfig::default();
        config.enforcement = Some(EnforcementLevel::Warn);
        config
            .trust_policies
            .insert(TrustLevel::Untrusted, TrustPolicy::default());
        let engine = PolicyEngine::new(config);
        let src = source(InjectionSourceKind::P2p);

        let outcome = engine.check_tool_access(&src, "read_file");
        assert!(outcome.allowed);
        assert!(outcome.reason.is_some());
    }

    #[test]
    fn test_check_tool_access_warn_mode_still_enforces_wildcard_deny() {
        let mut config = SecurityConfig::default();
        config.enforcement = Some(EnforcementLevel::Warn);
        config.trust_policies.insert(
            TrustLevel::Untrusted,
            TrustPolicy {
                tool_deny: vec!["*".to_string()],
                ..TrustPolicy::default()
            },
        );
        let engine = PolicyEngine::new(config);
        let src = source(InjectionSourceKind::P2p);

        assert!(!engine.check_tool_access(&src, "read_file").allowed);
    }

    #[test]
    fn test_can_session_forward_requires_gateway_and_capability() {
        let mut config = SecurityConfig::default();
        let mut overrides = HashMap::new();
        overrides.insert(
            "gateway".to_string(),
            SessionOverride {
                capabilities: vec!["cross.inject".to_string()],
                forward: Some(ForwardRules {
                    allowed_targets: vec!["target".to_string()],
                }),
                ..SessionOverride::default()
            },
        );
        config.session_overrides = overrides;
        let engine = PolicyEngine::new(config);
        let src = source(InjectionSourceKind::Api);

        assert!(engine.can_session_forward("gateway", "target", &src).allowed);
        assert!(!engine.can_session_forward("non-gateway", "target", &src).allowed);
    }

    #[test]
    fn test_filter_tools_by_policy() {
        let mut config = SecurityConfig::default();
        config.trust_policies.insert(
            TrustLevel::Untrusted,
            TrustPolicy {
                capabilities: vec!["fs.read".to_string()],
                ..TrustPolicy::default()
            },
        );
        let engine = PolicyEngine::new(config);
        let src = source(InjectionSourceKind::P2p);

        let tools = vec!["read_file".to_string(), "write_file".to_string()];
        let filtered = engine.filter_tools_by_policy(&src, &tools);
        assert_eq!(filtered, vec!["read_file".to_string()]);
    }
}
