//! Shared data-model primitives used across every WOPR crate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A validated, filesystem-safe session name.
///
/// Session names become path segments (`sessions/{name}.md`,
/// `sessions/{name}.conversation.jsonl`), so they are restricted to
/// ASCII alphanumerics, `-`, and `_`, 1-128 bytes, and may not be `.`
/// or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionName(String);

impl SessionName {
    /// Validate and wrap a session name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidSessionName`] if `name` is empty,
    /// longer than 128 bytes, contains characters outside
    /// `[A-Za-z0-9_-]`, or is `.`/`..`.
    pub fn parse(name: impl Into<String>) -> Result<Self, CoreError> {
        let name = name.into();

        if name.is_empty() {
            return Err(CoreError::InvalidSessionName {
                name,
                reason: "must not be empty",
            });
        }
        if name.len() > 128 {
            return Err(CoreError::InvalidSessionName {
                name,
                reason: "must not exceed 128 bytes",
            });
        }
        if name == "." || name == ".." {
            return Err(CoreError::InvalidSessionName {
                name,
                reason: "must not be a path traversal segment",
            });
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(CoreError::InvalidSessionName {
                name,
                reason: "must contain only ASCII letters, digits, '-', or '_'",
            });
        }

        Ok(Self(name))
    }

    /// Borrow the underlying name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Milliseconds since the Unix epoch.
///
/// A thin newtype over `i64` so timestamps aren't accidentally compared
/// against or arithmetic'd with unrelated integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Wrap a raw epoch-millisecond value.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Build a timestamp for the current instant.
    ///
    /// Callers needing determinism in tests should construct a
    /// `Timestamp` explicitly via [`Timestamp::from_millis`] instead.
    #[must_use]
    pub fn now() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self(millis)
    }

    /// Raw epoch-millisecond value.
    #[must_use]
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Elapsed milliseconds between `self` and `other`, saturating at zero
    /// if `other` precedes `self`.
    #[must_use]
    pub fn saturating_elapsed_ms(&self, other: Timestamp) -> u64 {
        other.0.saturating_sub(self.0).max(0) as u64
    }
}

/// Trust level assigned to an injected message's origin.
///
/// Ordered `untrusted < semi_trusted < trusted < owner`; derive order
/// is declaration order, which matches that ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrustLevel {
    /// Unauthenticated or unknown origin; most restrictive default policy.
    #[default]
    Untrusted,
    /// Authenticated but not fully vetted (the default for API callers).
    SemiTrusted,
    /// A recognized, vetted surface (the default for registered plugins).
    Trusted,
    /// The daemon operator; bypasses capability checks entirely.
    Owner,
}

impl fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Untrusted => "untrusted",
            Self::SemiTrusted => "semi-trusted",
            Self::Trusted => "trusted",
            Self::Owner => "owner",
        };
        f.write_str(s)
    }
}

/// The kind of surface that produced an injected message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectionSourceKind {
    /// A local command-line invocation.
    Cli,
    /// Another instance of the daemon (peer-to-peer federation).
    Daemon,
    /// A registered plugin.
    Plugin,
    /// The HTTP/WebSocket API.
    Api,
    /// A federated peer-to-peer request.
    P2p,
    /// The scheduler firing a cron or one-shot trigger.
    Scheduler,
}

/// Describes where an injected message came from, for policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectionSource {
    /// The kind of surface this message arrived through.
    #[serde(rename = "type")]
    pub kind: InjectionSourceKind,
    /// A free-form identifier for the specific origin (plugin id, peer
    /// daemon id, API key id, ...).
    pub origin: String,
    /// Capabilities explicitly granted to this injection, in addition to
    /// whatever its trust level implies.
    #[serde(default)]
    pub granted_capabilities: Vec<String>,
    /// An explicit trust-level override for this injection, taking
    /// precedence over the origin's normally-resolved trust level.
    #[serde(default)]
    pub trust_override: Option<TrustLevel>,
}

impl InjectionSource {
    /// The default source for an injection with no explicit origin: a
    /// local CLI invocation, which resolves to owner trust. Used as the
    /// executor's fallback per §4.6 step 1 and by callers (tests, ad-hoc
    /// tooling) that do not carry a real source through.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            kind: InjectionSourceKind::Cli,
            origin: "cli".to_string(),
            granted_capabilities: Vec::new(),
            trust_override: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_accepts_valid() {
        assert!(SessionName::parse("alice").is_ok());
        assert!(SessionName::parse("alice-123_bob").is_ok());
    }

    #[test]
    fn test_session_name_rejects_empty() {
        assert!(SessionName::parse("").is_err());
    }

    #[test]
    fn test_session_name_rejects_traversal() {
        assert!(SessionName::parse("..").is_err());
        assert!(SessionName::parse(".").is_err());
    }

    #[test]
    fn test_session_name_rejects_path_separators() {
        let err = SessionName::parse("../etc/passwd").unwrap_err();
        assert!(matches!(err, CoreError::InvalidSessionName { .. }));
    }

    #[test]
    fn test_session_name_rejects_too_long() {
        let long = "a".repeat(129);
        assert!(SessionName::parse(long).is_err());
    }

    #[test]
    fn test_trust_level_ordering() {
        assert!(TrustLevel::Untrusted < TrustLevel::SemiTrusted);
        assert!(TrustLevel::SemiTrusted < TrustLevel::Trusted);
        assert!(TrustLevel::Trusted < TrustLevel::Owner);
    }

    #[test]
    fn test_timestamp_elapsed() {
        let a = Timestamp::from_millis(1000);
        let b = Timestamp::from_millis(1500);
        assert_eq!(a.saturating_elapsed_ms(b), 500);
        assert_eq!(b.saturating_elapsed_ms(a), 0);
    }

    #[test]
    fn test_injection_source_serde_roundtrip() {
        let src = InjectionSource {
            kind: InjectionSourceKind::Plugin,
            origin: "weather-plugin".to_string(),
            granted_capabilities: vec!["tool.weather.read".to_string()],
            trust_override: None,
        };
        let json = serde_json::to_string(&src).unwrap();
        let back: InjectionSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back.origin, "weather-plugin");
        assert_eq!(back.kind, InjectionSourceKind::Plugin);
    }
}
