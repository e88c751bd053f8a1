//! Configuration struct definitions.

use serde::{Deserialize, Serialize};

/// Global security enforcement level.
///
/// Ordered loosest-to-strictest only in the sense that `off` disables all
/// capability checks, `warn` logs violations but allows the action, and
/// `enforce` denies violations. Only these three string values are ever
/// accepted from config files or environment variables; anything else is
/// ignored and the next source in the precedence chain is tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementLevel {
    /// No capability checks are performed.
    Off,
    /// Violations are logged but the action proceeds.
    Warn,
    /// Violations are denied.
    #[default]
    Enforce,
}

impl EnforcementLevel {
    /// Parse from the literal `off`/`warn`/`enforce` vocabulary.
    ///
    /// Returns `None` for anything else, per the "invalid values ignored"
    /// rule governing every enforcement-level source.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(Self::Off),
            "warn" => Some(Self::Warn),
            "enforce" => Some(Self::Enforce),
            _ => None,
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Host/address to bind the HTTP+WebSocket listener to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 4173,
        }
    }
}

/// Event fan-out (WebSocket) tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Number of unacked events queued to a subscriber before it is
    /// disconnected for backpressure.
    pub backpressure_threshold: usize,
    /// Seconds between server-initiated heartbeat pings.
    pub heartbeat_interval_secs: u64,
    /// Seconds of heartbeat silence before a connection is considered
    /// dead and dropped.
    pub heartbeat_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            backpressure_threshold: 512,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
        }
    }
}

/// Injection executor tunables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Seconds of no streamed output before a provider query is treated
    /// as an idle-timeout error.
    pub idle_timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 600,
        }
    }
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings.
    pub http: HttpConfig,
    /// Event fan-out settings.
    pub gateway: GatewayConfig,
    /// Executor settings.
    pub executor: ExecutorConfig,
    /// Compiled-default enforcement level (lowest-priority source; a
    /// stored `security.json` value or the `WOPR_SECURITY_ENFORCEMENT`
    /// env var both take precedence over this).
    pub enforcement: EnforcementLevel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enforcement_level_parse() {
        assert_eq!(EnforcementLevel::parse("off"), Some(EnforcementLevel::Off));
        assert_eq!(
            EnforcementLevel::parse("warn"),
            Some(EnforcementLevel::Warn)
        );
        assert_eq!(
            EnforcementLevel::parse("enforce"),
            Some(EnforcementLevel::Enforce)
        );
        assert_eq!(EnforcementLevel::parse("nonsense"), None);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.http.port, 4173);
        assert_eq!(config.gateway.backpressure_threshold, 512);
        assert_eq!(config.executor.idle_timeout_secs, 600);
        assert_eq!(config.enforcement, EnforcementLevel::Enforce);
    }
}
