//! Environment variable resolution.
//!
//! `WOPR_*` variables are the highest-priority source for most fields,
//! and for `enforcement` specifically, the override applies only to the
//! cached synchronous read path, never to what's persisted — see
//! [`enforcement_override`].

use crate::types::EnforcementLevel;

/// Resolve `WOPR_SECURITY_ENFORCEMENT`, if set to a recognized value.
///
/// Per the enforcement precedence rule, this overrides the stored
/// config's enforcement level for read paths only; it never gets
/// persisted back to the stored config, and an unrecognized value is
/// treated as absent (falls through to the stored value).
#[must_use]
pub fn enforcement_override() -> Option<EnforcementLevel> {
    std::env::var("WOPR_SECURITY_ENFORCEMENT")
        .ok()
        .and_then(|v| EnforcementLevel::parse(&v))
}

/// Resolve `WOPR_HTTP_HOST`/`WOPR_HTTP_PORT` overlay values as a TOML
/// table fragment, for merging into the loaded config tree.
#[must_use]
pub fn http_overlay() -> Option<toml::Value> {
    let host = std::env::var("WOPR_HTTP_HOST").ok();
    let port = std::env::var("WOPR_HTTP_PORT")
        .ok()
        .and_then(|v| v.parse::<i64>().ok());

    if host.is_none() && port.is_none() {
        return None;
    }

    let mut table = toml::map::Map::new();
    if let Some(host) = host {
        table.insert("host".to_owned(), toml::Value::String(host));
    }
    if let Some(port) = port {
        table.insert("port".to_owned(), toml::Value::Integer(port));
    }

    let mut root = toml::map::Map::new();
    root.insert("http".to_owned(), toml::Value::Table(table));
    Some(toml::Value::Table(root))
}
