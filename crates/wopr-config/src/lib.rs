#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Daemon-wide configuration for WOPR.
//!
//! Provides a single [`Config`] type covering the HTTP listener, gateway
//! fan-out tunables (backpressure threshold, heartbeat cadence), executor
//! tunables (idle timeout), and the default security enforcement level.
//!
//! # Precedence
//!
//! 1. Environment variables (`WOPR_*`) — fallback for unset fields, and
//!    for `enforcement` a full override of the *read path* (see
//!    [`env::enforcement_override`]).
//! 2. `{WOPR_HOME}/config.toml`, if present.
//! 3. Compiled defaults.
//!
//! # Design
//!
//! This crate has no dependency on other internal `wopr-*` crates — it
//! only depends on `serde`, `toml`, `thiserror`, and `tracing`, the same
//! boundary the crate this is grounded on keeps.

/// Environment variable resolution.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Deep-merge of TOML value trees.
pub mod merge;
/// Configuration struct definitions.
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use types::{Config, EnforcementLevel, ExecutorConfig, GatewayConfig, HttpConfig};

impl Config {
    /// Load configuration with the full precedence chain, given the
    /// daemon's home directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `{home}/config.toml` exists but is
    /// malformed.
    pub fn load(home: &std::path::Path) -> ConfigResult<Self> {
        loader::load(home)
    }
}
