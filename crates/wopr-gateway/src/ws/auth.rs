//! Pluggable ticket verification for the `/ws` handshake (§4.9).

use crate::ws::hub::token_eq;

/// Verifies the `token` a client presents in its `auth` message.
///
/// Pluggable so tests can swap in a fixed accept/reject verifier
/// without going through environment variables.
pub trait WsAuth: Send + Sync {
    /// Returns `true` if `token` is valid.
    fn verify(&self, token: &str) -> bool;
}

/// Compares the presented token against one configured secret,
/// constant-time.
pub struct StaticTokenAuth {
    expected: String,
}

impl StaticTokenAuth {
    /// Construct a verifier that accepts exactly `expected`.
    #[must_use]
    pub fn new(expected: impl Into<String>) -> Self {
        Self { expected: expected.into() }
    }
}

impl WsAuth for StaticTokenAuth {
    fn verify(&self, token: &str) -> bool {
        token_eq(token, &self.expected)
    }
}

/// Accepts any token. Used when no `WOPR_GATEWAY_TOKEN` is configured
/// (local, single-user deployments).
pub struct OpenAuth;

impl WsAuth for OpenAuth {
    fn verify(&self, _token: &str) -> bool {
        true
    }
}
