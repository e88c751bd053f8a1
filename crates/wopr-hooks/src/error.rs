//! Error types for the context-assembly pipeline and middleware chain.

use thiserror::Error;

/// Error surfaced by a context provider or middleware callback.
///
/// Neither registry ever propagates this upward: a provider error is
/// logged and recorded as a warning, and a middleware error is logged
/// and treated as "did nothing".
#[derive(Debug, Error)]
pub enum HookError {
    /// A context provider failed to produce a contribution.
    #[error("context provider failed: {0}")]
    Provider(String),
    /// A middleware callback failed.
    #[error("middleware failed: {0}")]
    Middleware(String),
}
