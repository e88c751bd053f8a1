//! Error types for the security policy engine.

use thiserror::Error;

/// Errors raised loading or saving the persisted security policy.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// The policy file could not be read.
    #[error("failed to read security config at {path}: {source}")]
    ReadError {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The policy file could not be parsed as JSON.
    #[error("failed to parse security config at {path}: {source}")]
    ParseError {
        /// Path that failed to parse.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The policy file could not be written.
    #[error("failed to write security config at {path}: {source}")]
    WriteError {
        /// Path that failed to write.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;
