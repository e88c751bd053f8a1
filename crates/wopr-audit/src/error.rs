//! Audit-related error types.

use thiserror::Error;

/// Errors that can occur with audit logging.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The audit log file could not be written or read.
    #[error("audit log I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored line did not parse as an [`crate::AuditEntry`].
    #[error("audit entry serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
