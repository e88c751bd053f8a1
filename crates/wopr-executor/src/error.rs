//! Executor errors (§4.6).

use thiserror::Error;

/// Errors the injection executor can produce internally.
///
/// The `wopr_queue::Executor` impl collapses this into the queue's own
/// two-variant error (cancelled or failed); this richer enum exists so
/// tests and the audit trail can distinguish failure causes.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Session access was denied under `enforce` enforcement.
    #[error("security check denied for session '{session}': {reason}")]
    SecurityDenied {
        /// The session the injection targeted.
        session: String,
        /// Why access was denied.
        reason: String,
    },

    /// No provider in the resolution chain was available.
    #[error("no provider available for session '{session}'")]
    NoProviderAvailable {
        /// The session the injection targeted.
        session: String,
    },

    /// The provider stream produced an error that was not the stale-resume
    /// signature, or was but no retry was available.
    #[error("provider stream failed for session '{session}': {message}")]
    ProviderStream {
        /// The session the injection targeted.
        session: String,
        /// The provider's error message.
        message: String,
    },

    /// No stream event arrived within the idle-timeout window.
    #[error("injection idle-timed-out for session '{session}'")]
    IdleTimeout {
        /// The session the injection targeted.
        session: String,
    },

    /// The injection's abort handle fired.
    #[error("injection cancelled")]
    Cancelled,

    /// The session store failed.
    #[error(transparent)]
    Session(#[from] wopr_sessions::SessionError),

    /// The audit trail failed to record an entry.
    #[error(transparent)]
    Audit(#[from] wopr_audit::AuditError),
}

/// Result alias for executor operations.
pub type ExecutorResult<T> = Result<T, ExecutorError>;
