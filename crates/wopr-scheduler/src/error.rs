//! Scheduler errors (§4.10).

use thiserror::Error;

/// Errors the scheduler's store and tick loop can produce.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A cron expression failed to parse.
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidCronExpression {
        /// The expression as supplied by the caller.
        expression: String,
        /// Why `cron` rejected it.
        reason: String,
    },

    /// No trigger exists under the given name.
    #[error("no trigger named '{name}'")]
    NotFound {
        /// The trigger name looked up.
        name: String,
    },

    /// The backing key-value store failed.
    #[error(transparent)]
    Storage(#[from] wopr_storage::StorageError),
}

/// Result alias for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;
