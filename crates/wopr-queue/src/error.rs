//! Queue manager errors.

use thiserror::Error;

/// Errors the queue manager can produce.
#[derive(Debug, Error)]
pub enum QueueError {
    /// [`crate::QueueManager::set_executor`] was called more than once.
    #[error("executor already set")]
    ExecutorAlreadySet,

    /// `inject` was called before `set_executor`.
    #[error("no executor set; call set_executor before the first inject")]
    ExecutorNotSet,

    /// The injection was cancelled via `cancel_active` before it completed.
    #[error("injection cancelled")]
    Cancelled,

    /// The executor failed.
    #[error("executor failed: {0}")]
    Failed(String),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;
