//! The executor seam (§4.6) that the queue manager drives.

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::types::{InjectPayload, InjectResult};

/// Implemented by the injection executor (§4.6) and wired into the queue
/// manager exactly once at startup via [`crate::QueueManager::set_executor`].
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run one injection to completion.
    ///
    /// Implementations must poll `abort` between stream messages and at
    /// every yield point, returning [`ExecutorError::Cancelled`] promptly
    /// once it is triggered, and must attempt to close any underlying
    /// provider stream on the way out. The queue manager never preempts;
    /// cooperative cancellation is the whole mechanism.
    async fn execute(
        &self,
        session: &str,
        payload: InjectPayload,
        abort: CancellationToken,
    ) -> ExecutorOutcome;
}

/// The executor's verdict for one injection.
pub type ExecutorOutcome = Result<InjectResult, ExecutorError>;

/// Why an executor call did not produce a result.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// The injection's abort handle was triggered.
    #[error("injection cancelled")]
    Cancelled,
    /// The executor failed for a reason other than cancellation.
    #[error("{0}")]
    Failed(String),
}
