//! Commonly used types for convenient import.

// Manager
pub use crate::QueueManager;

// Executor seam
pub use crate::{Executor, ExecutorError, ExecutorOutcome};

// Request/response shapes
pub use crate::{InjectPayload, InjectResult, QueueStats};

// Errors
pub use crate::{QueueError, QueueResult};
