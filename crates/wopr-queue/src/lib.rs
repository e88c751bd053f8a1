//! The session queue manager (§4.3): single-threaded cooperative execution
//! per session, parallel across sessions.
//!
//! ```
//! use std::sync::Arc;
//! use wopr_events::EventBus;
//! use wopr_queue::{Executor, ExecutorError, ExecutorOutcome, InjectPayload, InjectResult, QueueManager};
//! use tokio_util::sync::CancellationToken;
//!
//! struct Echo;
//!
//! #[async_trait::async_trait]
//! impl Executor for Echo {
//!     async fn execute(&self, _session: &str, payload: InjectPayload, _abort: CancellationToken) -> ExecutorOutcome {
//!         Ok(InjectResult::new(payload.from, None))
//!     }
//! }
//!
//! # async fn example() -> wopr_queue::QueueResult<()> {
//! let manager = QueueManager::new(Arc::new(EventBus::new()));
//! manager.set_executor(Arc::new(Echo))?;
//! let result = manager.inject("alice", InjectPayload::new(serde_json::Value::Null, "cli")).await?;
//! assert_eq!(result.response, "cli");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod executor;
mod manager;
mod types;

pub use error::{QueueError, QueueResult};
pub use executor::{Executor, ExecutorError, ExecutorOutcome};
pub use manager::QueueManager;
pub use types::{InjectPayload, InjectResult, QueueStats};
