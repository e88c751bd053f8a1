//! Cron and one-shot trigger scheduling (§4.10).
//!
//! Triggers are persisted through a [`wopr_storage::KvStore`] and checked
//! once a minute; a fired trigger injects into its target session with
//! source `scheduler` (owner trust). One-shot triggers and `once`-marked
//! cron triggers are removed after their first fire. Missed ticks during
//! downtime are never replayed.
//!
//! ```
//! use std::sync::Arc;
//! use wopr_audit::AuditLog;
//! use wopr_events::EventBus;
//! use wopr_queue::QueueManager;
//! use wopr_scheduler::{OneShotTrigger, Scheduler, Trigger, TriggerStore};
//! use wopr_storage::MemoryKvStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = Arc::new(QueueManager::new(Arc::new(EventBus::new())));
//! let store = Arc::new(TriggerStore::new(Arc::new(MemoryKvStore::new())));
//! let audit = Arc::new(AuditLog::new("/tmp/wopr-example-scheduler/audit.jsonl"));
//! let scheduler = Scheduler::new(store, queue, audit);
//!
//! scheduler
//!     .add_trigger(Trigger::OneShot(OneShotTrigger {
//!         name: "reminder".to_string(),
//!         fire_at_ms: 0,
//!         session: "alice".to_string(),
//!         message: serde_json::json!("wake up"),
//!         channel: None,
//!     }))
//!     .await?;
//! let fired = scheduler.tick(chrono::Utc::now()).await?;
//! assert_eq!(fired, vec!["reminder".to_string()]);
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
mod scheduler;
mod store;
mod types;

pub use error::{SchedulerError, SchedulerResult};
pub use scheduler::{Scheduler, DEFAULT_TICK_INTERVAL};
pub use store::TriggerStore;
pub use types::{CronTrigger, OneShotTrigger, Trigger};
