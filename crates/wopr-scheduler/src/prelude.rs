//! Commonly used types for convenient import.

// Scheduler
pub use crate::{Scheduler, DEFAULT_TICK_INTERVAL};

// Triggers and storage
pub use crate::{CronTrigger, OneShotTrigger, Trigger, TriggerStore};

// Errors
pub use crate::{SchedulerError, SchedulerResult};
