//! Commonly used types for convenient import.
//!
//! ```
//! use wopr_audit::prelude::*;
//!
//! # fn example() -> AuditResult<()> {
//! let log = AuditLog::new("/tmp/wopr-example-audit/audit.jsonl");
//! log.record(&AuditEntry::new(
//!     Some("alice"),
//!     AuditAction::ConfigReloaded,
//!     AuthorizationProof::System { reason: "sighup".to_string() },
//!     AuditOutcome::success(),
//! ))?;
//! # Ok(())
//! # }
//! ```

// Entry types
pub use crate::{AuditAction, AuditEntry, AuditOutcome, AuthorizationProof};

// Storage
pub use crate::AuditLog;

// Errors
pub use crate::{AuditError, AuditResult};
