//! The audit trail: a structured, append-only record of security-relevant
//! daemon activity (§3 `SecurityConfig.auditFlags`).
//!
//! Every entry names what happened ([`AuditAction`]), how it was authorized
//! ([`AuthorizationProof`]), and how it came out ([`AuditOutcome`]). Entries
//! are plain JSON lines with no signature or hash-chain fields — this is an
//! observability artifact, not a cryptographic guarantee over history.
//!
//! ```
//! use wopr_audit::{AuditAction, AuditLog, AuditOutcome, AuthorizationProof};
//! use wopr_audit::AuditEntry;
//!
//! # fn example() -> wopr_audit::AuditResult<()> {
//! let log = AuditLog::new("/tmp/wopr-example-audit/audit.jsonl");
//! log.record(&AuditEntry::new(
//!     Some("alice"),
//!     AuditAction::SessionCreated { session: "alice".to_string() },
//!     AuthorizationProof::System { reason: "startup".to_string() },
//!     AuditOutcome::success(),
//! ))?;
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

mod entry;
mod error;
mod storage;

pub use entry::{AuditAction, AuditEntry, AuditOutcome, AuthorizationProof};
pub use error::{AuditError, AuditResult};
pub use storage::AuditLog;
