//! WOPR Core - shared types, errors, and directory layout for the WOPR
//! daemon.
//!
//! This crate provides:
//! - Cross-cutting error types ([`error::CoreError`])
//! - The session name, timestamp, trust level, and injection source
//!   primitives every other crate builds on ([`types`])
//! - Resolution of the daemon's home directory layout ([`dirs::WoprHome`])

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod dirs;
pub mod error;
pub mod prelude;
pub mod types;

pub use dirs::WoprHome;
pub use error::{CoreError, CoreResult};
pub use types::{InjectionSource, InjectionSourceKind, SessionName, Timestamp, TrustLevel};
