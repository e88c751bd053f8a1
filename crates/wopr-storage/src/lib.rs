//! WOPR Storage — the key-value persistence layer backing the daemon's
//! durable state.
//!
//! Provides [`KvStore`]: an async, namespaced, byte-level `get`/`set`/
//! `delete` trait with two implementations — [`MemoryKvStore`] (tests,
//! ephemeral state) and [`FileKvStore`] (one file per key under a root
//! directory, the shape credential storage, scheduler trigger state, and
//! the security policy file all use).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod error;
pub mod kv;

pub use error::{StorageError, StorageResult};
pub use kv::{FileKvStore, KvStore, MemoryKvStore};
