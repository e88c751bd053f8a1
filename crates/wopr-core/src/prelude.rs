//! Prelude module - commonly used types for convenient import.
//!
//! Use `use wopr_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{CoreError, CoreResult};

// Directory layout
pub use crate::WoprHome;

// Shared data-model primitives
pub use crate::{InjectionSource, InjectionSourceKind, SessionName, Timestamp, TrustLevel};
