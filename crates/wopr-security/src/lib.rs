//! The security policy engine: trust levels, dotted capability strings,
//! and the session/tool/forwarding access checks built on top of them.
//!
//! # Example
//!
//! ```
//! use wopr_core::{InjectionSource, InjectionSourceKind};
//! use wopr_security::{PolicyEngine, SecurityConfig};
//!
//! let engine = PolicyEngine::new(SecurityConfig::permissive());
//! let source = InjectionSource {
//!     kind: InjectionSourceKind::Api,
//!     origin: "some-api-key".to_string(),
//!     granted_capabilities: Vec::new(),
//!     trust_override: None,
//! };
//!
//! assert!(engine.check_capability(&source, "inject.tools").allowed);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod loader;
mod policy;
mod types;

pub use error::{SecurityError, SecurityResult};
pub use loader::{load, save, security_file_path, SECURITY_FILE_NAME};
pub use policy::{default_trust_level, has_capability, PolicyEngine};
pub use types::{
    CheckOutcome, ForwardRules, GlobalDefaults, RateLimit, ResolvedPolicy, SandboxSettings,
    SecurityConfig, SessionFilter, SessionOverride, TrustPolicy,
};
