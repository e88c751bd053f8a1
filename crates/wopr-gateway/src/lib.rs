//! HTTP/WebSocket gateway for the WOPR daemon (§6).
//!
//! Owns the `axum` router, the OpenAI-compatible shim, and the `/ws`
//! pub/sub fan-out. Every collaborator (queue manager, session store,
//! security policy, provider registry, scheduler, event bus) is
//! injected through [`AppState`], constructed once by `wopr-daemon`'s
//! `main`.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;

pub use error::{GatewayError, GatewayResult};
pub use router::build;
pub use state::AppState;
