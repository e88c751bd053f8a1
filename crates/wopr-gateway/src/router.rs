//! Builds the single [`axum::Router`] the daemon serves (§6).
//!
//! Grounded on `sblanchard-SerialAgent`'s `api/mod.rs` router
//! assembly: routes are declared flat against [`AppState`] and merged
//! into one tree, with a permissive CORS layer and request tracing
//! applied over the whole thing (this daemon has no separate
//! public/protected split — every route is reachable, and the security
//! policy engine gates what an injection is actually allowed to do).

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::{capabilities, crons, middleware_context, openai_compat, providers, sessions};
use crate::state::AppState;
use crate::ws::ws_handler;

/// Construct the daemon's full HTTP/WebSocket router.
#[must_use]
pub fn build(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/sessions", get(sessions::list).post(sessions::create))
        .route("/api/sessions/:name", get(sessions::show).delete(sessions::destroy))
        .route("/api/sessions/:name/inject", post(sessions::inject))
        .route("/api/sessions/:name/log", post(sessions::append_log))
        .route("/api/sessions/:name/history", get(sessions::history))
        .route("/api/providers", get(providers::list).post(providers::create))
        .route("/api/providers/health-check", post(providers::health_check))
        .route("/api/providers/:id", get(providers::show).post(providers::update))
        .route("/api/crons", get(crons::list).post(crons::create))
        .route("/api/crons/:name", get(crons::show).delete(crons::destroy))
        .route("/api/middleware", get(middleware_context::list_middleware).post(middleware_context::update_middleware))
        .route("/api/context", get(middleware_context::list_context).post(middleware_context::update_context))
        .route("/api/capabilities", get(capabilities::show).post(capabilities::replace))
        .route("/api/capabilities/activate", post(capabilities::activate))
        .route("/api/capabilities/deactivate", post(capabilities::deactivate));

    let openai = Router::new()
        .route("/v1/chat/completions", post(openai_compat::chat_completions))
        .route("/v1/models", get(openai_compat::list_models))
        .route("/v1/models/:id", get(openai_compat::show_model));

    Router::new()
        .merge(api)
        .merge(openai)
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
