//! `/api/capabilities` — security policy introspection and per-session
//! capability activation, rate-limited at 10/min (§6, §4.8).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use wopr_security::SecurityConfig;

use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// `GET /api/capabilities`
pub async fn show(State(state): State<AppState>) -> Json<SecurityConfig> {
    Json(state.security.config_snapshot())
}

/// `POST /api/capabilities`: replace the whole policy document.
pub async fn replace(State(state): State<AppState>, Json(config): Json<SecurityConfig>) -> Json<serde_json::Value> {
    state.security.replace_config(config);
    Json(serde_json::json!({"ok": true}))
}

/// Request body shared by activate/deactivate.
#[derive(Debug, Deserialize)]
pub struct CapabilityToggleRequest {
    /// The session whose capability override is being changed.
    pub session: String,
    /// The capability name to add or remove.
    pub capability: String,
}

/// `POST /api/capabilities/activate`
pub async fn activate(
    State(state): State<AppState>,
    Json(body): Json<CapabilityToggleRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    if !state.capability_limiter.try_request(&body.session) {
        return Err(GatewayError::RateLimited(format!(
            "session '{}' has exceeded the capability-toggle rate limit",
            body.session
        )));
    }
    let mut capabilities = session_capabilities(&state, &body.session);
    if !capabilities.contains(&body.capability) {
        capabilities.push(body.capability);
    }
    state.security.set_session_capabilities(&body.session, capabilities);
    Ok(Json(serde_json::json!({"ok": true})))
}

/// `POST /api/capabilities/deactivate`
pub async fn deactivate(
    State(state): State<AppState>,
    Json(body): Json<CapabilityToggleRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    if !state.capability_limiter.try_request(&body.session) {
        return Err(GatewayError::RateLimited(format!(
            "session '{}' has exceeded the capability-toggle rate limit",
            body.session
        )));
    }
    let mut capabilities = session_capabilities(&state, &body.session);
    capabilities.retain(|held| held != &body.capability);
    state.security.set_session_capabilities(&body.session, capabilities);
    Ok(Json(serde_json::json!({"ok": true})))
}

fn session_capabilities(state: &AppState, session: &str) -> Vec<String> {
    state
        .security
        .config_snapshot()
        .session_overrides
        .get(session)
        .map(|over| over.capabilities.clone())
        .unwrap_or_default()
}
