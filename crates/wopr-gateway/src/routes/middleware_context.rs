//! `/api/middleware` and `/api/context` — priority/enable toggles over
//! the two hook registries (§6, §4.5, §4.4).

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use wopr_hooks::{ContextProviderInfo, MiddlewareInfo};

use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// Request body for toggling priority/enabled state on a named hook.
#[derive(Debug, Deserialize)]
pub struct HookUpdateRequest {
    /// The registered hook name.
    pub name: String,
    /// New enabled state, if changing it.
    pub enabled: Option<bool>,
    /// New priority, if changing it.
    pub priority: Option<i32>,
}

/// `GET /api/middleware`
pub async fn list_middleware(State(state): State<AppState>) -> Json<Vec<MiddlewareInfo>> {
    Json(state.middleware.list())
}

/// `POST /api/middleware`
pub async fn update_middleware(
    State(state): State<AppState>,
    Json(body): Json<HookUpdateRequest>,
) -> GatewayResult<Json<Vec<MiddlewareInfo>>> {
    apply_update(&body, |enabled| state.middleware.set_enabled(&body.name, enabled), |priority| {
        state.middleware.set_priority(&body.name, priority)
    })?;
    Ok(Json(state.middleware.list()))
}

/// `GET /api/context`
pub async fn list_context(State(state): State<AppState>) -> Json<Vec<ContextProviderInfo>> {
    Json(state.context.list())
}

/// `POST /api/context`
pub async fn update_context(
    State(state): State<AppState>,
    Json(body): Json<HookUpdateRequest>,
) -> GatewayResult<Json<Vec<ContextProviderInfo>>> {
    apply_update(&body, |enabled| state.context.set_enabled(&body.name, enabled), |priority| {
        state.context.set_priority(&body.name, priority)
    })?;
    Ok(Json(state.context.list()))
}

fn apply_update(
    body: &HookUpdateRequest,
    set_enabled: impl FnOnce(bool) -> bool,
    set_priority: impl FnOnce(i32) -> bool,
) -> GatewayResult<()> {
    if let Some(enabled) = body.enabled {
        if !set_enabled(enabled) {
            return Err(GatewayError::NotFound(format!("no such hook: {}", body.name)));
        }
    }
    if let Some(priority) = body.priority {
        if !set_priority(priority) {
            return Err(GatewayError::NotFound(format!("no such hook: {}", body.name)));
        }
    }
    Ok(())
}
