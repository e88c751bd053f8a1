//! `/api/providers` — registry introspection and health checks (§6, §4.7).

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use wopr_llm::ResolveConfig;

use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// One provider's listing entry.
#[derive(Debug, Serialize)]
pub struct ProviderView {
    id: String,
    model: Option<String>,
    available: bool,
}

/// `GET /api/providers`
pub async fn list(State(state): State<AppState>) -> Json<Vec<ProviderView>> {
    let views = state
        .providers
        .list_providers()
        .into_iter()
        .map(|id| match state.providers.resolve_provider(&ResolveConfig::single(&id)) {
            Ok(resolved) => {
                ProviderView { id, model: Some(resolved.provider.model().to_string()), available: true }
            }
            Err(_) => ProviderView { id, model: None, available: false },
        })
        .collect();
    Json(views)
}

/// `GET /api/providers/:id`
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> GatewayResult<Json<ProviderView>> {
    if !state.providers.list_providers().contains(&id) {
        return Err(GatewayError::NotFound(format!("no such provider: {id}")));
    }
    let (model, available) = match state.providers.resolve_provider(&ResolveConfig::single(&id)) {
        Ok(resolved) => (Some(resolved.provider.model().to_string()), true),
        Err(_) => (None, false),
    };
    Ok(Json(ProviderView { id, model, available }))
}

/// Registering a concrete provider requires an HTTP client
/// implementation (Anthropic/OpenAI/etc.), which is out of scope for
/// this daemon (§1 Non-goals); providers are wired in `wopr-daemon`'s
/// startup instead.
pub async fn create() -> GatewayError {
    GatewayError::Validation(
        "provider registration is not exposed over HTTP; configure providers at daemon startup".to_string(),
    )
}

/// Request body for `POST /api/providers/:id`: force an availability
/// override, bypassing the periodic health sweep.
#[derive(Debug, Deserialize)]
pub struct SetAvailableRequest {
    available: bool,
}

/// `POST /api/providers/:id`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SetAvailableRequest>,
) -> GatewayResult<Json<serde_json::Value>> {
    if !state.providers.list_providers().contains(&id) {
        return Err(GatewayError::NotFound(format!("no such provider: {id}")));
    }
    state.providers.set_available(&id, body.available);
    Ok(Json(serde_json::json!({"ok": true})))
}

/// `POST /api/providers/health-check`
pub async fn health_check(State(state): State<AppState>) -> Json<Vec<ProviderView>> {
    state.providers.check_health().await;
    list(State(state)).await
}
