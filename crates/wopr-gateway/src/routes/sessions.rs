//! `/api/sessions` — session CRUD, injection, and history (§6).

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use wopr_events::{EventMetadata, WoprEvent};
use wopr_queue::InjectPayload;
use wopr_sessions::EntryKind;

use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// A session as returned to API clients.
#[derive(Debug, Serialize)]
pub struct SessionView {
    name: String,
    conversation_id: Option<String>,
    context: Option<String>,
    provider: Option<wopr_sessions::ProviderSelection>,
    created_at: Option<i64>,
}

impl From<wopr_sessions::SessionInfo> for SessionView {
    fn from(info: wopr_sessions::SessionInfo) -> Self {
        Self {
            name: info.name,
            conversation_id: info.conversation_id,
            context: info.context,
            provider: info.provider,
            created_at: info.created_at.map(|ts| ts.as_millis()),
        }
    }
}

/// `GET /api/sessions`
pub async fn list(State(state): State<AppState>) -> GatewayResult<Json<Vec<SessionView>>> {
    let sessions = state.sessions.list_sessions().await.map_err(anyhow::Error::from)?;
    Ok(Json(sessions.into_iter().map(SessionView::from).collect()))
}

/// Request body for `POST /api/sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// The new session's name.
    pub name: String,
    /// Optional system context to seed the session with.
    pub context: Option<String>,
}

/// `POST /api/sessions`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> GatewayResult<Json<SessionView>> {
    wopr_core::SessionName::parse(&body.name)
        .map_err(|error| GatewayError::Validation(error.to_string()))?;

    if let Some(context) = &body.context {
        state.sessions.set_context(&body.name, context).await.map_err(anyhow::Error::from)?;
    }

    state.events.publish(WoprEvent::SessionCreate {
        metadata: EventMetadata::new("gateway"),
        session: body.name.clone(),
    });

    let infos = state.sessions.list_sessions().await.map_err(anyhow::Error::from)?;
    let info = infos
        .into_iter()
        .find(|info| info.name == body.name)
        .unwrap_or(wopr_sessions::SessionInfo {
            name: body.name,
            conversation_id: None,
            context: None,
            provider: None,
            created_at: None,
        });
    Ok(Json(info.into()))
}

/// `GET /api/sessions/:name`
pub async fn show(State(state): State<AppState>, Path(name): Path<String>) -> GatewayResult<Json<SessionView>> {
    let infos = state.sessions.list_sessions().await.map_err(anyhow::Error::from)?;
    let info = infos
        .into_iter()
        .find(|info| info.name == name)
        .ok_or_else(|| GatewayError::NotFound(format!("no such session: {name}")))?;
    Ok(Json(info.into()))
}

/// Query params for `DELETE /api/sessions/:name`.
#[derive(Debug, Deserialize, Default)]
pub struct DestroyQuery {
    reason: Option<String>,
}

/// `DELETE /api/sessions/:name`
pub async fn destroy(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DestroyQuery>,
) -> GatewayResult<Json<Value>> {
    state
        .sessions
        .delete_session(&name, query.reason.as_deref(), &state.log, &state.events)
        .await
        .map_err(anyhow::Error::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

/// Request body for `POST /api/sessions/:name/inject`.
#[derive(Debug, Deserialize)]
pub struct InjectRequest {
    /// The raw message content (string or structured).
    pub message: Value,
    /// Who sent this injection.
    pub from: String,
    /// The originating channel, if any.
    pub channel: Option<String>,
}

/// Response shape for a successful injection.
#[derive(Debug, Serialize)]
pub struct InjectResponse {
    response: String,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// `POST /api/sessions/:name/inject`
pub async fn inject(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<InjectRequest>,
) -> GatewayResult<Json<InjectResponse>> {
    let mut payload = InjectPayload::new(body.message, body.from);
    if let Some(channel) = body.channel {
        payload = payload.with_channel(channel);
    }

    let result = state
        .queue
        .inject(&name, payload)
        .await
        .map_err(|error| gateway_error_for_queue(&error))?;

    Ok(Json(InjectResponse { response: result.response, session_id: result.conversation_id }))
}

fn gateway_error_for_queue(error: &wopr_queue::QueueError) -> GatewayError {
    match error {
        wopr_queue::QueueError::Cancelled => GatewayError::Validation("injection cancelled".to_string()),
        wopr_queue::QueueError::Failed(message) => {
            if message.to_lowercase().contains("no provider available")
                || message.to_lowercase().contains("provider")
            {
                GatewayError::ProviderUnavailable(message.clone())
            } else if message.to_lowercase().contains("idle") {
                GatewayError::IdleTimeout(message.clone())
            } else if message.to_lowercase().contains("access denied") {
                GatewayError::AccessDenied(message.clone())
            } else {
                GatewayError::Internal(anyhow::anyhow!(message.clone()))
            }
        }
        other => GatewayError::Internal(anyhow::anyhow!(other.to_string())),
    }
}

/// Request body for `POST /api/sessions/:name/log`: append without
/// calling the model.
#[derive(Debug, Deserialize)]
pub struct LogRequest {
    from: String,
    content: String,
    #[serde(default = "default_entry_kind")]
    r#type: EntryKind,
    channel: Option<String>,
}

fn default_entry_kind() -> EntryKind {
    EntryKind::Message
}

/// `POST /api/sessions/:name/log`
pub async fn append_log(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<LogRequest>,
) -> GatewayResult<Json<Value>> {
    let mut entry = wopr_sessions::ConversationEntry::new(body.from, body.content, body.r#type);
    if let Some(channel) = body.channel {
        entry = entry.with_channel(channel);
    }
    state.log.append(&name, &entry).map_err(anyhow::Error::from)?;
    Ok(Json(serde_json::json!({"ok": true})))
}

/// Query params for `GET /api/sessions/:name/history`.
#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    limit: Option<usize>,
}

/// `GET /api/sessions/:name/history`
pub async fn history(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> GatewayResult<Json<Vec<wopr_sessions::ConversationEntry>>> {
    let entries = state.log.read(&name, query.limit).map_err(anyhow::Error::from)?;
    Ok(Json(entries))
}
