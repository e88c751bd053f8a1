//! OpenAI-compatible chat-completions shim (§6).
//!
//! Accepts the same request shape as `POST /v1/chat/completions`,
//! creates an ephemeral session for the duration of the call, routes
//! it through the normal injection pipeline (so context assembly,
//! middleware, and security still apply), and renders the response as
//! either a single JSON body or a `chat.completion.chunk` SSE stream.
//! Streaming is built by forwarding the [`wopr_events::WoprEvent::SessionResponseChunk`]
//! events the executor publishes while the injection is in flight —
//! the same events `/ws` fans out to subscribers — rather than talking
//! to a provider directly.
//!
//! Grounded on `sblanchard-SerialAgent`'s `api/openai_compat.rs`
//! (ephemeral-session-per-request, blocking/streaming split, an
//! owned-by-value SSE stream builder), with the `chat.completion.chunk`
//! JSON shape itself taken from `querymt-querymt`'s
//! `crates/service/src/main.rs` rendering loop.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use wopr_core::{InjectionSource, InjectionSourceKind};
use wopr_events::{Topic, WoprEvent};
use wopr_queue::InjectPayload;
use wopr_sessions::ProviderSelection;

use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// One message in an OpenAI-style chat request.
#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    role: String,
    content: String,
}

/// `POST /v1/chat/completions` request body.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(default)]
    stream: bool,
}

/// One entry in `GET /v1/models`.
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    id: String,
    object: &'static str,
    owned_by: &'static str,
}

/// `GET /v1/models`
pub async fn list_models(State(state): State<AppState>) -> Json<Value> {
    let data: Vec<ModelInfo> = state
        .providers
        .list_providers()
        .into_iter()
        .map(|id| ModelInfo { id, object: "model", owned_by: "wopr" })
        .collect();
    Json(json!({"object": "list", "data": data}))
}

/// `GET /v1/models/:id`
pub async fn show_model(
    State(state): State<AppState>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> GatewayResult<Json<ModelInfo>> {
    if !state.providers.list_providers().contains(&id) {
        return Err(GatewayError::NotFound(format!("no such model: {id}")));
    }
    Ok(Json(ModelInfo { id, object: "model", owned_by: "wopr" }))
}

/// `POST /v1/chat/completions`
pub async fn chat_completions(
    State(state): State<AppState>,
    Json(request): Json<ChatCompletionsRequest>,
) -> GatewayResult<Response> {
    let session = format!("openai-{}", Uuid::new_v4());
    wopr_core::SessionName::parse(&session).map_err(|error| GatewayError::Internal(anyhow::anyhow!(error)))?;

    let system_text = request
        .messages
        .iter()
        .filter(|message| message.role == "system")
        .map(|message| message.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    if !system_text.is_empty() {
        state.sessions.set_context(&session, &system_text).await.map_err(anyhow::Error::from)?;
    }

    let last_message = request
        .messages
        .iter()
        .rev()
        .find(|message| message.role != "system")
        .ok_or_else(|| GatewayError::Validation("no user or assistant message in request".to_string()))?
        .content
        .clone();

    let provider_name = resolve_model_to_provider(&state, &request.model).await?;
    state
        .sessions
        .set_provider(
            &session,
            &ProviderSelection { name: provider_name, model: Some(request.model.clone()), fallback: Vec::new() },
        )
        .await
        .map_err(anyhow::Error::from)?;

    let source = InjectionSource {
        kind: InjectionSourceKind::Api,
        origin: "openai-compat".to_string(),
        granted_capabilities: Vec::new(),
        trust_override: None,
    };
    let payload = InjectPayload::new(Value::String(last_message), "openai-compat".to_string()).with_source(source);

    let id = format!("chatcmpl-{}", Uuid::new_v4());
    let created = chrono::Utc::now().timestamp();
    let model = request.model.clone();

    if request.stream {
        Ok(stream_response(state, session, payload, id, created, model).into_response())
    } else {
        let result = state.queue.inject(&session, payload).await;
        let _ = state.sessions.delete_session(&session, Some("openai-compat ephemeral session"), &state.log, &state.events).await;
        let result = result.map_err(|error| GatewayError::Internal(anyhow::anyhow!(error.to_string())))?;
        Ok(Json(json!({
            "id": id,
            "object": "chat.completion",
            "created": created,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": result.response},
                "finish_reason": "stop",
            }],
        }))
        .into_response())
    }
}

async fn resolve_model_to_provider(state: &AppState, model: &str) -> GatewayResult<String> {
    let providers = state.providers.list_providers();
    if providers.iter().any(|id| id == model) {
        return Ok(model.to_string());
    }
    for id in providers {
        if state.providers.resolve_provider(&wopr_llm::ResolveConfig::single(&id)).is_ok() {
            return Ok(id);
        }
    }
    Err(GatewayError::ProviderUnavailable(format!("no provider available for model '{model}'")))
}

/// Deletes the ephemeral OpenAI-compat session exactly once, however the
/// SSE stream ends: normal completion, an error, or the client dropping
/// the connection mid-stream. The deletion itself runs on a detached
/// task since `Drop` can't `.await`.
struct SessionCleanupGuard {
    state: AppState,
    session: String,
}

impl Drop for SessionCleanupGuard {
    fn drop(&mut self) {
        let state = self.state.clone();
        let session = std::mem::take(&mut self.session);
        tokio::spawn(async move {
            let _ = state.sessions.delete_session(&session, Some("openai-compat ephemeral session"), &state.log, &state.events).await;
        });
    }
}

fn stream_response(
    state: AppState,
    session: String,
    payload: InjectPayload,
    id: String,
    created: i64,
    model: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let topic = Topic::session_scoped(&session, "logs");
    let mut events = state.events.subscribe();

    let stream = async_stream::stream! {
        let _cleanup = SessionCleanupGuard { state: state.clone(), session: session.clone() };
        let inject = state.queue.inject(&session, payload);
        tokio::pin!(inject);
        let mut finished = false;

        loop {
            tokio::select! {
                biased;
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if let WoprEvent::SessionResponseChunk { text, .. } = event.as_ref() {
                        if event.topic().as_str() == topic.as_str() {
                            yield Ok(Event::default().data(json!({
                                "id": id,
                                "object": "chat.completion.chunk",
                                "created": created,
                                "model": model,
                                "choices": [{"index": 0, "delta": {"content": text}, "finish_reason": null}],
                            }).to_string()));
                        }
                    }
                }
                result = &mut inject, if !finished => {
                    finished = true;
                    let finish_reason = match result {
                        Ok(_) => "stop",
                        Err(_) => "stop",
                    };
                    yield Ok(Event::default().data(json!({
                        "id": id,
                        "object": "chat.completion.chunk",
                        "created": created,
                        "model": model,
                        "choices": [{"index": 0, "delta": {}, "finish_reason": finish_reason}],
                    }).to_string()));
                    yield Ok(Event::default().data("[DONE]"));
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keep-alive"))
}
