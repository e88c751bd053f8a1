//! The `/ws` WebSocket endpoint: handshake, auth, topic subscription,
//! heartbeat, and backpressure (§4.9).
//!
//! Grounded on `sblanchard-SerialAgent`'s `nodes/ws.rs` handshake/writer
//! split, generalized from a single-hello node-registration protocol to
//! spec.md's pub/sub subscribe/unsubscribe-by-topic protocol. The
//! heartbeat and backpressure reset run as one hub-wide tick (started
//! once in `wopr-daemon`'s `main`) rather than per connection, so every
//! client's counters reset on the same cadence.

mod auth;
mod hub;
mod messages;

pub use auth::{OpenAuth, StaticTokenAuth, WsAuth};
pub use hub::{SubscriptionStats, WsHub};
pub use messages::{ClientMessage, ServerMessage};

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use wopr_events::EventBus;

use crate::state::AppState;
use hub::OUTBOUND_CHANNEL_CAPACITY;

/// `GET /ws` upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let id = Uuid::new_v4();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_CHANNEL_CAPACITY);

    let cancel = state.ws.register(id, outbound_tx.clone(), Utc::now().timestamp_millis());

    let writer = tokio::spawn(async move {
        while let Some(text) = outbound_rx.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let _ = outbound_tx.try_send(ServerMessage::Connected.to_json());

    let mut authenticated = false;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            frame = stream.next() => {
                let Some(frame) = frame else { break };
                let Ok(frame) = frame else { break };
                match frame {
                    Message::Text(text) => {
                        state.ws.touch(id, Utc::now().timestamp_millis());
                        handle_client_message(&state, id, &outbound_tx, &mut authenticated, &text);
                    }
                    Message::Ping(_) | Message::Pong(_) => {
                        state.ws.touch(id, Utc::now().timestamp_millis());
                    }
                    Message::Close(_) => break,
                    Message::Binary(_) => {}
                }
            }
        }
    }

    writer.abort();
    state.ws.remove(id);
    debug!(client = %id, "ws client disconnected");
}

fn handle_client_message(
    state: &AppState,
    id: Uuid,
    outbound_tx: &mpsc::Sender<String>,
    authenticated: &mut bool,
    text: &str,
) {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(error) => {
            let _ = outbound_tx.try_send(
                ServerMessage::Error { message: format!("malformed message: {error}"), code: None }.to_json(),
            );
            return;
        }
    };

    match message {
        ClientMessage::Auth { token } => {
            *authenticated = state.ws_auth.verify(&token);
            if !*authenticated {
                let _ = outbound_tx
                    .try_send(ServerMessage::Error { message: "Invalid token".to_string(), code: None }.to_json());
            }
        }
        ClientMessage::Subscribe(request) => {
            if !*authenticated {
                let _ = outbound_tx.try_send(
                    ServerMessage::Error { message: "Not authenticated".to_string(), code: None }.to_json(),
                );
                return;
            }
            let patterns = request.into_patterns();
            let added = state.ws.subscribe(id, patterns);
            let _ = outbound_tx.try_send(ServerMessage::Subscribed { topics: added }.to_json());
        }
        ClientMessage::Unsubscribe(request) => {
            if !*authenticated {
                let _ = outbound_tx.try_send(
                    ServerMessage::Error { message: "Not authenticated".to_string(), code: None }.to_json(),
                );
                return;
            }
            let patterns = request.into_patterns();
            let removed = state.ws.unsubscribe(id, &patterns);
            let _ = outbound_tx.try_send(ServerMessage::Unsubscribed { topics: removed }.to_json());
        }
        ClientMessage::Ping => {
            let _ = outbound_tx.try_send(ServerMessage::Pong.to_json());
        }
    }
}

/// Spawn the hub-wide heartbeat loop: pings every connected client every
/// `interval`, disconnecting anyone idle past `timeout` or over
/// `backpressure_threshold` queued events since the last tick.
pub fn spawn_heartbeat(
    hub: Arc<WsHub>,
    interval: Duration,
    timeout: Duration,
    backpressure_threshold: usize,
) -> tokio::task::JoinHandle<()> {
    let timeout_ms = i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            hub.heartbeat_tick(Utc::now().timestamp_millis(), timeout_ms, backpressure_threshold);
        }
    })
}

/// Spawn the single subscriber that forwards every published
/// [`WoprEvent`] to the clients whose subscriptions match its topic.
pub fn spawn_event_forwarder(hub: Arc<WsHub>, events: Arc<EventBus>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut receiver = events.subscribe();
        while let Some(event) = receiver.recv().await {
            let topic = event.topic();
            let data = serde_json::to_value(event.as_ref()).unwrap_or(serde_json::Value::Null);
            let payload = ServerMessage::Event { topic: topic.as_str().to_string(), data }.to_json();
            hub.fan_out(&topic, &payload);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_create_event_routes_to_session_topic() {
        let event = wopr_events::WoprEvent::SessionCreate {
            metadata: wopr_events::EventMetadata::new("test"),
            session: "alice".to_string(),
        };
        assert_eq!(event.topic().as_str(), "session:alice");
    }
}
