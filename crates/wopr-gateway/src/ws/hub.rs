//! Client registry, subscription bookkeeping, and the single heartbeat
//! tick for the `/ws` pub/sub fan-out (§4.9).

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::RwLock;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use wopr_events::Topic;

/// Default bound on a client's outbound message channel.
pub const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

/// Stats surfaced by the gateway's observability API.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct SubscriptionStats {
    /// Currently connected clients.
    pub clients: usize,
    /// Sum of every client's subscription count.
    pub total_subscriptions: usize,
    /// Clients whose backpressure counter exceeded the threshold on the
    /// most recent heartbeat tick.
    pub backpressured: usize,
}

struct ClientEntry {
    sender: mpsc::Sender<String>,
    subscriptions: Vec<String>,
    /// Incremented on every queued send since the last heartbeat tick.
    backpressure: AtomicUsize,
    /// Epoch millis of the last message received from this client.
    last_activity_ms: AtomicI64,
    /// Cancelled when the hub disconnects this client (timeout,
    /// backpressure, send failure), so the connection's reader task can
    /// stop without polling the hub itself.
    cancel: CancellationToken,
}

/// The live registry of connected WebSocket clients.
#[derive(Default)]
pub struct WsHub {
    clients: RwLock<HashMap<Uuid, ClientEntry>>,
}

impl WsHub {
    /// Construct an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly connected, not-yet-authenticated client at
    /// `now_ms`. Returns a token cancelled when the hub later
    /// disconnects this client.
    pub fn register(&self, id: Uuid, sender: mpsc::Sender<String>, now_ms: i64) -> CancellationToken {
        let cancel = CancellationToken::new();
        let mut clients = self.clients.write().expect("ws hub lock poisoned");
        clients.insert(
            id,
            ClientEntry {
                sender,
                subscriptions: Vec::new(),
                backpressure: AtomicUsize::new(0),
                last_activity_ms: AtomicI64::new(now_ms),
                cancel: cancel.clone(),
            },
        );
        cancel
    }

    /// Remove a client (disconnect, send failure, or heartbeat
    /// eviction), cancelling its token so its connection task exits.
    pub fn remove(&self, id: Uuid) {
        let mut clients = self.clients.write().expect("ws hub lock poisoned");
        if let Some(entry) = clients.remove(&id) {
            entry.cancel.cancel();
        }
    }

    /// Record that a client sent a message at `now_ms` (resets its
    /// idle-timeout clock).
    pub fn touch(&self, id: Uuid, now_ms: i64) {
        let clients = self.clients.read().expect("ws hub lock poisoned");
        if let Some(entry) = clients.get(&id) {
            entry.last_activity_ms.store(now_ms, Ordering::Relaxed);
        }
    }

    /// Add subscription patterns for a client, deduplicating against its
    /// existing set. Returns the patterns actually added.
    pub fn subscribe(&self, id: Uuid, patterns: Vec<String>) -> Vec<String> {
        let mut clients = self.clients.write().expect("ws hub lock poisoned");
        let Some(entry) = clients.get_mut(&id) else { return Vec::new() };
        let mut added = Vec::new();
        for pattern in patterns {
            if !entry.subscriptions.contains(&pattern) {
                entry.subscriptions.push(pattern.clone());
                added.push(pattern);
            }
        }
        added
    }

    /// Remove subscription patterns for a client. Returns the patterns
    /// actually removed.
    pub fn unsubscribe(&self, id: Uuid, patterns: &[String]) -> Vec<String> {
        let mut clients = self.clients.write().expect("ws hub lock poisoned");
        let Some(entry) = clients.get_mut(&id) else { return Vec::new() };
        let mut removed = Vec::new();
        entry.subscriptions.retain(|existing| {
            if patterns.contains(existing) {
                removed.push(existing.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Publish `payload` (pre-serialized) to every client subscribed to
    /// `topic`. Clients whose outbound channel is full count toward
    /// backpressure; clients whose channel is closed are dropped
    /// immediately (send failure).
    pub fn fan_out(&self, topic: &Topic, payload: &str) {
        let dead: Vec<Uuid> = {
            let clients = self.clients.read().expect("ws hub lock poisoned");
            let mut dead = Vec::new();
            for (id, entry) in clients.iter() {
                if !entry.subscriptions.iter().any(|pattern| topic.matches(pattern)) {
                    continue;
                }
                entry.backpressure.fetch_add(1, Ordering::Relaxed);
                if entry.sender.try_send(payload.to_string()).is_err() {
                    dead.push(*id);
                }
            }
            dead
        };
        for id in dead {
            self.remove(id);
        }
    }

    /// Send one pre-serialized message to a single client, bypassing
    /// topic matching (used for `connected`/`subscribed`/`error`
    /// acknowledgements).
    pub fn send_to(&self, id: Uuid, payload: String) {
        let clients = self.clients.read().expect("ws hub lock poisoned");
        if let Some(entry) = clients.get(&id) {
            let _ = entry.sender.try_send(payload);
        }
    }

    /// Run one heartbeat tick at `now_ms`: disconnect clients idle past
    /// `timeout_ms`, disconnect clients whose backpressure counter
    /// exceeded `backpressure_threshold` since the last tick, and ping
    /// everyone else. Counters are reset for every surviving client.
    pub fn heartbeat_tick(&self, now_ms: i64, timeout_ms: i64, backpressure_threshold: usize) {
        let mut timed_out = Vec::new();
        let mut backpressured = Vec::new();
        {
            let clients = self.clients.read().expect("ws hub lock poisoned");
            for (id, entry) in clients.iter() {
                if now_ms - entry.last_activity_ms.load(Ordering::Relaxed) > timeout_ms {
                    timed_out.push(*id);
                    continue;
                }
                let count = entry.backpressure.swap(0, Ordering::Relaxed);
                if count > backpressure_threshold {
                    backpressured.push(*id);
                } else {
                    let _ = entry.sender.try_send("{\"type\":\"ping\"}".to_string());
                }
            }
        }
        for id in timed_out {
            self.send_to(id, crate::ws::messages::ServerMessage::Error {
                message: "client timed out".to_string(),
                code: Some("CLIENT_TIMEOUT".to_string()),
            }.to_json());
            self.remove(id);
        }
        for id in backpressured {
            self.send_to(id, crate::ws::messages::ServerMessage::Error {
                message: "backpressure threshold exceeded".to_string(),
                code: Some("BACKPRESSURE_DISCONNECT".to_string()),
            }.to_json());
            self.remove(id);
        }
    }

    /// Current connected client count.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.read().expect("ws hub lock poisoned").len()
    }

    /// Aggregate subscription stats for the observability API.
    #[must_use]
    pub fn subscription_stats(&self, backpressure_threshold: usize) -> SubscriptionStats {
        let clients = self.clients.read().expect("ws hub lock poisoned");
        let total_subscriptions = clients.values().map(|entry| entry.subscriptions.len()).sum();
        let backpressured = clients
            .values()
            .filter(|entry| entry.backpressure.load(Ordering::Relaxed) > backpressure_threshold)
            .count();
        SubscriptionStats { clients: clients.len(), total_subscriptions, backpressured }
    }
}

/// Constant-time comparison of a presented token against the configured
/// secret, hashing both sides first so the comparison itself never
/// leaks length via early-exit timing on the raw bytes.
#[must_use]
pub fn token_eq(presented: &str, expected: &str) -> bool {
    let presented_digest = Sha256::digest(presented.as_bytes());
    let expected_digest = Sha256::digest(expected.as_bytes());
    presented_digest.ct_eq(&expected_digest).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribe_dedupes_and_fan_out_matches_topic() {
        let hub = WsHub::new();
        let id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(id, tx, 0);

        let added = hub.subscribe(id, vec!["session:alice".to_string(), "session:alice".to_string()]);
        assert_eq!(added, vec!["session:alice".to_string()]);

        hub.fan_out(&Topic::session("alice"), "hello");
        assert_eq!(rx.recv().await, Some("hello".to_string()));

        hub.fan_out(&Topic::session("bob"), "nope");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_heartbeat_disconnects_idle_client() {
        let hub = WsHub::new();
        let id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(8);
        let cancel = hub.register(id, tx, 0);

        hub.heartbeat_tick(100_000, 90_000, usize::MAX);
        assert!(cancel.is_cancelled());
        assert_eq!(hub.client_count(), 0);
    }

    #[test]
    fn test_heartbeat_pings_and_resets_backpressure_for_active_client() {
        let hub = WsHub::new();
        let id = Uuid::new_v4();
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(id, tx, 0);
        hub.subscribe(id, vec!["*".to_string()]);

        hub.fan_out(&Topic::session("alice"), "x");
        hub.heartbeat_tick(1_000, 90_000, usize::MAX);

        assert_eq!(hub.client_count(), 1);
        // First message received is the fan-out payload, then the ping.
        assert_eq!(rx.try_recv().unwrap(), "x");
        assert_eq!(rx.try_recv().unwrap(), "{\"type\":\"ping\"}");
    }

    #[test]
    fn test_heartbeat_disconnects_over_backpressure_threshold() {
        let hub = WsHub::new();
        let id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(64);
        let cancel = hub.register(id, tx, 0);
        hub.subscribe(id, vec!["*".to_string()]);

        for _ in 0..5 {
            hub.fan_out(&Topic::session("alice"), "x");
        }

        hub.heartbeat_tick(1_000, 90_000, 3);
        assert!(cancel.is_cancelled());
        assert_eq!(hub.client_count(), 0);
    }

    #[test]
    fn test_token_eq() {
        assert!(token_eq("secret", "secret"));
        assert!(!token_eq("secret", "other"));
    }

    #[test]
    fn test_unsubscribe_removes_only_named_patterns() {
        let hub = WsHub::new();
        let id = Uuid::new_v4();
        let (tx, _rx) = mpsc::channel(8);
        hub.register(id, tx, 0);
        hub.subscribe(id, vec!["session:a".to_string(), "session:b".to_string()]);

        let removed = hub.unsubscribe(id, &["session:a".to_string()]);
        assert_eq!(removed, vec!["session:a".to_string()]);

        let stats = hub.subscription_stats(usize::MAX);
        assert_eq!(stats.total_subscriptions, 1);
    }
}
