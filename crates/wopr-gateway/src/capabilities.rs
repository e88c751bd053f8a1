//! Per-session sliding-window rate limiter for `/api/capabilities`
//! activate/deactivate (§6: 10 requests/minute per session).

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// Default activate/deactivate limit per session.
pub const CAPABILITY_RATE_LIMIT: u32 = 10;
const WINDOW: Duration = Duration::minutes(1);

struct WindowTracker {
    requests: Vec<DateTime<Utc>>,
}

impl WindowTracker {
    fn new() -> Self {
        Self { requests: Vec::new() }
    }

    fn try_request(&mut self, limit: u32) -> bool {
        let now = Utc::now();
        let window_start = now - WINDOW;
        self.requests.retain(|t| *t > window_start);
        if self.requests.len() >= limit as usize {
            return false;
        }
        self.requests.push(now);
        true
    }
}

/// Tracks `/api/capabilities` activate/deactivate calls per session.
pub struct RateLimiter {
    limit: u32,
    trackers: RwLock<HashMap<String, WindowTracker>>,
}

impl RateLimiter {
    /// Construct a limiter allowing `limit` requests/minute per session.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self { limit, trackers: RwLock::new(HashMap::new()) }
    }

    /// Record an activate/deactivate call for `session`. Returns `true`
    /// if it's within the limit.
    pub fn try_request(&self, session: &str) -> bool {
        let mut trackers = self.trackers.write().expect("rate limiter lock poisoned");
        trackers.entry(session.to_string()).or_insert_with(WindowTracker::new).try_request(self.limit)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(CAPABILITY_RATE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit_then_denies() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.try_request("alice"));
        assert!(limiter.try_request("alice"));
        assert!(!limiter.try_request("alice"));
    }

    #[test]
    fn test_sessions_tracked_independently() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.try_request("alice"));
        assert!(limiter.try_request("bob"));
        assert!(!limiter.try_request("alice"));
    }
}
