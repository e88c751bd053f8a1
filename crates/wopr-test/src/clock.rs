//! A deterministic, monotonically-increasing clock for tests that would
//! otherwise depend on [`wopr_core::Timestamp::now`]'s wall-clock read.

use std::sync::atomic::{AtomicI64, Ordering};

use wopr_core::Timestamp;

/// Hands out strictly increasing [`Timestamp`]s, one millisecond apart,
/// starting from a fixed epoch so test assertions never race real time.
#[derive(Debug)]
pub struct FakeClock {
    next_ms: AtomicI64,
}

impl FakeClock {
    /// Construct a clock starting at `start_ms`.
    #[must_use]
    pub fn new(start_ms: i64) -> Self {
        Self { next_ms: AtomicI64::new(start_ms) }
    }

    /// Advance and return the next timestamp.
    pub fn tick(&self) -> Timestamp {
        let ms = self.next_ms.fetch_add(1, Ordering::SeqCst);
        Timestamp::from_millis(ms)
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(1_700_000_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_is_monotonic() {
        let clock = FakeClock::default();
        let a = clock.tick();
        let b = clock.tick();
        assert!(a < b);
    }
}
