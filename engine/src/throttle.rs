//! Throttle cache - time-window memoization for one callable instance
//!
//! Memoizes the result of a callable for a configured window so repeated
//! invocations within the window are idempotent and cheap - the contract
//! rate-limited sensors need.
//!
//! Throttling is per *instance*, not per argument set: the cache is a
//! single slot owned by the throttled plugin, handed in at construction.
//! No state is shared across instances, which keeps lifetimes and test
//! isolation clean.
//!
//! # State machine
//!
//! ```text
//! cold ──(first call: compute + cache)──► warm
//! warm ──(call before expiry: cached)───► warm
//! warm ──(call after expiry: recompute)─► warm   (window restarts at the
//!                                                 recompute's time)
//! ```
//!
//! The clock is `tokio::time::Instant`: monotonic, immune to wall-clock
//! adjustments, and controllable in paused-time tests.

use parking_lot::Mutex;
use putki_core::{Payload, PluginError};
use std::time::Duration;
use tokio::time::Instant;

use crate::metrics::Metrics;

/// Per-instance memoization over a sliding time window
pub struct ThrottleCache {
    window: Duration,
    slot: Mutex<Option<Entry>>,
}

struct Entry {
    value: Payload,
    expires_at: Instant,
}

impl ThrottleCache {
    /// Create an empty (cold) cache with the given window
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            slot: Mutex::new(None),
        }
    }

    /// The configured window
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Return the cached value, or invoke `compute` and cache its result
    ///
    /// While an unexpired entry exists, `compute` is not invoked. The
    /// first call at or after expiry recomputes exactly once and resets
    /// expiry to `now + window` - measured from the recompute, not from
    /// the original entry.
    ///
    /// A failed `compute` caches nothing; the next call tries again.
    pub fn get_or_compute<F>(&self, compute: F) -> Result<Payload, PluginError>
    where
        F: FnOnce() -> Result<Payload, PluginError>,
    {
        let mut slot = self.slot.lock();
        let now = Instant::now();

        if let Some(entry) = slot.as_ref() {
            if now < entry.expires_at {
                if let Some(metrics) = Metrics::get() {
                    metrics.record_throttle(true);
                }
                return Ok(entry.value.clone());
            }
        }

        if let Some(metrics) = Metrics::get() {
            metrics.record_throttle(false);
        }

        let value = compute()?;
        *slot = Some(Entry {
            value: value.clone(),
            expires_at: now + self.window,
        });
        Ok(value)
    }

    /// Drop any cached entry, returning the cache to cold
    pub fn invalidate(&self) {
        *self.slot.lock() = None;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counting_compute(calls: &AtomicU64) -> impl FnOnce() -> Result<Payload, PluginError> + '_ {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!(n))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_call_computes_and_caches() {
        let cache = ThrottleCache::new(Duration::from_secs(10));
        let calls = AtomicU64::new(0);

        let v = cache.get_or_compute(counting_compute(&calls)).unwrap();
        assert_eq!(v, json!(0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn calls_within_window_return_identical_cached_value() {
        let cache = ThrottleCache::new(Duration::from_secs(10));
        let calls = AtomicU64::new(0);

        let first = cache.get_or_compute(counting_compute(&calls)).unwrap();

        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(1)).await;
            let v = cache.get_or_compute(counting_compute(&calls)).unwrap();
            assert_eq!(v, first);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1, "only the cold call computes");
    }

    #[tokio::test(start_paused = true)]
    async fn call_after_expiry_recomputes_exactly_once() {
        let cache = ThrottleCache::new(Duration::from_secs(10));
        let calls = AtomicU64::new(0);

        cache.get_or_compute(counting_compute(&calls)).unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;
        let v = cache.get_or_compute(counting_compute(&calls)).unwrap();
        assert_eq!(v, json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn window_refreshes_from_recompute_time_not_original() {
        let cache = ThrottleCache::new(Duration::from_secs(10));
        let calls = AtomicU64::new(0);

        // t=0: cold compute; window covers [0, 10)
        cache.get_or_compute(counting_compute(&calls)).unwrap();

        // t=15: recompute; window must now cover [15, 25), not [10, 20)
        tokio::time::advance(Duration::from_secs(15)).await;
        cache.get_or_compute(counting_compute(&calls)).unwrap();

        // t=22: inside the refreshed window - cached
        tokio::time::advance(Duration::from_secs(7)).await;
        let v = cache.get_or_compute(counting_compute(&calls)).unwrap();
        assert_eq!(v, json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_compute_is_not_cached() {
        let cache = ThrottleCache::new(Duration::from_secs(10));

        let err = cache
            .get_or_compute(|| Err(PluginError::Poll("flaky".to_string())))
            .unwrap_err();
        assert!(matches!(err, PluginError::Poll(_)));

        // Next call retries immediately, no poisoned entry
        let v = cache.get_or_compute(|| Ok(json!("ok"))).unwrap();
        assert_eq!(v, json!("ok"));
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_returns_to_cold() {
        let cache = ThrottleCache::new(Duration::from_secs(10));
        let calls = AtomicU64::new(0);

        cache.get_or_compute(counting_compute(&calls)).unwrap();
        cache.invalidate();
        cache.get_or_compute(counting_compute(&calls)).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
