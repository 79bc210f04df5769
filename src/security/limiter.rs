//! Shared token bucket limiter.
//!
//! One limiter is built per rate limit policy at startup and shared by every
//! request matching that policy. Buckets are keyed so the same limiter can
//! serve a single global bucket or one bucket per client.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::PolicyConfig;

/// Key used when every matching request shares one bucket.
pub const GLOBAL_KEY: &str = "*";

/// Source of the current instant.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

/// System clock implementation using `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Admit/reject decision point wrapped by a collection policy.
pub trait Limiter: Send + Sync + Debug {
    /// Consume one unit for `key`. Returns false when the caller must be rejected.
    fn check(&self, key: &str) -> bool;
}

/// A simple token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn is_idle_and_full(
        &self,
        capacity: f64,
        refill_rate: f64,
        expires_in: Duration,
        now: Instant,
    ) -> bool {
        let idle = now.saturating_duration_since(self.last_update);
        idle >= expires_in && self.tokens + idle.as_secs_f64() * refill_rate >= capacity
    }
}

#[derive(Debug)]
struct Buckets {
    map: HashMap<String, TokenBucket>,
    last_cleanup: Instant,
}

/// In-memory token bucket limiter.
///
/// Holds `capacity` tokens per key, refilled at `capacity / interval` per
/// second. All bucket state sits behind one mutex so concurrent callers never
/// observe more than `capacity` admissions per full bucket.
#[derive(Debug)]
pub struct TokenBucketLimiter {
    buckets: Mutex<Buckets>,
    capacity: f64,
    refill_rate: f64,
    expires_in: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenBucketLimiter {
    pub fn new(capacity: u32, interval: Duration, expires_in: Duration) -> Self {
        Self::with_clock(capacity, interval, expires_in, Arc::new(SystemClock))
    }

    pub fn with_clock(
        capacity: u32,
        interval: Duration,
        expires_in: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let capacity = f64::from(capacity);
        let interval = interval.as_secs_f64().max(f64::EPSILON);
        let now = clock.now();
        Self {
            buckets: Mutex::new(Buckets {
                map: HashMap::new(),
                last_cleanup: now,
            }),
            capacity,
            refill_rate: capacity / interval,
            expires_in,
            clock,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(
            config.capacity,
            Duration::from_secs(config.interval_secs),
            Duration::from_secs(config.expires_in_secs),
        )
    }

    /// Number of buckets currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }
}

impl Limiter for TokenBucketLimiter {
    fn check(&self, key: &str) -> bool {
        let now = self.clock.now();
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);

        if now.saturating_duration_since(buckets.last_cleanup) >= self.expires_in {
            let (capacity, refill_rate, expires_in) =
                (self.capacity, self.refill_rate, self.expires_in);
            let before = buckets.map.len();
            // Only a full bucket may be dropped: recreating it full must not
            // hand back tokens that are still owed.
            buckets.map.retain(|key, bucket| {
                key == GLOBAL_KEY || !bucket.is_idle_and_full(capacity, refill_rate, expires_in, now)
            });
            buckets.last_cleanup = now;
            let evicted = before - buckets.map.len();
            if evicted > 0 {
                tracing::debug!(evicted, "Evicted idle rate limit buckets");
            }
        }

        let capacity = self.capacity;
        let bucket = buckets
            .map
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(capacity, now));

        bucket.try_acquire(capacity, self.refill_rate, now)
    }
}
