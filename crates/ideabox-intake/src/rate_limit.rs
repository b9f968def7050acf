// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-level token-bucket admission control.
//!
//! A submission is admitted only when both the shared global bucket and the
//! submitter's own bucket have a token. The global bucket is checked first
//! and its token is not refunded when the per-submitter check then fails.

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorLimiter};
use tracing::debug;

type DirectLimiter = GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>;

struct Bucket {
    limiter: DirectLimiter,
    last_seen: Instant,
}

/// Hourly submission quotas, global and per submitter.
///
/// Safe to share across tasks; the submitter map is sharded and each bucket
/// is lock-free.
pub struct RateLimiter {
    global: DirectLimiter,
    per_user_quota: Quota,
    buckets: DashMap<i64, Bucket>,
}

fn hourly(n: u32) -> Quota {
    Quota::per_hour(NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN))
}

impl RateLimiter {
    /// Buckets holding `per_user` and `global` tokens, each refilling fully
    /// over one hour. Zero is treated as one.
    pub fn new(per_user: u32, global: u32) -> Self {
        Self::with_quotas(hourly(per_user), hourly(global))
    }

    /// Arbitrary quotas, e.g. sub-second periods in tests.
    pub fn with_quotas(per_user: Quota, global: Quota) -> Self {
        Self {
            global: GovernorLimiter::direct(global),
            per_user_quota: per_user,
            buckets: DashMap::new(),
        }
    }

    /// Takes one token from the global bucket and one from the submitter's.
    pub fn allow(&self, submitter_id: i64) -> bool {
        if self.global.check().is_err() {
            debug!(submitter_id, "global submission quota exhausted");
            return false;
        }

        let mut bucket = self.buckets.entry(submitter_id).or_insert_with(|| Bucket {
            limiter: GovernorLimiter::direct(self.per_user_quota),
            last_seen: Instant::now(),
        });
        bucket.last_seen = Instant::now();
        if bucket.limiter.check().is_err() {
            debug!(submitter_id, "per-submitter quota exhausted");
            return false;
        }
        true
    }

    /// Forgets every submitter. The global bucket keeps its state.
    pub fn reset(&self) {
        self.buckets.clear();
    }

    /// Drops buckets untouched for at least `max_idle` and returns how many.
    ///
    /// With `max_idle` at or above the quota period this cannot let anyone
    /// exceed their quota: an idle bucket that long has refilled completely.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let before = self.buckets.len();
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_seen) < max_idle);
        let evicted = before.saturating_sub(self.buckets.len());
        if evicted > 0 {
            debug!(evicted, "evicted idle rate-limit buckets");
        }
        evicted
    }

    /// Number of submitters currently holding a bucket.
    pub fn tracked_submitters(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn short(n: u32, period: Duration) -> Quota {
        Quota::with_period(period)
            .unwrap()
            .allow_burst(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn per_user_quota_is_independent_between_submitters() {
        let limiter = RateLimiter::new(2, 50);
        assert!(limiter.allow(1));
        assert!(limiter.allow(1));
        assert!(!limiter.allow(1));
        assert!(limiter.allow(2));
        assert!(limiter.allow(2));
        assert!(!limiter.allow(2));
    }

    #[test]
    fn global_quota_caps_everyone() {
        let limiter = RateLimiter::new(5, 1);
        assert!(limiter.allow(1));
        assert!(!limiter.allow(2));
        assert!(!limiter.allow(1));
    }

    #[test]
    fn global_token_is_spent_even_when_user_is_denied() {
        let limiter = RateLimiter::new(1, 3);
        assert!(limiter.allow(1));
        // Consumes a global token but the user bucket is empty.
        assert!(!limiter.allow(1));
        assert!(limiter.allow(2));
        // Three global tokens are gone now.
        assert!(!limiter.allow(3));
    }

    #[test]
    fn tokens_refill_after_period() {
        let limiter = RateLimiter::with_quotas(
            short(1, Duration::from_millis(40)),
            short(100, Duration::from_millis(1)),
        );
        assert!(limiter.allow(7));
        assert!(!limiter.allow(7));
        std::thread::sleep(Duration::from_millis(60));
        assert!(limiter.allow(7));
    }

    #[test]
    fn reset_clears_submitters_only() {
        let limiter = RateLimiter::new(1, 2);
        assert!(limiter.allow(1));
        assert!(!limiter.allow(1));
        assert_eq!(limiter.tracked_submitters(), 1);

        limiter.reset();
        assert_eq!(limiter.tracked_submitters(), 0);
        // Global bucket is empty after two checks.
        assert!(!limiter.allow(1));
    }

    #[test]
    fn sweep_evicts_only_idle_buckets() {
        let limiter = RateLimiter::new(5, 50);
        limiter.allow(1);
        limiter.allow(2);
        assert_eq!(limiter.sweep_idle(Duration::from_secs(3600)), 0);
        assert_eq!(limiter.tracked_submitters(), 2);

        std::thread::sleep(Duration::from_millis(20));
        limiter.allow(2);
        assert_eq!(limiter.sweep_idle(Duration::from_millis(15)), 1);
        assert_eq!(limiter.tracked_submitters(), 1);
    }

    #[test]
    fn concurrent_submitters_never_exceed_global_quota() {
        let limiter = Arc::new(RateLimiter::new(1000, 40));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || (0..20).filter(|_| limiter.allow(t)).count())
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 40);
    }
}
