//! Sliding-window request limiting.
//!
//! Each client key keeps the timestamps of its requests inside the current
//! window. A request is admitted while fewer than `max_requests` timestamps
//! remain after expired ones are discarded, so the window slides with time
//! instead of resetting at fixed boundaries.

use dashmap::DashMap;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use std::time::{Duration, Instant};

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Admitted; `remaining` slots are left in the window.
    Allowed {
        /// Requests still allowed before the limit is hit.
        remaining: u32,
    },
    /// Rejected; the oldest counted request expires after `retry_after`.
    Limited {
        /// Time until a slot frees up.
        retry_after: Duration,
    },
}

impl RateDecision {
    /// Returns `true` if the request was admitted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Per-client sliding-window limiter, cheap to clone and share.
#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: u32,
    bypass_secret: Option<Arc<str>>,
    buckets: Arc<DashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter admitting `max_requests` per `window` per key.
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            bypass_secret: None,
            buckets: Arc::new(DashMap::new()),
        }
    }

    /// Configure the secret that skips limiting entirely.
    pub fn with_bypass_secret(mut self, secret: Option<String>) -> Self {
        self.bypass_secret = secret.filter(|s| !s.is_empty()).map(Arc::from);
        self
    }

    /// Returns `true` when `presented` matches the configured bypass secret.
    ///
    /// Always `false` if no secret is configured.
    pub fn is_bypass(&self, presented: Option<&str>) -> bool {
        match (&self.bypass_secret, presented) {
            (Some(secret), Some(presented)) => {
                secret.as_bytes().ct_eq(presented.as_bytes()).into()
            }
            _ => false,
        }
    }

    /// Record a request for `key` if the window has room.
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let window = self.window;

        let mut entry = self.buckets.entry(key.to_string()).or_default();
        entry.retain(|instant| now.duration_since(*instant) < window);

        let remaining = self.max_requests.saturating_sub(entry.len() as u32);
        if remaining == 0 {
            let retry_after = entry
                .first()
                .map(|oldest| window.saturating_sub(now.duration_since(*oldest)))
                .unwrap_or(window);
            return RateDecision::Limited { retry_after };
        }

        entry.push(now);
        RateDecision::Allowed {
            remaining: remaining - 1,
        }
    }

    /// Drop keys whose every request has left the window.
    ///
    /// Returns the number of keys removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let window = self.window;
        let before = self.buckets.len();
        self.buckets.retain(|_, instants| {
            instants.retain(|instant| now.duration_since(*instant) < window);
            !instants.is_empty()
        });
        before.saturating_sub(self.buckets.len())
    }

    /// Configured maximum per window.
    pub fn limit(&self) -> u32 {
        self.max_requests
    }
}
