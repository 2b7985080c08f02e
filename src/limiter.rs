//! Per-client sliding-window rate limiting.
//!
//! Each client keeps the timestamps of its requests inside the trailing
//! window; entries age out lazily on every check or record for that client.
//! Because the window slides rather than resetting on fixed boundaries, a
//! client cannot double its burst by straddling a boundary.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Rate limiter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LimiterConfig {
    /// Maximum requests per window.
    pub limit: usize,

    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        LimiterConfig {
            limit: 60,
            window_secs: 60,
        }
    }
}

/// The outcome of a rate-limit check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Whether the next request would be allowed.
    pub allowed: bool,

    /// Requests left in the current window.
    pub remaining: usize,

    /// When the oldest retained request leaves the window.
    pub reset_at: Instant,
}

/// A sliding-window request-quota tracker.
#[derive(Debug)]
pub struct RateLimiter {
    windows: AHashMap<String, VecDeque<Instant>>,
    limit: usize,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter from its configuration.
    pub fn new(config: &LimiterConfig) -> Self {
        RateLimiter {
            windows: AHashMap::new(),
            limit: config.limit.max(1),
            window: Duration::from_secs(config.window_secs.max(1)),
        }
    }

    /// Record one request for `client_id` at the current time.
    pub fn record_request(&mut self, client_id: &str) {
        self.record_request_at(client_id, Instant::now());
    }

    /// Check the quota for `client_id` at the current time.
    pub fn check_rate_limit(&mut self, client_id: &str) -> RateLimitStatus {
        self.check_rate_limit_at(client_id, Instant::now())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    pub(crate) fn record_request_at(&mut self, client_id: &str, now: Instant) {
        self.prune(client_id, now);
        self.windows
            .entry(client_id.to_string())
            .or_default()
            .push_back(now);
    }

    pub(crate) fn check_rate_limit_at(&mut self, client_id: &str, now: Instant) -> RateLimitStatus {
        self.prune(client_id, now);

        let window = self.windows.get(client_id);
        let count = window.map_or(0, VecDeque::len);
        let reset_at = window
            .and_then(VecDeque::front)
            .map(|oldest| *oldest + self.window)
            .unwrap_or(now + self.window);

        RateLimitStatus {
            allowed: count < self.limit,
            remaining: self.limit.saturating_sub(count),
            reset_at,
        }
    }

    /// Drop entries older than the window; forget the client entirely once
    /// its window is empty.
    fn prune(&mut self, client_id: &str, now: Instant) {
        let Some(window) = self.windows.get_mut(client_id) else {
            return;
        };
        let cutoff = now.checked_sub(self.window);
        if let Some(cutoff) = cutoff {
            while window.front().is_some_and(|ts| *ts <= cutoff) {
                window.pop_front();
            }
        }
        if window.is_empty() {
            self.windows.remove(client_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: usize, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&LimiterConfig { limit, window_secs })
    }

    #[test]
    fn test_allows_until_limit() {
        let mut limiter = limiter(3, 60);
        let start = Instant::now();

        for i in 0..3 {
            let status = limiter.check_rate_limit_at("c1", start);
            assert!(status.allowed, "request {i} should be allowed");
            assert_eq!(status.remaining, 3 - i);
            limiter.record_request_at("c1", start);
        }

        let status = limiter.check_rate_limit_at("c1", start);
        assert!(!status.allowed);
        assert_eq!(status.remaining, 0);
    }

    #[test]
    fn test_window_slides() {
        let mut limiter = limiter(2, 60);
        let start = Instant::now();

        limiter.record_request_at("c1", start);
        limiter.record_request_at("c1", start + Duration::from_secs(30));
        assert!(!limiter.check_rate_limit_at("c1", start + Duration::from_secs(31)).allowed);

        // The first request ages out; the second is still inside.
        let later = start + Duration::from_secs(61);
        let status = limiter.check_rate_limit_at("c1", later);
        assert!(status.allowed);
        assert_eq!(status.remaining, 1);

        // Past both requests: the full quota returns.
        let empty = start + Duration::from_secs(120);
        let status = limiter.check_rate_limit_at("c1", empty);
        assert_eq!(status.remaining, 2);
    }

    #[test]
    fn test_reset_time() {
        let mut limiter = limiter(5, 60);
        let start = Instant::now();

        // No requests yet: reset is a full window from now.
        let status = limiter.check_rate_limit_at("c1", start);
        assert_eq!(status.reset_at, start + Duration::from_secs(60));

        limiter.record_request_at("c1", start);
        limiter.record_request_at("c1", start + Duration::from_secs(10));
        let status = limiter.check_rate_limit_at("c1", start + Duration::from_secs(20));
        assert_eq!(status.reset_at, start + Duration::from_secs(60));
    }

    #[test]
    fn test_clients_are_independent() {
        let mut limiter = limiter(1, 60);
        let start = Instant::now();

        limiter.record_request_at("c1", start);
        assert!(!limiter.check_rate_limit_at("c1", start).allowed);
        assert!(limiter.check_rate_limit_at("c2", start).allowed);
    }

    #[test]
    fn test_empty_client_record_removed() {
        let mut limiter = limiter(2, 60);
        let start = Instant::now();

        limiter.record_request_at("c1", start);
        assert_eq!(limiter.tracked_clients(), 1);

        limiter.check_rate_limit_at("c1", start + Duration::from_secs(120));
        assert_eq!(limiter.tracked_clients(), 0);
    }
}
