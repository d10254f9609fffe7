//! Fixed-window request counters.
//!
//! One window per (scope, client key). The window resets when it is older
//! than `RATE_WINDOW_SECS`; within a window exactly `limit` requests are
//! admitted and every further request is rejected with the seconds left
//! until the window rolls over.

use dashmap::DashMap;

use crate::constants::{RATE_LIMIT_AUTH, RATE_LIMIT_GENERAL, RATE_LIMIT_ORDER, RATE_WINDOW_SECS};
use crate::error::{CoreError, Result};
use crate::traits::Clock;

/// Request class, each with its own per-key budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateScope {
    Auth,
    Order,
    General,
}

impl RateScope {
    pub fn limit(&self) -> u32 {
        match self {
            RateScope::Auth => RATE_LIMIT_AUTH,
            RateScope::Order => RATE_LIMIT_ORDER,
            RateScope::General => RATE_LIMIT_GENERAL,
        }
    }
}

/// Derive the limiter key for a request: the peer IP when known, else a
/// user-agent + origin fingerprint.
pub fn client_key(ip: Option<&str>, user_agent: &str, origin: &str) -> String {
    match ip {
        Some(ip) if !ip.is_empty() => ip.to_string(),
        _ => format!("ua:{user_agent}|origin:{origin}"),
    }
}

#[derive(Debug)]
struct WindowState {
    window_start_secs: u64,
    count: u32,
}

/// Thread-safe fixed-window limiter. Deliberately in-memory: counters are
/// per-process and reset on restart.
pub struct FixedWindowLimiter {
    windows: DashMap<(RateScope, String), WindowState>,
}

impl FixedWindowLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
        }
    }

    /// Admit or reject one request. Rejections carry the seconds until the
    /// window resets.
    pub fn check(&self, scope: RateScope, key: &str, clock: &dyn Clock) -> Result<()> {
        let now = clock.now_secs();
        let mut entry = self
            .windows
            .entry((scope, key.to_string()))
            .or_insert(WindowState {
                window_start_secs: now,
                count: 0,
            });
        let state = entry.value_mut();

        if now.saturating_sub(state.window_start_secs) >= RATE_WINDOW_SECS {
            state.window_start_secs = now;
            state.count = 0;
        }

        state.count += 1;
        if state.count <= scope.limit() {
            Ok(())
        } else {
            let retry_after_secs =
                (state.window_start_secs + RATE_WINDOW_SECS).saturating_sub(now);
            Err(CoreError::RateLimited { retry_after_secs })
        }
    }

    /// Drop windows that ended before `now`. Called by the periodic sweep;
    /// correctness never depends on it.
    pub fn cleanup_expired(&self, clock: &dyn Clock) {
        let now = clock.now_secs();
        self.windows
            .retain(|_, state| now.saturating_sub(state.window_start_secs) < RATE_WINDOW_SECS);
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::clock::test_support::ManualClock;

    #[test]
    fn test_admits_exactly_n_then_rejects() {
        let limiter = FixedWindowLimiter::new();
        let clock = ManualClock::new(1_000);

        for _ in 0..RateScope::Auth.limit() {
            limiter.check(RateScope::Auth, "1.2.3.4", &clock).unwrap();
        }
        let err = limiter.check(RateScope::Auth, "1.2.3.4", &clock).unwrap_err();
        match err {
            CoreError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 60),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_window_rolls_over() {
        let limiter = FixedWindowLimiter::new();
        let clock = ManualClock::new(1_000);

        for _ in 0..RateScope::Auth.limit() {
            limiter.check(RateScope::Auth, "1.2.3.4", &clock).unwrap();
        }
        assert!(limiter.check(RateScope::Auth, "1.2.3.4", &clock).is_err());

        clock.advance(59);
        assert!(limiter.check(RateScope::Auth, "1.2.3.4", &clock).is_err());

        clock.advance(1);
        assert!(limiter.check(RateScope::Auth, "1.2.3.4", &clock).is_ok());
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = FixedWindowLimiter::new();
        let clock = ManualClock::new(0);

        for _ in 0..RateScope::Auth.limit() {
            limiter.check(RateScope::Auth, "1.1.1.1", &clock).unwrap();
        }
        assert!(limiter.check(RateScope::Auth, "1.1.1.1", &clock).is_err());
        assert!(limiter.check(RateScope::Auth, "2.2.2.2", &clock).is_ok());
    }

    #[test]
    fn test_scopes_are_independent() {
        let limiter = FixedWindowLimiter::new();
        let clock = ManualClock::new(0);

        for _ in 0..RateScope::Auth.limit() {
            limiter.check(RateScope::Auth, "1.1.1.1", &clock).unwrap();
        }
        assert!(limiter.check(RateScope::Auth, "1.1.1.1", &clock).is_err());
        assert!(limiter.check(RateScope::General, "1.1.1.1", &clock).is_ok());
    }

    #[test]
    fn test_retry_after_counts_down() {
        let limiter = FixedWindowLimiter::new();
        let clock = ManualClock::new(1_000);

        for _ in 0..RateScope::Auth.limit() {
            limiter.check(RateScope::Auth, "k", &clock).unwrap();
        }
        clock.advance(45);
        match limiter.check(RateScope::Auth, "k", &clock).unwrap_err() {
            CoreError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 15),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_client_key_prefers_ip() {
        assert_eq!(client_key(Some("9.9.9.9"), "ua", "o"), "9.9.9.9");
        assert_eq!(
            client_key(None, "Mozilla", "https://hostforge.example"),
            "ua:Mozilla|origin:https://hostforge.example"
        );
        assert_eq!(
            client_key(Some(""), "Mozilla", "o"),
            "ua:Mozilla|origin:o"
        );
    }

    #[test]
    fn test_cleanup_drops_stale_windows() {
        let limiter = FixedWindowLimiter::new();
        let clock = ManualClock::new(0);
        limiter.check(RateScope::General, "a", &clock).unwrap();
        limiter.check(RateScope::General, "b", &clock).unwrap();
        assert_eq!(limiter.len(), 2);

        clock.advance(120);
        limiter.check(RateScope::General, "b", &clock).unwrap();
        limiter.cleanup_expired(&clock);
        assert_eq!(limiter.len(), 1);
    }
}
