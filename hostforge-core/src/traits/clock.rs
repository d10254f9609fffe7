use std::time::{SystemTime, UNIX_EPOCH};

/// Time source for everything that ages: rate-limit windows, checkout
/// session TTLs, login session expiry. Tests substitute a manual clock.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> u64;
}

/// Wall-clock implementation used by the server.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

#[cfg(test)]
pub mod test_support {
    use super::Clock;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Manually advanced clock for deterministic tests.
    pub struct ManualClock {
        now: AtomicU64,
    }

    impl ManualClock {
        pub fn new(start: u64) -> Self {
            Self {
                now: AtomicU64::new(start),
            }
        }

        pub fn advance(&self, secs: u64) {
            self.now.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_secs(&self) -> u64 {
            self.now.load(Ordering::SeqCst)
        }
    }
}
