use std::time::{Duration, Instant};

use dashmap::DashMap;

const WINDOW: Duration = Duration::from_secs(15 * 60);
const MAX_FAILURES: u32 = 5;
/// Stale entries are swept once the map grows past this many usernames.
const SWEEP_THRESHOLD: usize = 10_000;

/// Per-username login brute force limiter. Keys are the exact username, since
/// accounts are case-sensitive.
pub struct LoginRateLimiter {
    /// username -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if a login attempt is allowed. 5 failures per 15 minutes.
    /// Returns the seconds left in the window when blocked.
    /// Does NOT increment the counter; call `record_failure()` on a bad password.
    pub fn check(&self, username: &str) -> Result<(), u64> {
        let now = Instant::now();

        let Some(entry) = self.entries.get(username) else {
            return Ok(());
        };

        let (count, start) = entry.value();

        if now.duration_since(*start) > WINDOW {
            return Ok(());
        }

        if *count >= MAX_FAILURES {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(WINDOW.as_secs().saturating_sub(elapsed));
        }

        Ok(())
    }

    pub fn record_failure(&self, username: &str) {
        let now = Instant::now();

        if self.entries.len() > SWEEP_THRESHOLD {
            self.cleanup(WINDOW);
        }

        let mut entry = self.entries.entry(username.to_string()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > WINDOW {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}
