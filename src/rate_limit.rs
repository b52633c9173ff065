use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Per-username login brute force limiter.
pub struct LoginRateLimiter {
    /// username -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if a login attempt is allowed. 5 failures per 15 minutes.
    /// Does NOT increment the counter — call `record_failure()` on invalid
    /// credentials.
    pub fn check(&self, username: &str) -> Result<(), u64> {
        let window = Duration::from_secs(15 * 60);
        let now = Instant::now();

        let entry = self.entries.get(&username.to_lowercase());
        let Some(entry) = entry else {
            return Ok(());
        };

        let (count, start) = entry.value();

        if now.duration_since(*start) > window {
            return Ok(());
        }

        if *count >= 5 {
            let elapsed = now.duration_since(*start).as_secs();
            return Err((15 * 60u64).saturating_sub(elapsed));
        }

        Ok(())
    }

    /// Record a failed login attempt for the given username.
    pub fn record_failure(&self, username: &str) {
        let window = Duration::from_secs(15 * 60);
        let now = Instant::now();

        let mut entry = self
            .entries
            .entry(username.to_lowercase())
            .or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_until_five_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..4 {
            limiter.record_failure("driver1");
        }
        assert!(limiter.check("driver1").is_ok());
        limiter.record_failure("driver1");
        assert!(limiter.check("driver1").is_err());
    }

    #[test]
    fn usernames_are_case_insensitive() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..5 {
            limiter.record_failure("Driver1");
        }
        assert!(limiter.check("driver1").is_err());
    }
}
