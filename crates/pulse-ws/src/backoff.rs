//! Reconnect backoff schedule.

use std::time::Duration;

/// Exponential backoff with a hard cap and bounded jitter.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Upper bound on the exponential component, in seconds.
    pub cap_secs: u64,
    /// Upper bound on the added jitter, in seconds.
    pub jitter_secs: u64,
}

impl BackoffPolicy {
    pub fn new(cap_secs: u64, jitter_secs: u64) -> Self {
        Self {
            cap_secs,
            jitter_secs,
        }
    }

    /// Delay before reconnect attempt number `attempt`.
    ///
    /// The exponential component is `2^attempt` seconds capped at
    /// `cap_secs`; the exponent itself is clamped to avoid overflow on
    /// large attempt counts. Jitter in `[0, jitter_secs)` is added so a
    /// fleet of supervisors does not reconnect in lockstep.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(8);
        let secs = (1u64 << exponent).min(self.cap_secs);
        Duration::from_secs(secs) + Duration::from_millis(self.jitter_ms())
    }

    /// Worst-case delay, for status reporting and tests.
    pub fn max_delay(&self) -> Duration {
        Duration::from_secs(self.cap_secs + self.jitter_secs)
    }

    /// Jitter in `[0, jitter_secs * 1000)` ms derived from the clock's
    /// sub-second nanos.
    fn jitter_ms(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        let bound_ms = self.jitter_secs.saturating_mul(1000);
        if bound_ms == 0 {
            return 0;
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        u64::from(nanos) % bound_ms
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            cap_secs: 300,
            jitter_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_grows_exponentially() {
        let policy = BackoffPolicy::new(300, 0);
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(3), Duration::from_secs(8));
        assert_eq!(policy.delay(8), Duration::from_secs(256));
    }

    #[test]
    fn test_delay_respects_cap() {
        let policy = BackoffPolicy::new(60, 0);
        // 2^6 = 64 exceeds the cap.
        assert_eq!(policy.delay(6), Duration::from_secs(60));
        assert_eq!(policy.delay(8), Duration::from_secs(60));
    }

    #[test]
    fn test_delays_non_decreasing_up_to_cap() {
        let policy = BackoffPolicy::new(300, 0);
        let mut prev = Duration::ZERO;
        for attempt in 0..20 {
            let d = policy.delay(attempt);
            assert!(d >= prev);
            prev = d;
        }
    }

    #[test]
    fn test_jitter_stays_within_bound() {
        let policy = BackoffPolicy::new(60, 5);
        for attempt in 0..20 {
            let d = policy.delay(attempt);
            assert!(d <= policy.max_delay());
        }
    }

    #[test]
    fn test_large_attempt_does_not_overflow() {
        let policy = BackoffPolicy::new(300, 5);
        assert!(policy.delay(u32::MAX) <= policy.max_delay());
    }
}
