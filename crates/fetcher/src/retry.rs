//! Explicit backoff schedule for the fetch retry loop.

use std::time::Duration;

use linkprobe_core::RetryPolicy;

/// Produces the wait before each retry: `multiplier * 2^n` seconds,
/// clamped into `[min_wait, max_wait]`.
pub struct Backoff<'a> {
    policy: &'a RetryPolicy,
    exponent: u32,
}

impl<'a> Backoff<'a> {
    pub fn new(policy: &'a RetryPolicy) -> Self {
        Self {
            policy,
            exponent: 0,
        }
    }

    pub fn next_wait(&mut self) -> Duration {
        let raw = self
            .policy
            .multiplier
            .saturating_mul(1u64 << self.exponent.min(62));
        self.exponent += 1;
        Duration::from_secs(raw).clamp(self.policy.min_wait, self.policy.max_wait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_are_clamped_to_policy_bounds() {
        let policy = RetryPolicy::default();
        let mut backoff = Backoff::new(&policy);
        for _ in 0..3 {
            let wait = backoff.next_wait();
            assert!(wait >= policy.min_wait);
            assert!(wait <= policy.max_wait);
        }
    }

    #[test]
    fn test_waits_grow_until_the_cap() {
        let policy = RetryPolicy {
            max_attempts: 5,
            multiplier: 1,
            min_wait: Duration::ZERO,
            max_wait: Duration::from_secs(6),
        };
        let mut backoff = Backoff::new(&policy);
        assert_eq!(backoff.next_wait(), Duration::from_secs(1));
        assert_eq!(backoff.next_wait(), Duration::from_secs(2));
        assert_eq!(backoff.next_wait(), Duration::from_secs(4));
        assert_eq!(backoff.next_wait(), Duration::from_secs(6));
        assert_eq!(backoff.next_wait(), Duration::from_secs(6));
    }
}
