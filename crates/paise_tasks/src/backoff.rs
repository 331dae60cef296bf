//! Exponential backoff with full jitter, computed without a crate
//! dependency since the teacher does not carry one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Bounds on the retry loop: how many attempts, and how the delay between
/// them grows.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first. `1` means no retries.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound the exponential growth is clamped to.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
        }
    }
}

/// A small, fast, non-cryptographic PRNG (xorshift64*) seeded from a
/// process-wide counter. Good enough for jitter; never used for anything
/// security-sensitive.
fn next_jitter_fraction() -> f64 {
    static STATE: AtomicU64 = AtomicU64::new(0x9E3779B97F4A7C15);
    let mut x = STATE.load(Ordering::Relaxed);
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    STATE.store(x, Ordering::Relaxed);
    (x >> 11) as f64 / (1u64 << 53) as f64
}

/// Computes the delay before attempt number `attempt` (1-indexed: the delay
/// before the *second* attempt overall is `backoff_delay(1, policy)`), using
/// full jitter: a uniform random value between zero and the exponential
/// cap.
#[must_use]
pub fn backoff_delay(attempt: u32, policy: &RetryPolicy) -> Duration {
    let exp = policy.base_delay.as_millis().saturating_mul(1u128 << attempt.min(20));
    let capped = exp.min(policy.max_delay.as_millis());
    let jittered = (capped as f64 * next_jitter_fraction()) as u64;
    Duration::from_millis(jittered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_never_exceeds_max() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
        };
        for attempt in 0..10 {
            let d = backoff_delay(attempt, &policy);
            assert!(d <= policy.max_delay);
        }
    }

    #[test]
    fn delay_grows_with_attempt_on_average() {
        let policy = RetryPolicy::default();
        let early: u128 = (0..50).map(|_| backoff_delay(0, &policy).as_millis()).sum();
        let late: u128 = (0..50).map(|_| backoff_delay(4, &policy).as_millis()).sum();
        assert!(late >= early);
    }
}
