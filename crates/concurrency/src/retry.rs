//! Retry-with-backoff for commit conflicts.
//!
//! Grounded in the teacher's `transaction_with_retry`/`RetryConfig`
//! shape: exponential backoff with jitter, `std::thread::sleep`
//! between attempts rather than an async timer, since the whole crate
//! models transactions as blocking calls (spec §9).

use std::time::Duration;

use rand::Rng;

/// Backoff policy for a retried operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    /// A handful of local retries for ordinary commit conflicts. The
    /// allocator layers its own, much larger retry budget (spec §4.3,
    /// default 30) on top of this for shard contention specifically.
    fn default() -> Self {
        RetryConfig {
            max_retries: 5,
            base_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(100),
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Exponential backoff capped at `max_delay`, plus up to an equal
    /// amount of jitter so that contending retriers don't lock-step.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1u32.wrapping_shl(attempt.min(16)));
        let capped = exp.min(self.max_delay);
        let jitter_millis = rand::thread_rng().gen_range(0..=capped.as_millis().max(1) as u64);
        capped + Duration::from_millis(jitter_millis)
    }
}
