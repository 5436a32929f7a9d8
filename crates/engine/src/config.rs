//! `ResolverConfig`: cache capacity, state refresh period, allocation
//! shard size, and allocation retry budget, in the style of the
//! teacher's `DatabaseConfig`/`RetryConfig` builders — a plain struct
//! with `with_*` setters rather than a file-backed config, since this
//! crate has no data directory of its own (spec §1 treats packaging as
//! out of scope).

use std::time::Duration;

/// Tunables for one [`crate::engine::ResolverEngine`].
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Capacity of each of the forward/reverse caches (spec §4.6, default 100).
    pub cache_capacity: usize,
    /// How long a cached state read is trusted before the next
    /// operation re-reads the store (spec §4.7, default 30s).
    pub refresh_period: Duration,
    /// Size of the candidate shard the allocator probes per attempt
    /// (spec §4.3, default 64).
    pub shard_size: u64,
    /// Upper bound on allocator slot probes before surfacing
    /// `RetryExhausted` (spec §4.3, default 30).
    pub max_allocation_retries: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            cache_capacity: 100,
            refresh_period: Duration::from_secs(30),
            shard_size: 64,
            max_allocation_retries: 30,
        }
    }
}

impl ResolverConfig {
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn with_refresh_period(mut self, refresh_period: Duration) -> Self {
        self.refresh_period = refresh_period;
        self
    }

    pub fn with_shard_size(mut self, shard_size: u64) -> Self {
        self.shard_size = shard_size;
        self
    }

    pub fn with_max_allocation_retries(mut self, max_allocation_retries: u32) -> Self {
        self.max_allocation_retries = max_allocation_retries;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = ResolverConfig::default();
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.refresh_period, Duration::from_secs(30));
        assert_eq!(config.shard_size, 64);
        assert_eq!(config.max_allocation_retries, 30);
    }

    #[test]
    fn builder_overrides_apply() {
        let config = ResolverConfig::default()
            .with_cache_capacity(8)
            .with_refresh_period(Duration::from_millis(100))
            .with_shard_size(4)
            .with_max_allocation_retries(3);
        assert_eq!(config.cache_capacity, 8);
        assert_eq!(config.refresh_period, Duration::from_millis(100));
        assert_eq!(config.shard_size, 4);
        assert_eq!(config.max_allocation_retries, 3);
    }
}
