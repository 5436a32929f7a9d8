//! State Refresher (spec §4.7): each engine remembers `(state,
//! read_at)` and trusts it until `refresh_period` elapses, at which
//! point the next operation that needs state pays for one
//! transactional read and updates the cache. No background thread is
//! spawned — per spec §9's cooperative/opportunistic option, refresh
//! happens on the next operation that needs it, which meets the
//! staleness bound in spec §5 without a second moving part.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use resolver_core::ResolverState;

use crate::error::Result;

pub struct StateRefresher {
    last: Mutex<Option<(ResolverState, Instant)>>,
    period: Duration,
}

impl StateRefresher {
    pub fn new(period: Duration) -> Self {
        StateRefresher {
            last: Mutex::new(None),
            period,
        }
    }

    /// Returns the cached state if it's younger than `period`, otherwise
    /// calls `read` for a fresh one and remembers it. The bool is `true`
    /// when the observed version differs from what was cached before
    /// this call (including the very first call) — the signal the
    /// engine uses to decide whether to invalidate the cache layer.
    pub fn current(&self, read: impl FnOnce() -> Result<ResolverState>) -> Result<(ResolverState, bool)> {
        let mut guard = self.last.lock();
        if let Some((state, read_at)) = *guard {
            if read_at.elapsed() < self.period {
                return Ok((state, false));
            }
        }
        let fresh = read()?;
        let changed = guard.map(|(prev, _)| prev.version != fresh.version).unwrap_or(true);
        *guard = Some((fresh, Instant::now()));
        Ok((fresh, changed))
    }
}
