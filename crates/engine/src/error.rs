//! The resolver's own error taxonomy (spec §7).
//!
//! This wraps [`resolver_core::Error`] from the store boundary in a
//! richer set of categories the engine itself can raise — a store
//! `Conflict` that survives the allocator's or the store-level retry
//! budget becomes `RetryExhausted` here, never a bare passthrough,
//! so callers always see the resolver's own vocabulary.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolverError>;

/// Errors raised by [`crate::engine::ResolverEngine`] operations.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// `mustResolve`/`reverseLookup` found nothing for the given key or value.
    #[error("not found: {0}")]
    NotFound(String),

    /// Create attempted while locked, a pre-write check failed, or an
    /// `exclusiveLock` lost the race.
    #[error("locked: {0}")]
    Locked(String),

    /// `setMapping`/`create` collided with an existing, divergent entry.
    ///
    /// Message always carries the distinguishing phrase spec §7 requires
    /// ("different value" / "different key" / entry already exists) so
    /// callers can pattern-match on it.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The allocator or a state CAS exhausted its retry budget.
    #[error("retry budget exhausted: {0}")]
    RetryExhausted(String),

    /// An undecodable state record, or a forward/reverse entry observed
    /// without its counterpart. Fatal — never retried.
    #[error("state corrupt: {0}")]
    StateCorrupt(String),

    /// Propagated from the underlying store.
    #[error("cancelled")]
    Cancelled,

    /// Propagated from the underlying store.
    #[error("timed out")]
    Timeout,
}

impl ResolverError {
    /// The allocator's/a state CAS's own retry budget is exhausted, but the
    /// underlying conflict it was racing against is transient — a caller one
    /// layer up can still retry the whole operation (spec §7).
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolverError::RetryExhausted(_))
    }

    /// `StateCorrupt` is the one category the engine treats as fatal —
    /// never retried, never silently healed (spec §4.2, §4.4).
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResolverError::StateCorrupt(_))
    }
}

impl From<resolver_core::Error> for ResolverError {
    fn from(e: resolver_core::Error) -> Self {
        match e {
            resolver_core::Error::Cancelled => ResolverError::Cancelled,
            resolver_core::Error::Timeout => ResolverError::Timeout,
            resolver_core::Error::Corrupt(bytes, detail) => {
                ResolverError::StateCorrupt(format!("{detail} (at {bytes:?})"))
            }
            resolver_core::Error::Conflict(detail) => ResolverError::RetryExhausted(detail),
            resolver_core::Error::InvalidState(detail) => ResolverError::StateCorrupt(detail),
        }
    }
}
