//! Error taxonomy for the store-facing boundary.
//!
//! This is the error type returned by [`crate::traits::Transaction`] and
//! [`crate::traits::Database`] implementations — the "consumed interface"
//! in spec terms. The resolver engine wraps this in its own richer
//! `ResolverError` (see `resolver-engine`), but the categories below are
//! shared so that a `Conflict` from the store and a `Conflict` from the
//! engine are never confused with each other's retry semantics.

use thiserror::Error;

/// Result type alias for core/store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the transactional store boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Optimistic concurrency conflict detected at commit time.
    ///
    /// Retryable: callers should re-open a transaction and try again.
    #[error("transaction conflict: {0}")]
    Conflict(String),

    /// The transaction was cancelled before it could commit.
    #[error("transaction cancelled")]
    Cancelled,

    /// The transaction exceeded its allotted time.
    #[error("transaction timed out")]
    Timeout,

    /// A stored record could not be decoded.
    ///
    /// Never retryable — the record itself is bad.
    #[error("corrupt record at {0:?}: {1}")]
    Corrupt(Vec<u8>, String),

    /// An operation was attempted against a closed or already-ended transaction.
    #[error("invalid transaction state: {0}")]
    InvalidState(String),
}

impl Error {
    /// Conflicts are the only store-level error worth retrying automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// Corruption is never safe to paper over.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Corrupt(_, _))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_is_retryable() {
        assert!(Error::Conflict("k".into()).is_retryable());
        assert!(!Error::Cancelled.is_retryable());
    }

    #[test]
    fn corrupt_is_fatal() {
        assert!(Error::Corrupt(vec![1, 2], "bad tuple".into()).is_fatal());
        assert!(!Error::Timeout.is_fatal());
    }

    #[test]
    fn display_includes_detail() {
        let e = Error::Conflict("key x".into());
        assert!(e.to_string().contains("key x"));
    }
}
