//! Consumed-interface traits (spec §6): the boundary this crate treats
//! the transactional store as an external collaborator through.
//!
//! `resolver-storage` + `resolver-concurrency` provide one concrete,
//! in-memory implementation of these traits for tests and as a
//! reference; a production deployment swaps in a client for the real
//! distributed store without touching `resolver-engine`.

use crate::error::{Error, Result};

/// One transaction against the store.
///
/// Mirrors the teacher's `KVStore`/`TransactionContext` read-your-writes
/// contract: a `get` after a `set` within the same transaction observes
/// the write, even before `commit`.
pub trait Transaction {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>>;
    fn set(&mut self, key: &[u8], value: &[u8]);
    fn clear_range(&mut self, lo: &[u8], hi: &[u8]);
    fn commit(self: Box<Self>) -> Result<()>;
}

/// A handle to the transactional store.
///
/// `run` is generic over the closure's error type `E` so that a layer
/// built on top of this trait (the resolver engine) can fail a
/// transaction attempt with its own richer error vocabulary
/// (`LOCKED`, `CONFLICT`, `NOT_FOUND`, ...) instead of being limited to
/// the store's own `Error`. Retries apply only to conflicts detected at
/// commit time — a domain error returned directly by `f` aborts the
/// attempt immediately and is never retried, matching spec §4.5's
/// "lock violations, conflicts, and pre-write failures are ...
/// non-retryable."
pub trait Database: Send + Sync {
    fn run<T, E>(&self, f: impl FnMut(&mut dyn Transaction) -> std::result::Result<T, E>) -> std::result::Result<T, E>
    where
        E: From<Error>;
}
