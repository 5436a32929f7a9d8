//! A reference, in-memory implementation of the transactional store
//! boundary from `resolver-core::traits`.
//!
//! Nothing here is load-bearing for the resolver's semantics — any
//! store satisfying `resolver_core::{Transaction, Database}` works.
//! This crate exists so the engine and its tests don't need a real
//! distributed store to run against.

mod store;

pub use store::VersionedStore;
