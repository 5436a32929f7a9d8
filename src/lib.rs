//! # Locatable Resolver
//!
//! A transactional, scope-aware bidirectional directory that maps
//! opaque string keys to dense 64-bit integer identifiers, backed by a
//! distributed ordered key-value store providing serializable
//! transactions.
//!
//! Each [`ResolverEngine`] is anchored at a byte-prefix scope
//! ([`Subspace`]) derived from a resolved path; distinct prefixes form
//! independent namespaces that never see each other's keys or values.
//!
//! # Quick Start
//!
//! ```
//! use locatable_resolver::{CacheLayer, ResolverConfig, ResolverEngine, Subspace};
//! use resolver_concurrency::InMemoryDatabase;
//! use std::sync::Arc;
//!
//! let db = Arc::new(InMemoryDatabase::new());
//! let cache = Arc::new(CacheLayer::new(100));
//! let subspace = Subspace::new(b"my-app/users".to_vec());
//! let resolver = ResolverEngine::new(db, subspace, cache, ResolverConfig::default());
//!
//! let result = resolver.resolve("alice").unwrap();
//! assert_eq!(resolver.reverse_lookup(result.value).unwrap(), "alice");
//! // Re-resolving the same key always returns the same value.
//! assert_eq!(resolver.resolve("alice").unwrap().value, result.value);
//! ```
//!
//! # Architecture
//!
//! | Crate | Carries |
//! |---|---|
//! | [`resolver_core`] | Data model, pack/tuple wire encoding, subspace addressing, the `Transaction`/`Database` consumed-interface traits |
//! | [`resolver_storage`] | A reference, in-memory, versioned key range store |
//! | [`resolver_concurrency`] | Optimistic concurrency control (read-set/write-set, CAS, retry-with-backoff) over `resolver-storage` |
//! | [`resolver_engine`] | The allocator, forward/reverse stores, cache layer, state refresher, and [`ResolverEngine`] itself |
//!
//! Only `resolver-core`'s traits are load-bearing for production use:
//! swap `resolver-storage`/`resolver-concurrency` for a client against
//! the real distributed store without touching `resolver-engine` or
//! this facade.

pub use resolver_core::{
    pack, pack_str, pack_u64, unpack, unpack_str, unpack_u64, AllocationWindow, Database, Element,
    Error as StoreError, LockState, ResolverResult, ResolverState, ScopeId, Subspace, Transaction,
    DEFAULT_WINDOW_HIGH,
};
pub use resolver_engine::{
    allow_all, no_metadata, CacheLayer, MetadataHook, PreWriteCheck, ResolverConfig,
    ResolverEngine, ResolverError,
};

/// Result alias for [`ResolverEngine`] operations.
pub type Result<T> = resolver_engine::Result<T>;

// Re-exported so callers wiring up the reference in-memory store don't
// need to depend on the lower crates directly.
pub use resolver_concurrency::InMemoryDatabase;
pub use resolver_storage::VersionedStore;
