//! Data model, wire encoding, subspace addressing, and the store-facing
//! traits shared by every other `resolver-*` crate.
//!
//! Nothing in this crate knows how to allocate an integer or run a
//! retry loop — it only defines the shapes and the boundary that the
//! concurrency and engine layers build on top of.

mod domain;
mod error;
mod pack;
mod subspace;
mod traits;

pub use domain::{AllocationWindow, LockState, ResolverResult, ResolverState, DEFAULT_WINDOW_HIGH};
pub use error::{Error, Result};
pub use pack::{pack, pack_str, pack_u64, unpack, unpack_str, unpack_u64, Element};
pub use subspace::{ScopeId, Subspace};
pub use traits::{Database, Transaction};
