//! Resolver Engine (spec §4.5): the read-then-create protocol,
//! pre-write checks, metadata hook invocation, locking enforcement, and
//! the admin operations that mutate `ResolverState`.

use std::sync::Arc;

use resolver_core::{
    Database, LockState, ResolverResult, ResolverState, ScopeId, Subspace, Transaction,
};

use crate::allocator;
use crate::cache::CacheLayer;
use crate::config::ResolverConfig;
use crate::error::{ResolverError, Result};
use crate::forward::{read_forward, write_forward};
use crate::hooks::{allow_all, no_metadata, MetadataHook, PreWriteCheck};
use crate::refresher::StateRefresher;
use crate::reverse::{read_reverse, write_reverse};
use crate::state::{read_state, write_state};

/// A transactional, scope-aware bidirectional directory anchored at one
/// `Subspace`. Cheap to construct; owns its own state refresher but
/// shares its caches with any other `ResolverEngine` built over the
/// same `CacheLayer` and byte prefix (spec §3, `ScopedValue<T>`).
///
/// Generic over the store handle `D` rather than holding `Arc<dyn
/// Database>`: `Database::run` is generic over the caller's error type
/// (so the resolver can fail a transaction attempt with its own
/// `ResolverError` instead of being limited to the store's `Error`),
/// which makes `Database` itself not object-safe — there is no `dyn
/// Database` to store. Swapping the backing store for production means
/// instantiating `ResolverEngine<YourStoreHandle>`, not boxing a trait
/// object.
pub struct ResolverEngine<D: Database> {
    db: Arc<D>,
    subspace: Subspace,
    scope_id: ScopeId,
    cache: Arc<CacheLayer>,
    refresher: StateRefresher,
    config: ResolverConfig,
}

impl<D: Database> ResolverEngine<D> {
    pub fn new(db: Arc<D>, subspace: Subspace, cache: Arc<CacheLayer>, config: ResolverConfig) -> Self {
        let scope_id = subspace.scope_id();
        let refresher = StateRefresher::new(config.refresh_period);
        ResolverEngine {
            db,
            subspace,
            scope_id,
            cache,
            refresher,
            config,
        }
    }

    pub fn scope_id(&self) -> &ScopeId {
        &self.scope_id
    }

    pub fn subspace(&self) -> &Subspace {
        &self.subspace
    }

    /// Opportunistically refreshes the locally-cached state and, if its
    /// version moved since the last observation, invalidates this
    /// scope's cache entries (spec §4.7). Cheap when within the
    /// refresh period: no store access at all.
    fn maybe_refresh(&self) -> Result<()> {
        let db = &self.db;
        let subspace = &self.subspace;
        let (state, changed) = self
            .refresher
            .current(|| db.run(|txn| read_state(txn, subspace)))?;
        if changed {
            tracing::debug!(version = state.version, "state refresh: version advanced, invalidating scope caches");
            self.cache.invalidate_scope(&self.scope_id);
        }
        Ok(())
    }

    /// The cached state version (spec §4.5 `getVersion`), subject to
    /// the refresher's staleness bound.
    pub fn version(&self) -> Result<u32> {
        self.maybe_refresh()?;
        let db = &self.db;
        let subspace = &self.subspace;
        let (state, _) = self.refresher.current(|| db.run(|txn| read_state(txn, subspace)))?;
        Ok(state.version)
    }

    /// `resolve(key)`: cache hit, else read-then-create with default
    /// (always-true / no-metadata) hooks.
    pub fn resolve(&self, key: &str) -> Result<ResolverResult> {
        self.resolve_inner(key, &allow_all, &no_metadata)
    }

    /// `resolve(key, hooks)`: as [`Self::resolve`] but with
    /// caller-supplied pre-write check and metadata hook.
    pub fn resolve_with_hooks(
        &self,
        key: &str,
        pre_write_check: &dyn PreWriteCheck,
        metadata_hook: &dyn MetadataHook,
    ) -> Result<ResolverResult> {
        self.resolve_inner(key, pre_write_check, metadata_hook)
    }

    /// `resolveWithMetadata(key, hooks)`: identical contract to
    /// [`Self::resolve_with_hooks`] — `ResolverResult` already carries
    /// the metadata half, so there is no separate return shape.
    pub fn resolve_with_metadata(
        &self,
        key: &str,
        pre_write_check: &dyn PreWriteCheck,
        metadata_hook: &dyn MetadataHook,
    ) -> Result<ResolverResult> {
        self.resolve_inner(key, pre_write_check, metadata_hook)
    }

    fn resolve_inner(
        &self,
        key: &str,
        pre_write_check: &dyn PreWriteCheck,
        metadata_hook: &dyn MetadataHook,
    ) -> Result<ResolverResult> {
        self.maybe_refresh()?;
        if let Some(hit) = self.cache.get_forward(&self.scope_id, key) {
            tracing::trace!(key, "resolve: cache hit");
            return Ok(hit);
        }

        tracing::debug!(key, "resolve: cache miss, opening transaction");
        let subspace = &self.subspace;
        let shard_size = self.config.shard_size;
        let max_probes = self.config.max_allocation_retries;
        let mut created = false;

        let result = self.db.run(|txn| {
            let state = read_state(txn, subspace)?;

            if let Some(existing) = read_forward(txn, subspace, key)? {
                return Ok(existing);
            }

            if state.lock.blocks_create() {
                return Err(ResolverError::Locked(format!(
                    "resolver is {:?}; cannot create key {key:?}",
                    state.lock
                )));
            }

            if !pre_write_check(txn, subspace)? {
                return Err(ResolverError::Locked("prewrite check failed".into()));
            }

            let metadata = metadata_hook(key);
            let value = allocator::allocate(txn, subspace, state.window_high, shard_size, max_probes)?;
            tracing::debug!(key, value, "resolve: allocated new value");
            created = true;
            let entry = ResolverResult::new(value, metadata);
            write_forward(txn, subspace, key, &entry);
            write_reverse(txn, subspace, value, key);
            Ok(entry)
        })?;
        tracing::debug!(key, value = result.value, created, "resolve: committed");

        self.cache.put_forward(&self.scope_id, key, result.clone());
        self.cache.put_reverse(&self.scope_id, result.value, key.to_string());
        Ok(result)
    }

    /// `reverseLookup(value)`: never creates; `NOT_FOUND` if absent.
    pub fn reverse_lookup(&self, value: u64) -> Result<String> {
        self.maybe_refresh()?;
        if let Some(hit) = self.cache.get_reverse(&self.scope_id, value) {
            return Ok(hit);
        }

        let subspace = &self.subspace;
        let found = self.db.run(|txn| read_reverse(txn, subspace, value))?;
        match found {
            Some(key) => {
                self.cache.put_reverse(&self.scope_id, value, key.clone());
                Ok(key)
            }
            None => Err(ResolverError::NotFound(format!("value {value} not found"))),
        }
    }

    /// `mustResolve(key)`: like `resolve` but never creates; `NOT_FOUND`
    /// if absent. Never invokes hooks.
    pub fn must_resolve(&self, key: &str) -> Result<ResolverResult> {
        match self.read(key)? {
            Some(result) => Ok(result),
            None => Err(ResolverError::NotFound(format!("key {key:?} not found"))),
        }
    }

    /// `read(key)`: read-only, never creates, never fails on absence.
    pub fn read(&self, key: &str) -> Result<Option<ResolverResult>> {
        self.maybe_refresh()?;
        if let Some(hit) = self.cache.get_forward(&self.scope_id, key) {
            return Ok(Some(hit));
        }

        let subspace = &self.subspace;
        let found = self.db.run(|txn| read_forward(txn, subspace, key))?;
        if let Some(result) = &found {
            self.cache.put_forward(&self.scope_id, key, result.clone());
            self.cache.put_reverse(&self.scope_id, result.value, key.to_string());
        }
        Ok(found)
    }

    /// `create(key)`: unconditionally creates; `ALREADY_EXISTS` if
    /// present (surfaced as `Conflict` per spec §7's taxonomy, which
    /// folds `ALREADY_EXISTS` into `CONFLICT`).
    pub fn create(&self, key: &str) -> Result<ResolverResult> {
        self.maybe_refresh()?;
        let subspace = &self.subspace;
        let shard_size = self.config.shard_size;
        let max_probes = self.config.max_allocation_retries;

        let result = self.db.run(|txn| {
            let state = read_state(txn, subspace)?;
            if read_forward(txn, subspace, key)?.is_some() {
                return Err(ResolverError::Conflict(format!("key {key:?} already exists")));
            }
            if state.lock.blocks_create() {
                return Err(ResolverError::Locked(format!(
                    "resolver is {:?}; cannot create key {key:?}",
                    state.lock
                )));
            }
            let value = allocator::allocate(txn, subspace, state.window_high, shard_size, max_probes)?;
            let entry = ResolverResult::new(value, None);
            write_forward(txn, subspace, key, &entry);
            write_reverse(txn, subspace, value, key);
            Ok(entry)
        })?;

        self.cache.put_forward(&self.scope_id, key, result.clone());
        self.cache.put_reverse(&self.scope_id, result.value, key.to_string());
        Ok(result)
    }

    /// `setMapping(ctx, key, value)`: writes both directions within the
    /// caller's own transaction. Idempotent if an existing forward
    /// entry already maps `key -> value` exactly; `CONFLICT` otherwise.
    pub fn set_mapping(&self, txn: &mut dyn Transaction, key: &str, value: u64) -> Result<()> {
        if let Some(existing) = read_forward(txn, &self.subspace, key)? {
            if existing.value == value {
                return Ok(());
            }
            return Err(ResolverError::Conflict(format!(
                "mapping already exists with different value for key {key:?} (existing {}, requested {value})",
                existing.value
            )));
        }

        if let Some(existing_key) = read_reverse(txn, &self.subspace, value)? {
            if existing_key != key {
                return Err(ResolverError::Conflict(format!(
                    "reverse mapping already exists with different key for value {value} (existing {existing_key:?}, requested {key:?})"
                )));
            }
        }

        write_forward(txn, &self.subspace, key, &ResolverResult::new(value, None));
        write_reverse(txn, &self.subspace, value, key);
        Ok(())
    }

    /// Convenience wrapper over [`Self::set_mapping`] that opens its own
    /// transaction — for callers that don't already have one in hand.
    pub fn set_mapping_now(&self, key: &str, value: u64) -> Result<()> {
        self.db.run(|txn| self.set_mapping(txn, key, value))?;
        self.cache.invalidate_scope(&self.scope_id);
        Ok(())
    }

    /// `setWindow(W)`: raises the allocation floor monotonically and
    /// bumps the state version whenever the floor actually moves.
    pub fn set_window(&self, w: u64) -> Result<()> {
        let subspace = &self.subspace;
        self.db.run(|txn| {
            let state = read_state(txn, subspace)?;
            let new_state = state.with_window(w);
            if new_state != state {
                write_state(txn, subspace, new_state);
            }
            allocator::raise_counter_floor(txn, subspace, w)?;
            Ok(())
        })?;
        self.cache.invalidate_scope(&self.scope_id);
        Ok(())
    }

    /// `incrementVersion()`: bumps `version` with no other state change.
    pub fn increment_version(&self) -> Result<()> {
        let subspace = &self.subspace;
        self.db.run(|txn| {
            let state = read_state(txn, subspace)?;
            write_state(txn, subspace, state.with_bumped_version());
            Ok(())
        })?;
        self.cache.invalidate_scope(&self.scope_id);
        Ok(())
    }

    /// `enableWriteLock()`: `Unlocked -> WriteLocked`. Idempotent if
    /// already write-locked.
    pub fn enable_write_lock(&self) -> Result<()> {
        self.set_lock(LockState::WriteLocked)
    }

    /// `disableWriteLock()`: `WriteLocked -> Unlocked`. Idempotent if
    /// already unlocked.
    pub fn disable_write_lock(&self) -> Result<()> {
        self.set_lock(LockState::Unlocked)
    }

    fn set_lock(&self, lock: LockState) -> Result<()> {
        let subspace = &self.subspace;
        self.db.run(|txn| {
            let state = read_state(txn, subspace)?;
            if state.lock == lock {
                return Ok(());
            }
            let new_state = ResolverState { lock, ..state }.with_bumped_version();
            write_state(txn, subspace, new_state);
            Ok(())
        })?;
        self.cache.invalidate_scope(&self.scope_id);
        Ok(())
    }

    /// `exclusiveLock()`: `Unlocked -> Retired`, terminal. Requires the
    /// current state to be `Unlocked`; among N racing callers, exactly
    /// one observes `Unlocked` and commits first — every later racer's
    /// read of `state` is invalidated by that commit, and on retry it
    /// sees `Retired` and fails `LOCKED`.
    pub fn exclusive_lock(&self) -> Result<()> {
        let subspace = &self.subspace;
        self.db.run(|txn| {
            let state = read_state(txn, subspace)?;
            if state.lock != LockState::Unlocked {
                return Err(ResolverError::Locked(
                    "resolver must be unlocked to get exclusive lock".into(),
                ));
            }
            let new_state = ResolverState {
                lock: LockState::Retired,
                ..state
            }
            .with_bumped_version();
            write_state(txn, subspace, new_state);
            Ok(())
        })?;
        self.cache.invalidate_scope(&self.scope_id);
        Ok(())
    }

    /// `updateMetadataAndVersion(key, metadata)`: overwrites metadata on
    /// an existing entry and bumps the state version so caches refresh.
    pub fn update_metadata_and_version(&self, key: &str, metadata: Option<Vec<u8>>) -> Result<()> {
        let subspace = &self.subspace;
        self.db.run(|txn| {
            let existing = read_forward(txn, subspace, key)?
                .ok_or_else(|| ResolverError::NotFound(format!("key {key:?} not found")))?;
            let updated = ResolverResult::new(existing.value, metadata.clone());
            write_forward(txn, subspace, key, &updated);
            let state = read_state(txn, subspace)?;
            write_state(txn, subspace, state.with_bumped_version());
            Ok(())
        })?;
        self.cache.invalidate_scope(&self.scope_id);
        Ok(())
    }
}
