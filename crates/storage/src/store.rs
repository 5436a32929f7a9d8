//! An in-memory, versioned key range store.
//!
//! This is the concrete (but swappable) backing for
//! [`resolver_core::Transaction`]/[`resolver_core::Database`] used by
//! tests and as the reference implementation — the real transactional
//! store is an external collaborator per spec §1. Grounded in the
//! teacher's sharded `DashMap`-backed maps and its
//! `TransactionManager`'s per-scope commit lock, stripped of WAL/disk
//! persistence since none of that crosses the consumed-interface
//! boundary.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;
use resolver_core::{Error, Result};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    version: u64,
}

/// A versioned, concurrency-safe key/value map with range clear and
/// optimistic-commit support.
///
/// Every key carries the store-global version at which it was last
/// written (0 if it has never been written). A transaction layer reads
/// those per-key versions into its read-set, then calls [`try_commit`]
/// with that read-set: if any read key's version has since advanced,
/// the commit is rejected as a conflict — exactly the CAS semantics
/// spec §4.2 asks for, generalized to every key rather than only the
/// state record.
///
/// [`try_commit`]: VersionedStore::try_commit
pub struct VersionedStore {
    entries: DashMap<Vec<u8>, Entry>,
    version: AtomicU64,
    // Serializes validate-then-apply so two commits can't interleave
    // between the conflict check and the write. Grounded in the
    // teacher's `TransactionManager::commit_locks`.
    commit_lock: Mutex<()>,
}

impl Default for VersionedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionedStore {
    pub fn new() -> Self {
        VersionedStore {
            entries: DashMap::new(),
            version: AtomicU64::new(0),
            commit_lock: Mutex::new(()),
        }
    }

    /// Current store-global version (the version the next commit will produce).
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Read a key's value and the version it was last written at.
    /// Absent keys read as version 0.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).map(|e| e.value.clone())
    }

    /// The version a key was last written at, or 0 if it has never
    /// been written. Used to build a transaction's read-set.
    pub fn version_of(&self, key: &[u8]) -> u64 {
        self.entries.get(key).map(|e| e.version).unwrap_or(0)
    }

    /// All live keys in `[lo, hi)`, in no particular order — callers
    /// needing sorted output (none currently do) must sort themselves.
    pub fn scan_range(&self, lo: &[u8], hi: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.entries
            .iter()
            .filter(|entry| {
                let k = entry.key().as_slice();
                k >= lo && k < hi
            })
            .map(|entry| (entry.key().clone(), entry.value().value.clone()))
            .collect()
    }

    /// Validate `reads` against the current store, and if none have
    /// changed since they were observed, atomically apply `writes` and
    /// clear `delete_ranges`, bumping the store version once.
    ///
    /// Returns the new version on success, or `Error::Conflict` naming
    /// the first key found to have changed.
    pub fn try_commit(
        &self,
        reads: &[(Vec<u8>, u64)],
        writes: Vec<(Vec<u8>, Vec<u8>)>,
        delete_ranges: Vec<(Vec<u8>, Vec<u8>)>,
    ) -> Result<u64> {
        let _guard = self.commit_lock.lock();

        for (key, expected_version) in reads {
            let actual = self.version_of(key);
            if actual != *expected_version {
                tracing::trace!(?key, expected_version, actual, "commit conflict");
                return Err(Error::Conflict(format!(
                    "key {key:?} changed (expected version {expected_version}, now {actual})"
                )));
            }
        }

        let new_version = self.version.fetch_add(1, Ordering::AcqRel) + 1;

        for (lo, hi) in &delete_ranges {
            self.entries.retain(|k, _| !(k.as_slice() >= lo.as_slice() && k.as_slice() < hi.as_slice()));
        }
        for (key, value) in writes {
            self.entries.insert(
                key,
                Entry {
                    value,
                    version: new_version,
                },
            );
        }

        Ok(new_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn absent_key_has_version_zero() {
        let store = VersionedStore::new();
        assert_eq!(store.version_of(b"missing"), 0);
        assert_eq!(store.get(b"missing"), None);
    }

    #[test]
    fn commit_without_conflicting_reads_applies_writes() {
        let store = VersionedStore::new();
        let new_version = store
            .try_commit(&[], vec![(b"k".to_vec(), b"v".to_vec())], vec![])
            .unwrap();
        assert_eq!(new_version, 1);
        assert_eq!(store.get(b"k"), Some(b"v".to_vec()));
        assert_eq!(store.version_of(b"k"), 1);
    }

    #[test]
    fn stale_read_causes_conflict() {
        let store = VersionedStore::new();
        store
            .try_commit(&[], vec![(b"k".to_vec(), b"v1".to_vec())], vec![])
            .unwrap();

        // A transaction that read `k` at version 0 (before the write above)
        // tries to commit after the fact: it must be rejected.
        let result = store.try_commit(&[(b"k".to_vec(), 0)], vec![(b"other".to_vec(), b"x".to_vec())], vec![]);
        assert!(matches!(result, Err(Error::Conflict(_))));
        // The rejected commit must not have applied its writes.
        assert_eq!(store.get(b"other"), None);
    }

    #[test]
    fn matching_read_version_commits_cleanly() {
        let store = VersionedStore::new();
        let v1 = store
            .try_commit(&[], vec![(b"k".to_vec(), b"v1".to_vec())], vec![])
            .unwrap();
        let v2 = store
            .try_commit(&[(b"k".to_vec(), v1)], vec![(b"k".to_vec(), b"v2".to_vec())], vec![])
            .unwrap();
        assert_eq!(v2, v1 + 1);
        assert_eq!(store.get(b"k"), Some(b"v2".to_vec()));
    }

    #[test]
    fn clear_range_removes_only_keys_in_range() {
        let store = VersionedStore::new();
        store
            .try_commit(
                &[],
                vec![
                    (b"a".to_vec(), b"1".to_vec()),
                    (b"b".to_vec(), b"2".to_vec()),
                    (b"c".to_vec(), b"3".to_vec()),
                ],
                vec![],
            )
            .unwrap();
        store
            .try_commit(&[], vec![], vec![(b"a".to_vec(), b"c".to_vec())])
            .unwrap();
        assert_eq!(store.get(b"a"), None);
        assert_eq!(store.get(b"b"), None);
        assert_eq!(store.get(b"c"), Some(b"3".to_vec()));
    }

    #[test]
    fn scan_range_returns_keys_in_bounds() {
        let store = VersionedStore::new();
        store
            .try_commit(
                &[],
                vec![
                    (b"scope/a".to_vec(), b"1".to_vec()),
                    (b"scope/b".to_vec(), b"2".to_vec()),
                    (b"other/a".to_vec(), b"3".to_vec()),
                ],
                vec![],
            )
            .unwrap();
        let mut found = store.scan_range(b"scope/", b"scope0");
        found.sort();
        assert_eq!(
            found,
            vec![
                (b"scope/a".to_vec(), b"1".to_vec()),
                (b"scope/b".to_vec(), b"2".to_vec()),
            ]
        );
    }

    proptest! {
        /// A transaction's read-set is exactly what makes the CAS in
        /// spec §4.2 work: any commit that read a key at a stale version
        /// must be rejected, no matter how many unrelated writes are
        /// interleaved around it.
        #[test]
        fn stale_read_version_always_conflicts(
            unrelated_writes in proptest::collection::vec(("[a-z]{1,4}", "[a-z]{1,4}"), 0..5),
        ) {
            let store = VersionedStore::new();
            let v0 = store
                .try_commit(&[], vec![(b"k".to_vec(), b"v0".to_vec())], vec![])
                .unwrap();

            for (k, v) in &unrelated_writes {
                store
                    .try_commit(&[], vec![(k.as_bytes().to_vec(), v.as_bytes().to_vec())], vec![])
                    .unwrap();
            }

            // A transaction that pinned `k` at v0 must still conflict even
            // after unrelated keys have since been written.
            let result = store.try_commit(&[(b"k".to_vec(), v0 - 1)], vec![], vec![]);
            prop_assert!(matches!(result, Err(Error::Conflict(_))));
        }

        /// Every successful commit strictly advances the store version,
        /// and a read pinned at the version it observed right after that
        /// commit never conflicts against itself.
        #[test]
        fn matching_read_version_never_spuriously_conflicts(
            writes in proptest::collection::vec(("[a-z]{1,4}", "[a-z]{1,4}"), 1..10),
        ) {
            let store = VersionedStore::new();
            let mut last_version = 0u64;
            for (k, v) in &writes {
                let key = k.as_bytes().to_vec();
                let read_version = store.version_of(&key);
                let new_version = store
                    .try_commit(&[(key.clone(), read_version)], vec![(key, v.as_bytes().to_vec())], vec![])
                    .unwrap();
                prop_assert!(new_version > last_version);
                last_version = new_version;
            }
        }
    }
}
