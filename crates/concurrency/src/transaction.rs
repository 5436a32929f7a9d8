//! Optimistic transaction context: the read-set/write-set/delete-set
//! accumulator that backs a single attempt at `Database::run`'s closure.
//!
//! Grounded in the teacher's `TransactionContext` (read-your-writes
//! over a pending write set, a read-set of `(key, version)` pairs
//! validated at commit) with the branch/namespace machinery dropped —
//! this crate has exactly one store, not one per branch.

use std::collections::HashMap;
use std::sync::Arc;

use resolver_core::{Result, Transaction};
use resolver_storage::VersionedStore;

/// A single transaction attempt against a [`VersionedStore`].
///
/// `get` observes prior `set`/`clear_range` calls made on the same
/// instance (read-your-writes) before falling through to the
/// underlying store, and records every store-backed read's version so
/// `commit` can ask the store to validate them.
pub struct TransactionContext {
    store: Arc<VersionedStore>,
    reads: HashMap<Vec<u8>, u64>,
    writes: HashMap<Vec<u8>, Vec<u8>>,
    delete_ranges: Vec<(Vec<u8>, Vec<u8>)>,
}

impl TransactionContext {
    pub fn new(store: Arc<VersionedStore>) -> Self {
        TransactionContext {
            store,
            reads: HashMap::new(),
            writes: HashMap::new(),
            delete_ranges: Vec::new(),
        }
    }

    fn cleared_by_pending_delete(&self, key: &[u8]) -> bool {
        self.delete_ranges
            .iter()
            .any(|(lo, hi)| key >= lo.as_slice() && key < hi.as_slice())
    }
}

impl Transaction for TransactionContext {
    fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if let Some(value) = self.writes.get(key) {
            return Ok(Some(value.clone()));
        }
        if self.cleared_by_pending_delete(key) {
            return Ok(None);
        }
        let version = self.store.version_of(key);
        self.reads.entry(key.to_vec()).or_insert(version);
        Ok(self.store.get(key))
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.writes.insert(key.to_vec(), value.to_vec());
    }

    fn clear_range(&mut self, lo: &[u8], hi: &[u8]) {
        self.writes
            .retain(|k, _| !(k.as_slice() >= lo && k.as_slice() < hi));
        self.delete_ranges.push((lo.to_vec(), hi.to_vec()));
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let reads: Vec<(Vec<u8>, u64)> = self.reads.into_iter().collect();
        let writes: Vec<(Vec<u8>, Vec<u8>)> = self.writes.into_iter().collect();
        self.store.try_commit(&reads, writes, self.delete_ranges)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_your_own_write() {
        let store = Arc::new(VersionedStore::new());
        let mut txn = TransactionContext::new(store);
        txn.set(b"k", b"v");
        assert_eq!(txn.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn cleared_key_reads_as_absent_before_commit() {
        let store = Arc::new(VersionedStore::new());
        let mut txn = TransactionContext::new(store);
        txn.set(b"k", b"v");
        txn.clear_range(b"a", b"z");
        assert_eq!(txn.get(b"k").unwrap(), None);
    }

    #[test]
    fn commit_persists_writes_to_the_store() {
        let store = Arc::new(VersionedStore::new());
        let mut txn = TransactionContext::new(store.clone());
        txn.set(b"k", b"v");
        Box::new(txn).commit().unwrap();
        assert_eq!(store.get(b"k"), Some(b"v".to_vec()));
    }

    #[test]
    fn commit_conflicts_when_a_read_key_changed_underneath() {
        let store = Arc::new(VersionedStore::new());
        let mut first = TransactionContext::new(store.clone());
        let _ = first.get(b"k").unwrap();

        // A concurrent writer commits first.
        let mut other = TransactionContext::new(store.clone());
        other.set(b"k", b"changed");
        Box::new(other).commit().unwrap();

        first.set(b"other", b"x");
        let result = Box::new(first).commit();
        assert!(result.is_err());
    }
}
