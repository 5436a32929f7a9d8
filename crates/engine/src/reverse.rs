//! Reverse Store (spec §4.4): `reverse() || pack(value) -> pack(key)`.

use resolver_core::{pack_str, pack_u64, unpack_str, Subspace, Transaction};

use crate::error::{ResolverError, Result};

fn reverse_key(subspace: &Subspace, value: u64) -> Vec<u8> {
    subspace.reverse_key(&pack_u64(value))
}

/// Read the key mapped to `value`, if any.
pub fn read_reverse(txn: &mut dyn Transaction, subspace: &Subspace, value: u64) -> Result<Option<String>> {
    let raw = txn.get(&reverse_key(subspace, value)).map_err(ResolverError::from)?;
    raw.map(|bytes| unpack_str(&bytes).map_err(ResolverError::from)).transpose()
}

/// Write a reverse entry. Caller is responsible for writing the
/// matching forward entry in the same transaction (spec §4.4).
pub fn write_reverse(txn: &mut dyn Transaction, subspace: &Subspace, value: u64, key: &str) {
    txn.set(&reverse_key(subspace, value), &pack_str(key));
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolver_concurrency::InMemoryDatabase;
    use resolver_core::Database;

    #[test]
    fn absent_value_reads_as_none() {
        let db = InMemoryDatabase::new();
        let subspace = Subspace::new(b"scope".to_vec());
        let result = db.run(|txn| read_reverse(txn, &subspace, 9)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn roundtrip() {
        let db = InMemoryDatabase::new();
        let subspace = Subspace::new(b"scope".to_vec());
        db.run(|txn| {
            write_reverse(txn, &subspace, 5, "foo");
            Ok(())
        })
        .unwrap();
        let seen = db.run(|txn| read_reverse(txn, &subspace, 5)).unwrap();
        assert_eq!(seen, Some("foo".to_string()));
    }

    #[test]
    fn distinct_values_do_not_collide() {
        let db = InMemoryDatabase::new();
        let subspace = Subspace::new(b"scope".to_vec());
        db.run(|txn| {
            write_reverse(txn, &subspace, 1, "a");
            write_reverse(txn, &subspace, 2, "b");
            Ok(())
        })
        .unwrap();
        assert_eq!(db.run(|txn| read_reverse(txn, &subspace, 1)).unwrap(), Some("a".to_string()));
        assert_eq!(db.run(|txn| read_reverse(txn, &subspace, 2)).unwrap(), Some("b".to_string()));
    }
}
