//! Hook typing (spec §4.5, §4.5.1, §9): caller-supplied predicates and
//! metadata producers, plain `Fn` trait objects so any matching closure
//! works without the caller naming a concrete type.

use resolver_core::{Subspace, Transaction};

use crate::error::Result;

/// Evaluated lazily before every create, never when the entry already
/// exists. `false` fails the create with `LOCKED`.
///
/// Takes the in-flight transaction and the scope's subspace rather than
/// a full engine handle: a hook that could call back into the engine's
/// own create path would reenter the very transaction it's guarding,
/// which spec §9 rules out by requiring hooks be side-effect-free with
/// respect to the resolver itself.
pub trait PreWriteCheck: Fn(&mut dyn Transaction, &Subspace) -> Result<bool> + Send + Sync {}
impl<F> PreWriteCheck for F where F: Fn(&mut dyn Transaction, &Subspace) -> Result<bool> + Send + Sync {}

/// Produces the immutable metadata stored alongside a newly created
/// entry. Runs only on create; never consulted for an existing key.
pub trait MetadataHook: Fn(&str) -> Option<Vec<u8>> + Send + Sync {}
impl<F> MetadataHook for F where F: Fn(&str) -> Option<Vec<u8>> + Send + Sync {}

/// Default pre-write check: always permits the create.
pub fn allow_all(_txn: &mut dyn Transaction, _subspace: &Subspace) -> Result<bool> {
    Ok(true)
}

/// Default metadata hook: no metadata.
pub fn no_metadata(_key: &str) -> Option<Vec<u8>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolver_concurrency::InMemoryDatabase;
    use resolver_core::Database;

    #[test]
    fn allow_all_permits() {
        let db = InMemoryDatabase::new();
        let subspace = Subspace::new(b"scope".to_vec());
        let allowed = db.run(|txn| allow_all(txn, &subspace)).unwrap();
        assert!(allowed);
    }

    #[test]
    fn no_metadata_is_none() {
        assert_eq!(no_metadata("anything"), None);
    }

    #[test]
    fn closures_satisfy_the_hook_traits() {
        fn accepts_check(_c: &dyn PreWriteCheck) {}
        fn accepts_hook(_h: &dyn MetadataHook) {}
        accepts_check(&|_txn: &mut dyn Transaction, _s: &Subspace| Ok(true));
        accepts_hook(&|k: &str| Some(k.as_bytes().to_vec()));
    }
}
