//! Forward Store (spec §4.4): `mapping() || pack(key) -> pack(value, metadata?)`.

use resolver_core::{pack, pack_str, unpack, Element, ResolverResult, Subspace, Transaction};

use crate::error::{ResolverError, Result};

fn forward_key(subspace: &Subspace, key: &str) -> Vec<u8> {
    subspace.mapping_key(&pack_str(key))
}

fn encode(result: &ResolverResult) -> Vec<u8> {
    let mut elements = vec![Element::U64(result.value)];
    if let Some(metadata) = &result.metadata {
        elements.push(Element::Bytes(metadata.clone()));
    }
    pack(&elements)
}

fn decode(bytes: &[u8]) -> Result<ResolverResult> {
    let elements = unpack(bytes).map_err(|e| {
        ResolverError::StateCorrupt(format!("undecodable forward entry: {e}"))
    })?;
    match elements.as_slice() {
        [Element::U64(value)] => Ok(ResolverResult::new(*value, None)),
        [Element::U64(value), Element::Bytes(metadata)] => {
            Ok(ResolverResult::new(*value, Some(metadata.clone())))
        }
        _ => Err(ResolverError::StateCorrupt(
            "forward entry has unexpected shape".into(),
        )),
    }
}

/// Read a forward entry, if any.
pub fn read_forward(
    txn: &mut dyn Transaction,
    subspace: &Subspace,
    key: &str,
) -> Result<Option<ResolverResult>> {
    let raw = txn.get(&forward_key(subspace, key)).map_err(ResolverError::from)?;
    raw.map(|bytes| decode(&bytes)).transpose()
}

/// Write a forward entry. Caller is responsible for writing the
/// matching reverse entry in the same transaction (spec §4.4).
pub fn write_forward(txn: &mut dyn Transaction, subspace: &Subspace, key: &str, result: &ResolverResult) {
    txn.set(&forward_key(subspace, key), &encode(result));
}
