//! Resolver State Store (spec §4.2): the single record at `state()`
//! carrying `{version, lock, window_high}`.
//!
//! Writers always read-modify-write inside the caller's transaction
//! and rely on the transaction's own OCC validation for CAS semantics
//! — the read of the state key that every writer performs first is
//! enough to pin its version in the transaction's read-set, so no
//! separate compare primitive is needed here.

use resolver_core::{pack, unpack, Element, LockState, ResolverState, Subspace, Transaction};

use crate::error::{ResolverError, Result};

/// Read the state record, decoding absence as the documented default.
pub fn read_state(txn: &mut dyn Transaction, subspace: &Subspace) -> Result<ResolverState> {
    let key = subspace.state();
    let raw = txn
        .get(&key)
        .map_err(ResolverError::from)?;
    let Some(bytes) = raw else {
        return Ok(ResolverState::default());
    };
    decode_state(&bytes)
}

/// Write the state record under `subspace.state()`.
pub fn write_state(txn: &mut dyn Transaction, subspace: &Subspace, state: ResolverState) {
    let key = subspace.state();
    txn.set(&key, &encode_state(state));
}

fn encode_state(state: ResolverState) -> Vec<u8> {
    pack(&[
        Element::U64(state.version as u64),
        Element::Bytes(vec![state.lock.to_u8()]),
        Element::U64(state.window_high),
    ])
}

fn decode_state(bytes: &[u8]) -> Result<ResolverState> {
    let elements = unpack(bytes).map_err(|_| {
        ResolverError::StateCorrupt(format!("undecodable state record ({} bytes)", bytes.len()))
    })?;
    let [Element::U64(version), Element::Bytes(lock_byte), Element::U64(window_high)] =
        elements.as_slice()
    else {
        return Err(ResolverError::StateCorrupt(
            "state record has unexpected shape".into(),
        ));
    };
    let lock_byte = *lock_byte.first().ok_or_else(|| {
        ResolverError::StateCorrupt("state record missing lock byte".into())
    })?;
    let lock = LockState::from_u8(lock_byte).ok_or_else(|| {
        ResolverError::StateCorrupt(format!("unrecognized lock byte {lock_byte}"))
    })?;
    Ok(ResolverState {
        version: *version as u32,
        lock,
        window_high: *window_high,
    })
}
