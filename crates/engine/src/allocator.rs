//! Allocator (spec §4.3): assigns a fresh integer from a striped
//! allocation window, guaranteeing uniqueness across concurrent
//! writers and bounded-retry progress under contention.
//!
//! The shard size and probe strategy are explicitly left open by the
//! spec (§9) — this one draws a pseudo-random shard above
//! `max(window_high, counter)`, probes its slots in random order by
//! checking the reverse store, and falls through to the next shard if
//! every slot in the current one is already claimed. Uniqueness across
//! processes comes from the reverse-key read landing in the
//! transaction's read-set: two transactions racing for the same
//! candidate conflict at commit, and the loser is replayed by
//! `Database::run` with a freshly drawn shard.

use rand::seq::SliceRandom;
use rand::Rng;

use resolver_core::{pack_u64, unpack_u64, Subspace, Transaction};

use crate::error::{ResolverError, Result};

/// `state() || 0x01` — an internal scratch counter distinct from the
/// literal state record at `state()` itself. Tracks a high-water mark
/// so successive allocations tend to draw from higher, less-contested
/// shards; it is not part of the bit-stable external layout in spec §6.
fn counter_key(subspace: &Subspace) -> Vec<u8> {
    let mut key = subspace.state();
    key.push(0x01);
    key
}

fn read_counter(txn: &mut dyn Transaction, subspace: &Subspace) -> Result<u64> {
    match txn.get(&counter_key(subspace)).map_err(ResolverError::from)? {
        Some(bytes) => Ok(unpack_u64(&bytes).map_err(ResolverError::from)?),
        None => Ok(0),
    }
}

fn write_counter(txn: &mut dyn Transaction, subspace: &Subspace, value: u64) {
    txn.set(&counter_key(subspace), &pack_u64(value));
}

/// Raises the counter floor to at least `w` — called by `setWindow(W)`
/// per spec §4.3 ("the counter is advanced to max(counter, W)").
pub fn raise_counter_floor(txn: &mut dyn Transaction, subspace: &Subspace, w: u64) -> Result<()> {
    let counter = read_counter(txn, subspace)?;
    if w > counter {
        write_counter(txn, subspace, w);
    }
    Ok(())
}

/// Claim and return a fresh integer `>= window_high`, writing the new
/// counter high-water mark into `txn`. Does not write the forward or
/// reverse entry — the caller writes both, plus this claim, atomically.
pub fn allocate(
    txn: &mut dyn Transaction,
    subspace: &Subspace,
    window_high: u64,
    shard_size: u64,
    max_probes: u32,
) -> Result<u64> {
    let shard_size = shard_size.max(1);
    let counter = read_counter(txn, subspace)?;
    let floor = window_high.max(counter);

    let spread = shard_size.saturating_mul(64).max(shard_size);
    let mut rng = rand::thread_rng();
    let mut shard_start = floor.saturating_add(rng.gen_range(0..spread));

    let mut probes = 0u32;
    loop {
        let mut offsets: Vec<u64> = (0..shard_size).collect();
        offsets.shuffle(&mut rng);

        for offset in offsets {
            if probes >= max_probes {
                return Err(ResolverError::RetryExhausted(format!(
                    "allocator exhausted {max_probes} probes above floor {floor}"
                )));
            }
            probes += 1;

            let candidate = shard_start.saturating_add(offset);
            let reverse_key = subspace.reverse_key(&pack_u64(candidate));
            if txn.get(&reverse_key).map_err(ResolverError::from)?.is_none() {
                write_counter(txn, subspace, counter.max(candidate.saturating_add(1)));
                return Ok(candidate);
            }
        }

        shard_start = shard_start.saturating_add(shard_size);
    }
}
