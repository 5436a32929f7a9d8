//! Data model (spec §3): the entities exchanged across the resolver
//! engine, cache layer, and state store.

/// The persisted and cached result of resolving a key: its dense integer
/// value plus optional immutable metadata attached at creation.
///
/// Not `Copy` — metadata is heap-allocated and most reads only need the
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverResult {
    pub value: u64,
    pub metadata: Option<Vec<u8>>,
}

impl ResolverResult {
    pub fn new(value: u64, metadata: Option<Vec<u8>>) -> Self {
        ResolverResult { value, metadata }
    }
}

/// A scope's write-lock state. `Unlocked -> WriteLocked -> Unlocked` via
/// `enable_write_lock`/`disable_write_lock`; `Unlocked -> Retired` is
/// terminal and only reachable via `exclusive_lock`.
///
/// Encoded as `u8` (0/1/2) in the persisted state record — this layout
/// is bit-stable, see `resolver-core::pack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Unlocked,
    WriteLocked,
    Retired,
}

impl LockState {
    pub fn to_u8(self) -> u8 {
        match self {
            LockState::Unlocked => 0,
            LockState::WriteLocked => 1,
            LockState::Retired => 2,
        }
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(LockState::Unlocked),
            1 => Some(LockState::WriteLocked),
            2 => Some(LockState::Retired),
            _ => None,
        }
    }

    /// `true` for any state in which new creates must fail `LOCKED`.
    pub fn blocks_create(self) -> bool {
        matches!(self, LockState::WriteLocked | LockState::Retired)
    }
}

/// Default allocation floor used when no state record has ever been
/// written for a scope.
pub const DEFAULT_WINDOW_HIGH: u64 = 0;

/// The resolver's persisted admin state: `{version, lock, window_high}`.
///
/// Absence of a stored record decodes to
/// `{version: 0, lock: Unlocked, window_high: DEFAULT_WINDOW_HIGH}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverState {
    pub version: u32,
    pub lock: LockState,
    pub window_high: u64,
}

impl Default for ResolverState {
    fn default() -> Self {
        ResolverState {
            version: 0,
            lock: LockState::Unlocked,
            window_high: DEFAULT_WINDOW_HIGH,
        }
    }
}

impl ResolverState {
    /// A new state with `version` bumped by one, used by every admin
    /// mutation (`set_window`, `increment_version`, the lock toggles,
    /// `update_metadata_and_version`).
    pub fn with_bumped_version(self) -> Self {
        ResolverState {
            version: self.version.wrapping_add(1),
            ..self
        }
    }

    /// Raises the allocation floor monotonically: `window_high =
    /// max(window_high, w)`. Bumps version whenever the floor actually moves.
    pub fn with_window(self, w: u64) -> Self {
        if w > self.window_high {
            ResolverState {
                window_high: w,
                ..self
            }
            .with_bumped_version()
        } else {
            self
        }
    }
}

/// A `[low, high)` shard of integers claimed by one allocation attempt.
///
/// Disjoint shards across concurrent allocators are what gives the
/// allocator its progress guarantee (spec §4.3): two callers racing for
/// the same shard observe a commit conflict and simply draw a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationWindow {
    pub low: u64,
    pub high: u64,
}

impl AllocationWindow {
    pub fn new(low: u64, high: u64) -> Self {
        debug_assert!(low < high, "allocation window must be non-empty");
        AllocationWindow { low, high }
    }

    pub fn len(&self) -> u64 {
        self.high - self.low
    }

    pub fn is_empty(&self) -> bool {
        self.low >= self.high
    }

    pub fn contains(&self, value: u64) -> bool {
        value >= self.low && value < self.high
    }
}
