use crate::common::constants::PAGE_SIZE;
use crate::common::Result;
use crate::storage::page::{bincode_options, decode_from_frame, encode_into_frame};
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// One bucket page of a linear-probe hash table: `array_size` slots, each
/// a `(key, value)` pair plus two parallel flags, `occupied` (ever
/// written) and `readable` (currently live). `occupied && !readable` is a
/// tombstone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockPage<K, V> {
    occupied: Vec<bool>,
    readable: Vec<bool>,
    slots: Vec<Option<(K, V)>>,
}

impl<K, V> BlockPage<K, V>
where
    K: Clone + PartialEq + Default + Serialize + DeserializeOwned,
    V: Clone + PartialEq + Default + Serialize + DeserializeOwned,
{
    pub fn new(array_size: usize) -> Self {
        BlockPage {
            occupied: vec![false; array_size],
            readable: vec![false; array_size],
            slots: vec![None; array_size],
        }
    }

    pub fn array_size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        self.occupied[slot]
    }

    pub fn is_readable(&self, slot: usize) -> bool {
        self.readable[slot]
    }

    pub fn key_at(&self, slot: usize) -> Option<&K> {
        self.slots[slot].as_ref().map(|(k, _)| k)
    }

    pub fn value_at(&self, slot: usize) -> Option<&V> {
        self.slots[slot].as_ref().map(|(_, v)| v)
    }

    /// Writes `(key, value)` into `slot` if it is not already readable.
    /// Returns `false` (no-op) if the slot is already readable — the
    /// caller (LinearProbeHashTable::Insert) is responsible for deciding
    /// whether that constitutes a duplicate or simply a probe miss.
    pub fn insert(&mut self, slot: usize, key: K, value: V) -> bool {
        if self.readable[slot] {
            return false;
        }
        self.slots[slot] = Some((key, value));
        self.occupied[slot] = true;
        self.readable[slot] = true;
        true
    }

    /// Tombstones `slot`: clears `readable`, leaves `occupied` set so
    /// later probes keep scanning past it.
    pub fn remove(&mut self, slot: usize) {
        self.readable[slot] = false;
    }

    /// Number of currently-live (readable) slots, for an honest
    /// `LinearProbeHashTable::GetSize`.
    pub fn readable_count(&self) -> usize {
        self.readable.iter().filter(|&&b| b).count()
    }

    pub fn from_frame(frame: &[u8; PAGE_SIZE]) -> Result<Self> {
        decode_from_frame(frame)
    }

    pub fn write_to_frame(&self, frame: &mut [u8; PAGE_SIZE]) -> Result<()> {
        encode_into_frame(self, frame)
    }

    /// Largest `array_size` whose fully-populated encoding still fits in
    /// one PAGE_SIZE frame, for this `(K, V)` pair. Computed once at
    /// table construction time (BLOCK_ARRAY_SIZE is derived from
    /// PAGE_SIZE and slot size, per SPEC_FULL.md §6).
    pub fn max_array_size() -> usize {
        let opts = bincode_options();
        let mut n = (PAGE_SIZE / 4).max(1);
        loop {
            let probe = Self::full_for_sizing(n);
            let size = opts.serialized_size(&probe).unwrap_or(u64::MAX) as usize;
            if size <= PAGE_SIZE || n <= 1 {
                return n;
            }
            n -= 1;
        }
    }

    fn full_for_sizing(n: usize) -> Self {
        BlockPage {
            occupied: vec![true; n],
            readable: vec![true; n],
            slots: vec![Some((K::default(), V::default())); n],
        }
    }
}
