use crate::common::{Error, Result};
use crate::storage::buffer::BufferPoolManager;
use crate::storage::disk::disk_manager::PageId;
use crate::storage::frame::FrameHandle;
use crate::storage::hash::comparator::KeyComparator;
use crate::storage::hash::hash_function::HashFunction;
use crate::storage::page::{BlockPage, HeaderPage};
use serde::de::DeserializeOwned;
use serde::Serialize;

enum InsertOutcome {
    Placed,
    Duplicate,
    TableFull,
}

/// A persistent hash map from `K` to `V` whose header and bucket pages
/// live in paged storage, fetched and unpinned through a
/// `BufferPoolManager` exactly like any other page consumer
/// (SPEC_FULL.md §4.3).
pub struct LinearProbeHashTable<K, V, C, H> {
    header_page_id: PageId,
    num_buckets: usize,
    num_slots: usize,
    block_array_size: usize,
    comparator: C,
    hasher: H,
    _marker: std::marker::PhantomData<(K, V)>,
}

impl<K, V, C, H> LinearProbeHashTable<K, V, C, H>
where
    K: Clone + PartialEq + Default + Serialize + DeserializeOwned,
    V: Clone + PartialEq + Default + Serialize + DeserializeOwned,
    C: KeyComparator<K>,
    H: HashFunction<K>,
{
    /// Allocates a header page and `ceil(num_buckets / BLOCK_ARRAY_SIZE)`
    /// block pages through `bpm` up front.
    pub fn new(
        bpm: &mut BufferPoolManager,
        num_buckets: usize,
        comparator: C,
        hasher: H,
    ) -> Result<Self> {
        if num_buckets == 0 {
            return Err(Error::InvalidInput("num_buckets must be positive".into()));
        }
        let block_array_size = BlockPage::<K, V>::max_array_size();
        let num_slots = num_buckets.div_ceil(block_array_size);

        let (header_page_id, header_frame) = bpm
            .new_page()
            .ok_or_else(|| Error::InvalidInput("buffer pool exhausted while constructing hash table".into()))?;
        let mut header = HeaderPage::new(header_page_id);

        for _ in 0..num_slots {
            let (block_page_id, block_frame) = bpm.new_page().ok_or_else(|| {
                Error::InvalidInput("buffer pool exhausted while allocating hash table blocks".into())
            })?;
            let block = BlockPage::<K, V>::new(block_array_size);
            block.write_to_frame(block_frame.borrow_mut().data_mut())?;
            bpm.unpin_page(block_page_id, true);
            header.add_block_page_id(block_page_id);
        }

        header.write_to_frame(header_frame.borrow_mut().data_mut())?;
        bpm.unpin_page(header_page_id, true);
        log::debug!("linear probe hash table constructed with {num_slots} block pages");

        Ok(LinearProbeHashTable {
            header_page_id,
            num_buckets,
            num_slots,
            block_array_size,
            comparator,
            hasher,
            _marker: std::marker::PhantomData,
        })
    }

    fn read_header(&self, bpm: &mut BufferPoolManager) -> Result<HeaderPage> {
        let frame = bpm
            .fetch_page(self.header_page_id)
            .ok_or(Error::OutOfBounds)?;
        let header = HeaderPage::from_frame(frame.borrow().data())?;
        bpm.unpin_page(self.header_page_id, false);
        Ok(header)
    }

    /// Maps a key to its starting (block_index, slot_index), via the
    /// logical bucket `hash_key(key) % num_buckets` (the number actually
    /// requested at construction, not the rounded-up physical capacity),
    /// then splits that bucket into a block/slot pair. Two keys whose
    /// hashes collide mod `num_buckets` collide here too (SPEC_FULL.md §8
    /// scenario 5).
    fn initial_position(&self, key: &K) -> (usize, usize) {
        let bucket = (self.hasher.hash_key(key) as usize) % self.num_buckets;
        (bucket / self.block_array_size, bucket % self.block_array_size)
    }

    /// Probes forward from the initial position, invoking `on_slot` for
    /// every occupied slot until a never-occupied slot is found or the
    /// whole table has been visited once. `on_slot` returns `Some(outcome)`
    /// to stop the scan early (having already unpinned its own block), or
    /// `None` to continue.
    /// `on_slot` receives the still-pinned frame for the block currently
    /// under the hand, so it can write a mutated block straight back
    /// without a redundant fetch. It returns `Some(outcome)` to stop the
    /// scan early (having already unpinned its own block via `bpm`), or
    /// `None` to keep scanning (the block stays pinned across that call;
    /// `probe` unpins it once the hand moves on).
    fn probe<T>(
        &self,
        bpm: &mut BufferPoolManager,
        header: &HeaderPage,
        key: &K,
        mut on_slot: impl FnMut(&mut BufferPoolManager, PageId, &FrameHandle, &mut BlockPage<K, V>, usize) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let (mut block_index, mut slot_index) = self.initial_position(key);
        let total_slots = self.num_slots * self.block_array_size;

        let mut block_page_id = header.block_page_id(block_index).ok_or(Error::OutOfBounds)?;
        let mut frame = bpm.fetch_page(block_page_id).ok_or(Error::OutOfBounds)?;
        let mut block = BlockPage::<K, V>::from_frame(frame.borrow().data())?;

        let mut visited = 0usize;
        loop {
            if visited == total_slots || !block.is_occupied(slot_index) {
                bpm.unpin_page(block_page_id, false);
                return Ok(None);
            }

            if let Some(outcome) = on_slot(bpm, block_page_id, &frame, &mut block, slot_index)? {
                return Ok(Some(outcome));
            }

            visited += 1;
            slot_index += 1;
            if slot_index == self.block_array_size {
                slot_index = 0;
                bpm.unpin_page(block_page_id, false);
                block_index = (block_index + 1) % self.num_slots;
                block_page_id = header.block_page_id(block_index).ok_or(Error::OutOfBounds)?;
                frame = bpm.fetch_page(block_page_id).ok_or(Error::OutOfBounds)?;
                block = BlockPage::<K, V>::from_frame(frame.borrow().data())?;
            }
        }
    }

    /// GetValue: SPEC_FULL.md §4.3.
    pub fn get_value(&self, bpm: &mut BufferPoolManager, key: &K) -> Result<Vec<V>> {
        let header = self.read_header(bpm)?;
        let mut results = Vec::new();
        self.probe::<()>(bpm, &header, key, |_bpm, _pid, _frame, block, slot| {
            if block.is_readable(slot) {
                if let Some(stored_key) = block.key_at(slot) {
                    if self.comparator.compare(stored_key, key) == 0 {
                        results.push(block.value_at(slot).unwrap().clone());
                    }
                }
            }
            Ok(None)
        })?;
        Ok(results)
    }

    fn insert_pass(&self, bpm: &mut BufferPoolManager, header: &HeaderPage, key: &K, value: &V) -> Result<InsertOutcome> {
        let outcome = self.probe(bpm, header, key, |bpm, block_page_id, frame, block, slot| {
            if !block.is_readable(slot) {
                block.insert(slot, key.clone(), value.clone());
                block.write_to_frame(frame.borrow_mut().data_mut())?;
                bpm.unpin_page(block_page_id, true);
                return Ok(Some(InsertOutcome::Placed));
            }
            let matches = block
                .key_at(slot)
                .map(|k| self.comparator.compare(k, key) == 0)
                .unwrap_or(false)
                && block.value_at(slot) == Some(value);
            if matches {
                bpm.unpin_page(block_page_id, false);
                return Ok(Some(InsertOutcome::Duplicate));
            }
            Ok(None)
        })?;
        Ok(outcome.unwrap_or(InsertOutcome::TableFull))
    }

    /// Insert: SPEC_FULL.md §4.3. A full-table traversal triggers `Resize`
    /// once; since `Resize` is an unimplemented, declared extension
    /// point, this surfaces as an error rather than looping (SPEC_FULL.md
    /// §9, §10.5).
    pub fn insert(&self, bpm: &mut BufferPoolManager, key: K, value: V) -> Result<bool> {
        let header = self.read_header(bpm)?;
        match self.insert_pass(bpm, &header, &key, &value)? {
            InsertOutcome::Placed => Ok(true),
            InsertOutcome::Duplicate => Ok(false),
            InsertOutcome::TableFull => self.resize(bpm, self.num_slots * self.block_array_size).map(|_| false),
        }
    }

    /// Remove: SPEC_FULL.md §4.3.
    pub fn remove(&self, bpm: &mut BufferPoolManager, key: &K, value: &V) -> Result<bool> {
        let header = self.read_header(bpm)?;
        let outcome = self.probe(bpm, &header, key, |bpm, block_page_id, frame, block, slot| {
            if !block.is_readable(slot) {
                return Ok(None);
            }
            let matches = block
                .key_at(slot)
                .map(|k| self.comparator.compare(k, key) == 0)
                .unwrap_or(false)
                && block.value_at(slot) == Some(value);
            if matches {
                block.remove(slot);
                block.write_to_frame(frame.borrow_mut().data_mut())?;
                bpm.unpin_page(block_page_id, true);
                return Ok(Some(()));
            }
            Ok(None)
        })?;
        Ok(outcome.is_some())
    }

    /// Declared but unimplemented (SPEC_FULL.md §9): growing the table
    /// would mean allocating new block pages, re-hashing every live pair,
    /// and swinging the header's block_page_id list. Returns an explicit
    /// error rather than silently doing nothing, so `Insert`'s full-table
    /// fallback has an observable outcome instead of looping forever.
    pub fn resize(&self, _bpm: &mut BufferPoolManager, _new_num_buckets: usize) -> Result<()> {
        log::warn!("hash table resize requested but not implemented");
        Err(Error::NotImplemented("LinearProbeHashTable::resize".into()))
    }

    /// GetSize: the number of live pairs, computed honestly as the sum of
    /// each block page's readable-slot popcount (SPEC_FULL.md §4.3, §9).
    pub fn get_size(&self, bpm: &mut BufferPoolManager) -> Result<usize> {
        let header = self.read_header(bpm)?;
        let mut total = 0;
        for block_index in 0..header.num_blocks() {
            let block_page_id = header.block_page_id(block_index).ok_or(Error::OutOfBounds)?;
            let frame = bpm.fetch_page(block_page_id).ok_or(Error::OutOfBounds)?;
            let block = BlockPage::<K, V>::from_frame(frame.borrow().data())?;
            total += block.readable_count();
            bpm.unpin_page(block_page_id, false);
        }
        Ok(total)
    }
}

#[path = "tests.rs"]
#[cfg(test)]
mod tests;
