use crate::common::constants::{INVALID_PAGE_ID, NEW_PAGE_ERR_MSG, PAGE_SIZE};
use crate::storage::buffer::clock_replacer::{ClockReplacer, FrameId};
use crate::storage::disk::disk_manager::{DiskManager, PageId};
use crate::storage::frame::{Frame, FrameHandle};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Owns a fixed array of frames, the page_id -> frame_id directory, the
/// free list of never-used frames, and a `ClockReplacer`. Mediates every
/// disk access (SPEC_FULL.md §4.2). Not internally synchronized: per §5,
/// this is a single-threaded, cooperatively-scheduled component.
#[derive(Debug)]
pub struct BufferPoolManager {
    pool_size: usize,
    frames: Vec<FrameHandle>,
    page_table: HashMap<PageId, FrameId>,
    // Last-known-clean contents of each resident page, used to detect
    // dirtiness at unpin time (SPEC_FULL.md §3, §9).
    shadow: HashMap<PageId, Box<[u8; PAGE_SIZE]>>,
    free_list: VecDeque<FrameId>,
    replacer: ClockReplacer,
    disk_manager: DiskManager,
}

#[derive(Default)]
pub struct BufferPoolManagerBuilder {
    pool_size: Option<usize>,
    disk_manager: Option<DiskManager>,
}

impl BufferPoolManagerBuilder {
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn disk_manager(mut self, disk_manager: DiskManager) -> Self {
        self.disk_manager = Some(disk_manager);
        self
    }

    /// Falls back to `crate::config::SETTINGS.pool_size` when no explicit
    /// pool size was given, so a caller that only cares about the disk
    /// manager gets a reasonably-sized pool instead of a panic.
    pub fn build(self) -> BufferPoolManager {
        let pool_size = self.pool_size.unwrap_or(crate::config::SETTINGS.pool_size);
        let disk_manager = self
            .disk_manager
            .expect("`disk_manager` not initialized before build.");
        BufferPoolManager::new(pool_size, disk_manager)
    }
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, disk_manager: DiskManager) -> Self {
        BufferPoolManager {
            pool_size,
            frames: (0..pool_size).map(|_| Frame::new_handle()).collect(),
            page_table: HashMap::new(),
            shadow: HashMap::new(),
            free_list: (0..pool_size).collect(),
            replacer: ClockReplacer::new(pool_size),
            disk_manager,
        }
    }

    pub fn builder() -> BufferPoolManagerBuilder {
        BufferPoolManagerBuilder::default()
    }

    pub fn size(&self) -> usize {
        self.pool_size
    }

    /// Pops a free frame, or evicts one via the replacer (flushing its old
    /// page first if dirty, then dropping its directory/shadow entries).
    /// `None` means the pool is exhausted: every frame is resident and
    /// pinned.
    fn acquire_frame(&mut self) -> Option<FrameId> {
        if let Some(frame_id) = self.free_list.pop_front() {
            return Some(frame_id);
        }
        let frame_id = self.replacer.victim()?;
        let old_page_id = self.frames[frame_id].borrow().page_id();
        if old_page_id != INVALID_PAGE_ID {
            if self.frames[frame_id].borrow().is_dirty() {
                log::debug!("evicting dirty page {old_page_id} from frame {frame_id}, flushing first");
                self.write_frame_to_disk(frame_id, old_page_id);
            } else {
                log::debug!("evicting clean page {old_page_id} from frame {frame_id}");
            }
            self.page_table.remove(&old_page_id);
            self.shadow.remove(&old_page_id);
        }
        Some(frame_id)
    }

    fn write_frame_to_disk(&mut self, frame_id: FrameId, page_id: PageId) {
        let data = *self.frames[frame_id].borrow().data();
        if let Err(e) = self.disk_manager.write_page(page_id, &data) {
            log::error!("failed to write page {page_id}: {e}");
        }
    }

    /// FetchPage: SPEC_FULL.md §4.2.
    pub fn fetch_page(&mut self, page_id: PageId) -> Option<FrameHandle> {
        if let Some(&frame_id) = self.page_table.get(&page_id) {
            let handle = Rc::clone(&self.frames[frame_id]);
            let was_unpinned = handle.borrow().pin_count() == 0;
            handle.borrow_mut().increment_pin_count();
            if was_unpinned {
                self.replacer.pin(frame_id);
            }
            return Some(handle);
        }

        let frame_id = self.acquire_frame()?;
        let mut buf = [0u8; PAGE_SIZE];
        if let Err(e) = self.disk_manager.read_page(page_id, &mut buf) {
            log::error!("failed to read page {page_id}: {e}");
            self.free_list.push_back(frame_id);
            return None;
        }

        {
            let mut f = self.frames[frame_id].borrow_mut();
            f.reset();
            f.set_page_id(page_id);
            f.data_mut().copy_from_slice(&buf);
            f.increment_pin_count();
        }
        self.shadow.insert(page_id, Box::new(buf));
        self.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);
        Some(Rc::clone(&self.frames[frame_id]))
    }

    /// UnpinPage: SPEC_FULL.md §4.2.
    pub fn unpin_page(&mut self, page_id: PageId, is_dirty_hint: bool) -> bool {
        let Some(&frame_id) = self.page_table.get(&page_id) else {
            return false;
        };
        let handle = Rc::clone(&self.frames[frame_id]);
        let mut f = handle.borrow_mut();
        if f.pin_count() == 0 {
            return false;
        }
        f.decrement_pin_count();

        let shadow_mismatch = self
            .shadow
            .get(&page_id)
            .map(|snapshot| snapshot.as_ref() != f.data())
            .unwrap_or(false);
        let effective_dirty = f.is_dirty() || shadow_mismatch || is_dirty_hint;
        f.set_is_dirty(effective_dirty);

        let reached_zero = f.pin_count() == 0;
        drop(f);
        if reached_zero {
            self.replacer.unpin(frame_id);
        }
        true
    }

    /// FlushPage: SPEC_FULL.md §4.2. Does not clear `is_dirty` (documented
    /// policy choice, see SPEC_FULL.md §9).
    pub fn flush_page(&mut self, page_id: PageId) -> bool {
        if page_id == INVALID_PAGE_ID {
            return false;
        }
        let Some(&frame_id) = self.page_table.get(&page_id) else {
            return false;
        };
        self.write_frame_to_disk(frame_id, page_id);
        true
    }

    pub fn flush_all_pages(&mut self) {
        let page_ids: Vec<PageId> = self.page_table.keys().copied().collect();
        for page_id in page_ids {
            self.flush_page(page_id);
        }
    }

    /// NewPage: SPEC_FULL.md §4.2.
    pub fn new_page(&mut self) -> Option<(PageId, FrameHandle)> {
        let page_id = self.disk_manager.allocate_page();
        let frame_id = match self.acquire_frame() {
            Some(id) => id,
            None => {
                log::debug!("{NEW_PAGE_ERR_MSG}");
                return None;
            }
        };

        {
            let mut f = self.frames[frame_id].borrow_mut();
            f.reset();
            f.set_page_id(page_id);
            f.increment_pin_count();
        }
        self.shadow.insert(page_id, Box::new([0u8; PAGE_SIZE]));
        self.page_table.insert(page_id, frame_id);
        self.replacer.pin(frame_id);
        Some((page_id, Rc::clone(&self.frames[frame_id])))
    }

    /// DeletePage: SPEC_FULL.md §4.2.
    pub fn delete_page(&mut self, page_id: PageId) -> bool {
        let Some(&frame_id) = self.page_table.get(&page_id) else {
            return true;
        };
        if self.frames[frame_id].borrow().pin_count() > 0 {
            return false;
        }
        self.frames[frame_id].borrow_mut().reset();
        self.page_table.remove(&page_id);
        self.shadow.remove(&page_id);
        self.replacer.pin(frame_id);
        self.free_list.push_back(frame_id);
        self.disk_manager.deallocate_page(page_id);
        true
    }

    pub(crate) fn pin_count_of(&self, page_id: PageId) -> Option<u32> {
        let &frame_id = self.page_table.get(&page_id)?;
        Some(self.frames[frame_id].borrow().pin_count())
    }

    pub(crate) fn is_dirty_of(&self, page_id: PageId) -> Option<bool> {
        let &frame_id = self.page_table.get(&page_id)?;
        Some(self.frames[frame_id].borrow().is_dirty())
    }

    pub(crate) fn replacer_size(&self) -> usize {
        self.replacer.size()
    }
}

impl Drop for BufferPoolManager {
    fn drop(&mut self) {
        log::debug!("buffer pool manager dropped with {} resident pages", self.page_table.len());
    }
}

#[path = "tests.rs"]
#[cfg(test)]
mod tests;
