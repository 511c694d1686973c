use crate::common::constants::{INVALID_PAGE_ID, PAGE_SIZE};
use crate::storage::disk::disk_manager::PageId;
use std::cell::RefCell;
use std::rc::Rc;

/// A fixed-size in-memory slot that can hold one page image, plus the
/// metadata the buffer pool needs to track it. Frames are allocated once,
/// never reallocated or moved (§3): the pool keeps one `FrameHandle` per
/// slot for the lifetime of the pool and hands out cheap clones of it.
#[derive(Debug)]
pub struct Frame {
    page_id: PageId,
    pin_count: u32,
    is_dirty: bool,
    data: Box<[u8; PAGE_SIZE]>,
}

/// Single-threaded interior-mutability handle into one pool slot. Cloning
/// a handle is O(1) and shares the same underlying frame.
pub type FrameHandle = Rc<RefCell<Frame>>;

impl Frame {
    fn new() -> Self {
        Frame {
            page_id: INVALID_PAGE_ID,
            pin_count: 0,
            is_dirty: false,
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    pub fn new_handle() -> FrameHandle {
        Rc::new(RefCell::new(Frame::new()))
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn set_page_id(&mut self, page_id: PageId) {
        self.page_id = page_id;
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub fn increment_pin_count(&mut self) {
        self.pin_count += 1;
    }

    /// Panics if already zero: the buffer pool must never unpin an already
    /// fully-unpinned page (UnpinPage checks this before calling in).
    pub fn decrement_pin_count(&mut self) {
        assert!(self.pin_count > 0, "pin_count underflow on frame");
        self.pin_count -= 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn set_is_dirty(&mut self, is_dirty: bool) {
        self.is_dirty = is_dirty;
    }

    pub fn data(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.data
    }

    /// Resets the frame to its just-constructed state, ready for reuse by
    /// a different page_id.
    pub fn reset(&mut self) {
        self.page_id = INVALID_PAGE_ID;
        self.pin_count = 0;
        self.is_dirty = false;
        self.data.fill(0);
    }
}
