use crate::common::constants::{INVALID_LSN, INVALID_PAGE_ID, PAGE_SIZE};
use crate::common::Result;
use crate::storage::disk::disk_manager::{Lsn, PageId};
use crate::storage::page::{decode_from_frame, encode_into_frame};
use serde::{Deserialize, Serialize};

/// On-disk layout of a linear-probe hash table's header page: its own
/// page_id, a passive `lsn` slot reserved for the (out-of-scope) log
/// manager, the live pair count, and the ordered block_index -> page_id
/// map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderPage {
    page_id: PageId,
    lsn: Lsn,
    size: u64,
    block_page_ids: Vec<PageId>,
}

impl HeaderPage {
    pub fn new(page_id: PageId) -> Self {
        HeaderPage {
            page_id,
            lsn: INVALID_LSN,
            size: 0,
            block_page_ids: Vec::new(),
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn set_page_id(&mut self, page_id: PageId) {
        self.page_id = page_id;
    }

    pub fn lsn(&self) -> Lsn {
        self.lsn
    }

    pub fn set_lsn(&mut self, lsn: Lsn) {
        self.lsn = lsn;
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn set_size(&mut self, size: u64) {
        self.size = size;
    }

    pub fn num_blocks(&self) -> usize {
        self.block_page_ids.len()
    }

    pub fn block_page_id(&self, block_index: usize) -> Option<PageId> {
        self.block_page_ids.get(block_index).copied()
    }

    pub fn add_block_page_id(&mut self, page_id: PageId) {
        self.block_page_ids.push(page_id);
    }

    pub fn from_frame(frame: &[u8; PAGE_SIZE]) -> Result<Self> {
        decode_from_frame(frame)
    }

    pub fn write_to_frame(&self, frame: &mut [u8; PAGE_SIZE]) -> Result<()> {
        encode_into_frame(self, frame)
    }
}

impl Default for HeaderPage {
    fn default() -> Self {
        HeaderPage::new(INVALID_PAGE_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_frame() {
        let mut header = HeaderPage::new(7);
        header.set_lsn(42);
        header.set_size(3);
        header.add_block_page_id(1);
        header.add_block_page_id(2);

        let mut frame = [0u8; PAGE_SIZE];
        header.write_to_frame(&mut frame).unwrap();

        let restored = HeaderPage::from_frame(&frame).unwrap();
        assert_eq!(restored.page_id(), 7);
        assert_eq!(restored.lsn(), 42);
        assert_eq!(restored.size(), 3);
        assert_eq!(restored.num_blocks(), 2);
        assert_eq!(restored.block_page_id(0), Some(1));
        assert_eq!(restored.block_page_id(1), Some(2));
    }
}
