use crate::common::constants::PAGE_SIZE;
use crate::common::Result;
use std::cell::Cell;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Stable identifier for a logical page. `-1` (`INVALID_PAGE_ID`) means
/// "no page".
pub type PageId = i64;

/// Log sequence number carried by a page; passive stored state, never
/// interpreted by this core (the log manager is out of scope).
pub type Lsn = i64;

/// A plain, synchronous, file-backed block device. Page `p` lives at byte
/// offset `p * PAGE_SIZE` in the backing file. Not internally
/// synchronized: per §5, two concurrent pools must not share one.
#[derive(Debug)]
pub struct DiskManager {
    file: File,
    next_page_id: Cell<PageId>,
}

impl DiskManager {
    /// Opens (creating if absent) `crate::config::DATA_DIR/<name>` as the
    /// backing store, for call sites that want a stable default location
    /// instead of threading a path through every constructor.
    pub fn open_in_data_dir(name: &str) -> Result<Self> {
        Self::new(crate::config::DATA_DIR.join(name))
    }

    /// Opens (creating if absent) the file at `path` as the backing store.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let len = file.metadata()?.len();
        let next_page_id = (len / PAGE_SIZE as u64) as PageId;
        Ok(DiskManager {
            file,
            next_page_id: Cell::new(next_page_id),
        })
    }

    fn offset_of(page_id: PageId) -> u64 {
        page_id as u64 * PAGE_SIZE as u64
    }

    /// Fills `buffer` (exactly `PAGE_SIZE` bytes) with the on-disk image of
    /// `page_id`. A page that has never been written reads back as zeros.
    pub fn read_page(&mut self, page_id: PageId, buffer: &mut [u8; PAGE_SIZE]) -> Result<()> {
        let offset = Self::offset_of(page_id);
        let len = self.file.metadata()?.len();
        if offset >= len {
            buffer.fill(0);
            return Ok(());
        }
        self.file.seek(SeekFrom::Start(offset))?;
        let mut read_so_far = 0;
        while read_so_far < PAGE_SIZE {
            let n = self.file.read(&mut buffer[read_so_far..])?;
            if n == 0 {
                buffer[read_so_far..].fill(0);
                break;
            }
            read_so_far += n;
        }
        Ok(())
    }

    /// Persists `buffer` as the on-disk image of `page_id`.
    pub fn write_page(&mut self, page_id: PageId, buffer: &[u8; PAGE_SIZE]) -> Result<()> {
        let offset = Self::offset_of(page_id);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buffer)?;
        self.file.flush()?;
        Ok(())
    }

    /// Returns a fresh, monotonically increasing page_id. Never reused,
    /// even across `deallocate_page` (see SPEC_FULL.md §6).
    pub fn allocate_page(&self) -> PageId {
        let id = self.next_page_id.get();
        self.next_page_id.set(id + 1);
        id
    }

    /// Reclaims a page_id. This implementation does not recycle the
    /// backing file offset; the call exists so callers have a stable
    /// interface to invoke regardless of reclamation policy.
    pub fn deallocate_page(&mut self, page_id: PageId) {
        log::debug!("deallocate_page({page_id}) is a no-op in this disk manager");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_disk_manager() -> (tempfile::TempDir, DiskManager) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let dm = DiskManager::new(&path).unwrap();
        (dir, dm)
    }

    #[test]
    fn allocate_page_is_monotonic() {
        let (_dir, dm) = temp_disk_manager();
        assert_eq!(dm.allocate_page(), 0);
        assert_eq!(dm.allocate_page(), 1);
        assert_eq!(dm.allocate_page(), 2);
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_dir, mut dm) = temp_disk_manager();
        let page_id = dm.allocate_page();
        let mut write_buf = [0u8; PAGE_SIZE];
        write_buf[..3].copy_from_slice(b"abc");
        dm.write_page(page_id, &write_buf).unwrap();

        let mut read_buf = [0u8; PAGE_SIZE];
        dm.read_page(page_id, &mut read_buf).unwrap();
        assert_eq!(&read_buf[..3], b"abc");
    }

    #[test]
    fn reading_an_unwritten_page_is_zeroed() {
        let (_dir, mut dm) = temp_disk_manager();
        let page_id = dm.allocate_page();
        let mut buf = [0xFFu8; PAGE_SIZE];
        dm.read_page(page_id, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn open_in_data_dir_writes_under_the_configured_directory() {
        crate::common::test_support::init_test_logging();
        let name = "open_in_data_dir_test.db";
        let mut dm = DiskManager::open_in_data_dir(name).unwrap();
        let page_id = dm.allocate_page();
        let mut buf = [0u8; PAGE_SIZE];
        buf[..3].copy_from_slice(b"abc");
        dm.write_page(page_id, &buf).unwrap();
        assert!(crate::config::DATA_DIR.join(name).exists());
        std::fs::remove_file(crate::config::DATA_DIR.join(name)).ok();
    }

    #[test]
    fn reopening_the_same_file_resumes_page_allocation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        {
            let mut dm = DiskManager::new(&path).unwrap();
            let p0 = dm.allocate_page();
            let p1 = dm.allocate_page();
            let buf = [0u8; PAGE_SIZE];
            dm.write_page(p0, &buf).unwrap();
            dm.write_page(p1, &buf).unwrap();
        }
        let dm = DiskManager::new(&path).unwrap();
        assert_eq!(dm.allocate_page(), 2);
    }
}
