use crate::storage::disk::disk_manager::{Lsn, PageId};

/// Bytes per page, matching the on-disk and in-memory frame size.
pub const PAGE_SIZE: usize = 4096;

/// Reserved page_id signalling "no page". Rejected by `FlushPage`.
pub const INVALID_PAGE_ID: PageId = -1;

/// Reserved LSN for a page whose log sequence number has never been set.
pub const INVALID_LSN: Lsn = -1;

pub const NEW_PAGE_ERR_MSG: &str = "could not allocate a new page: buffer pool exhausted";
