use super::*;
use crate::common::constants::PAGE_SIZE;

fn bpm_with_pool_size(pool_size: usize) -> (tempfile::TempDir, BufferPoolManager) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let disk_manager = DiskManager::new(&path).unwrap();
    let bpm = BufferPoolManager::builder()
        .pool_size(pool_size)
        .disk_manager(disk_manager)
        .build();
    (dir, bpm)
}

#[test]
fn new_page_returns_distinct_pinned_pages() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    let (p0, _) = bpm.new_page().unwrap();
    let (p1, _) = bpm.new_page().unwrap();
    let (p2, _) = bpm.new_page().unwrap();
    assert!(p0 != p1 && p1 != p2 && p0 != p2);
    assert_eq!(bpm.pin_count_of(p0), Some(1));
    assert_eq!(bpm.pin_count_of(p1), Some(1));
    assert_eq!(bpm.pin_count_of(p2), Some(1));
}

#[test]
fn pin_conservation_across_fetch_and_unpin() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    let (p0, _) = bpm.new_page().unwrap();
    bpm.unpin_page(p0, false);
    assert_eq!(bpm.pin_count_of(p0), Some(0));

    bpm.fetch_page(p0).unwrap();
    bpm.fetch_page(p0).unwrap();
    assert_eq!(bpm.pin_count_of(p0), Some(2));
    assert!(bpm.unpin_page(p0, false));
    assert_eq!(bpm.pin_count_of(p0), Some(1));
    assert!(bpm.unpin_page(p0, false));
    assert_eq!(bpm.pin_count_of(p0), Some(0));
    // Unbalanced unpin now fails.
    assert!(!bpm.unpin_page(p0, false));
}

/// SPEC_FULL.md §8 scenario 1: fetch/unpin churn.
#[test]
fn fetch_unpin_churn_evicts_by_clock_order() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    let (p0, _) = bpm.new_page().unwrap();
    let (p1, _) = bpm.new_page().unwrap();
    let (p2, _) = bpm.new_page().unwrap();
    bpm.unpin_page(p0, false);
    bpm.unpin_page(p1, false);
    bpm.unpin_page(p2, false);

    assert!(bpm.fetch_page(p0).is_some());
    bpm.unpin_page(p0, false);

    let (p3, _) = bpm.new_page().unwrap();
    assert!(p3 != p0 && p3 != p1 && p3 != p2);
    // Page 1 should have been evicted: its frame was reused, so it is no
    // longer resident (re-fetching it reads back from disk into a frame,
    // which still succeeds, but it is a fresh fetch, not a directory hit).
    assert_eq!(bpm.pin_count_of(p1), None);
}

/// SPEC_FULL.md §8 scenario 2: pinned exhaustion.
#[test]
fn new_page_fails_when_every_frame_is_pinned() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    bpm.new_page().unwrap();
    bpm.new_page().unwrap();
    bpm.new_page().unwrap();
    assert!(bpm.new_page().is_none());
    assert!(bpm.fetch_page(99).is_none());
}

/// SPEC_FULL.md §8 scenario 3: dirty flush on eviction.
#[test]
fn dirty_page_is_flushed_before_its_frame_is_reused() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    let (p0, frame0) = bpm.new_page().unwrap();
    frame0.borrow_mut().data_mut()[..3].copy_from_slice(b"abc");
    bpm.unpin_page(p0, true);
    assert_eq!(bpm.is_dirty_of(p0), Some(true));

    let (p1, _) = bpm.new_page().unwrap();
    bpm.unpin_page(p1, false);
    let (p2, _) = bpm.new_page().unwrap();
    bpm.unpin_page(p2, false);
    // Forces eviction of page 0 (clock victim among p0,p1,p2 unpinned).
    let (_p3, _) = bpm.new_page().unwrap();

    let mut disk_manager = DiskManager::new(_dir.path().join("test.db")).unwrap();
    let mut buf = [0u8; PAGE_SIZE];
    disk_manager.read_page(p0, &mut buf).unwrap();
    assert_eq!(&buf[..3], b"abc");
}

/// SPEC_FULL.md §8 scenario 4: delete while pinned.
#[test]
fn delete_page_refuses_while_pinned() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    let (p0, _) = bpm.new_page().unwrap();
    assert_eq!(bpm.pin_count_of(p0), Some(1));
    assert!(!bpm.delete_page(p0));
    assert!(bpm.unpin_page(p0, false));
    assert!(bpm.delete_page(p0));
    assert_eq!(bpm.pin_count_of(p0), None);
}

/// A deleted frame must leave the replacer's own candidacy tracking, not
/// just the page directory, per spec.md's free-list invariant (a free
/// frame is absent from the page directory *and* the replacer).
#[test]
fn delete_page_removes_the_frame_from_the_replacer_too() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    let (p0, _) = bpm.new_page().unwrap();
    bpm.unpin_page(p0, false);
    assert_eq!(bpm.replacer_size(), 1);
    assert!(bpm.delete_page(p0));
    assert_eq!(bpm.replacer_size(), 0);
}

#[test]
fn delete_page_not_resident_is_vacuously_true() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    assert!(bpm.delete_page(12345));
}

#[test]
fn flush_page_fails_for_invalid_or_absent_page() {
    let (_dir, mut bpm) = bpm_with_pool_size(3);
    assert!(!bpm.flush_page(INVALID_PAGE_ID));
    assert!(!bpm.flush_page(42));
}

#[test]
fn eviction_never_selects_a_pinned_frame() {
    let (_dir, mut bpm) = bpm_with_pool_size(2);
    let (p0, _) = bpm.new_page().unwrap();
    let (p1, _) = bpm.new_page().unwrap();
    // Both pinned; neither free_list slot nor replacer victim available.
    assert!(bpm.new_page().is_none());
    bpm.unpin_page(p0, false);
    // Now only p0 is evictable; requesting a new page must not disturb p1.
    let (_p2, _) = bpm.new_page().unwrap();
    assert_eq!(bpm.pin_count_of(p1), Some(1));
}
