//! Tests for the Tag Scanner (find)
//!
//! These tests verify:
//! - Append/find round-trips return identical payload bytes
//! - Resumed scans yield every match exactly once, in append order
//! - Tombstones are never matched by callers
//! - Invalid tags and handles are rejected

use tagstore::{Handle, TagStore, TagStoreError, TAG_INVALID};

// =============================================================================
// Helper Functions
// =============================================================================

fn new_store() -> TagStore<Vec<u8>> {
    TagStore::reset(vec![0u8; 4096]).unwrap()
}

/// Collect every match for `tag` by resuming from each previous handle
fn collect_by_resume(store: &TagStore<Vec<u8>>, tag: u16) -> Vec<Handle> {
    let mut handles = Vec::new();
    let mut resume = None;
    while let Some(found) = store.find_next(tag, resume).unwrap() {
        handles.push(found.handle);
        resume = Some(found.handle);
    }
    handles
}

// =============================================================================
// Basic Find Tests
// =============================================================================

#[test]
fn test_find_in_empty_region() {
    let store = new_store();

    assert!(store.find_next(1, None).unwrap().is_none());
}

#[test]
fn test_find_missing_tag() {
    let mut store = new_store();
    store.append_bytes(1, 0, b"one").unwrap();
    store.append_bytes(2, 0, b"two").unwrap();

    assert!(store.find_next(3, None).unwrap().is_none());
}

#[test]
fn test_find_returns_first_match() {
    let mut store = new_store();
    store.append_bytes(1, 0, b"a").unwrap();
    let expected = store.append_bytes(2, 7, b"bb").unwrap();
    store.append_bytes(2, 8, b"ccc").unwrap();

    let found = store.find_next(2, None).unwrap().unwrap();

    assert_eq!(found.handle, expected);
    assert_eq!(found.version, 7);
    assert_eq!(found.payload_size, 2);
}

#[test]
fn test_append_find_round_trip() {
    let mut store = new_store();
    let records: Vec<(u16, u16, Vec<u8>)> = (1..=12u16)
        .map(|tag| (tag, tag * 3, (0..tag * 5).map(|b| (b * tag) as u8).collect()))
        .collect();

    for (tag, version, payload) in &records {
        store.append_bytes(*tag, *version, payload).unwrap();
    }

    for (tag, version, payload) in &records {
        let found = store.find_next(*tag, None).unwrap().unwrap();
        assert_eq!(found.version, *version);
        assert_eq!(found.payload_size, payload.len());
        assert_eq!(store.payload(found.handle).unwrap(), payload.as_slice());
    }
}

// =============================================================================
// Resume Tests
// =============================================================================

#[test]
fn test_resume_yields_all_matches_in_order() {
    let mut store = new_store();
    let mut expected = Vec::new();
    for i in 0..10u8 {
        expected.push(store.append_bytes(4, 0, &[i; 8]).unwrap());
        store.append_bytes(5, 0, &[0xFF; 3]).unwrap();
    }

    let handles = collect_by_resume(&store, 4);

    assert_eq!(handles, expected);
    for (i, handle) in handles.iter().enumerate() {
        assert_eq!(store.payload(*handle).unwrap(), &[i as u8; 8]);
    }
}

#[test]
fn test_resume_after_last_match_is_not_found() {
    let mut store = new_store();
    store.append_bytes(1, 0, b"x").unwrap();
    let last = store.append_bytes(1, 0, b"y").unwrap();

    assert!(store.find_next(1, Some(last)).unwrap().is_none());
}

#[test]
fn test_resume_from_handle_of_other_tag() {
    let mut store = new_store();
    let other = store.append_bytes(9, 0, b"other").unwrap();
    let wanted = store.append_bytes(3, 0, b"wanted").unwrap();

    let found = store.find_next(3, Some(other)).unwrap().unwrap();

    assert_eq!(found.handle, wanted);
}

#[test]
fn test_find_all_matches_resumed_scan() {
    let mut store = new_store();
    for i in 0..6u16 {
        store.append_bytes(i % 3 + 1, i, &[0; 4]).unwrap();
    }

    let via_iter: Vec<Handle> = store.find_all(2).unwrap().map(|f| f.handle).collect();

    assert_eq!(via_iter.len(), 2);
    assert_eq!(via_iter, collect_by_resume(&store, 2));
}

// =============================================================================
// Tombstone / Precondition Tests
// =============================================================================

#[test]
fn test_find_skips_tombstones() {
    let mut store = new_store();
    let first = store.append_bytes(6, 0, b"old").unwrap();
    let second = store.append_bytes(6, 1, b"new").unwrap();
    store.invalidate(first).unwrap();

    let found = store.find_next(6, None).unwrap().unwrap();

    assert_eq!(found.handle, second);
    assert_eq!(collect_by_resume(&store, 6), vec![second]);
}

#[test]
fn test_find_rejects_invalid_tag() {
    let mut store = new_store();
    let handle = store.append_bytes(1, 0, b"x").unwrap();
    store.invalidate(handle).unwrap();

    assert!(matches!(
        store.find_next(TAG_INVALID, None),
        Err(TagStoreError::InvalidTag(0))
    ));
    assert!(matches!(
        store.find_all(TAG_INVALID),
        Err(TagStoreError::InvalidTag(0))
    ));
}

#[test]
fn test_find_rejects_handle_outside_entries() {
    let mut store = new_store();
    store.append_bytes(1, 0, b"x").unwrap();

    let beyond = Handle::new(store.used() + 64);
    assert!(matches!(
        store.find_next(1, Some(beyond)),
        Err(TagStoreError::InvalidHandle(_))
    ));

    let before_header = Handle::new(0);
    assert!(matches!(
        store.find_next(1, Some(before_header)),
        Err(TagStoreError::InvalidHandle(0))
    ));
}
