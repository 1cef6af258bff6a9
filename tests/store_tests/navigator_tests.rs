//! Tests for the Navigator
//!
//! These tests verify:
//! - first/last/next/prev over regions of varied entry sizes
//! - next/prev symmetry
//! - Double-ended iteration
//! - Navigation never leaves the used window

use tagstore::layout::{self, ENTRY_OVERHEAD};
use tagstore::{Entry, TagStore};

// =============================================================================
// Helper Functions
// =============================================================================

const SIZES: [usize; 6] = [0, 1, 17, 64, 3, 250];

fn varied_store() -> TagStore<Vec<u8>> {
    let mut store = TagStore::reset(vec![0u8; 4096]).unwrap();
    for (i, size) in SIZES.iter().enumerate() {
        store.append_bytes((i + 1) as u16, i as u16, &vec![0x11; *size]).unwrap();
    }
    store
}

// =============================================================================
// Single Step Tests
// =============================================================================

#[test]
fn test_empty_region_has_no_entries() {
    let store = TagStore::reset(vec![0u8; 256]).unwrap();

    assert!(store.first_entry().is_none());
    assert!(store.last_entry().is_none());
    assert_eq!(store.entries().count(), 0);
    assert_eq!(store.entries().rev().count(), 0);
}

#[test]
fn test_first_and_last_entry() {
    let store = varied_store();

    let first = store.first_entry().unwrap();
    let last = store.last_entry().unwrap();

    assert_eq!(first.offset, 0);
    assert_eq!(first.tag, 1);
    assert_eq!(first.payload_size, SIZES[0]);
    assert_eq!(last.tag, SIZES.len() as u16);
    assert_eq!(last.payload_size, 250);
    assert_eq!(last.end(), store.used());
}

#[test]
fn test_next_walks_every_entry() {
    let store = varied_store();

    let mut entry = store.first_entry();
    let mut sizes = Vec::new();
    while let Some(current) = entry {
        sizes.push(current.payload_size);
        entry = store.next_entry(&current);
    }

    assert_eq!(sizes, SIZES);
}

#[test]
fn test_prev_walks_every_entry_backwards() {
    let store = varied_store();

    let mut entry = store.last_entry();
    let mut sizes = Vec::new();
    while let Some(current) = entry {
        sizes.push(current.payload_size);
        entry = store.prev_entry(&current);
    }

    sizes.reverse();
    assert_eq!(sizes, SIZES);
}

#[test]
fn test_prev_of_first_and_next_of_last_are_none() {
    let store = varied_store();

    assert!(store.prev_entry(&store.first_entry().unwrap()).is_none());
    assert!(store.next_entry(&store.last_entry().unwrap()).is_none());
}

#[test]
fn test_next_prev_symmetry() {
    let store = varied_store();
    let entries: Vec<Entry> = store.entries().collect();

    for (i, entry) in entries.iter().enumerate() {
        if i + 1 < entries.len() {
            let next = store.next_entry(entry).unwrap();
            assert_eq!(store.prev_entry(&next).unwrap(), *entry);
        }
        if i > 0 {
            let prev = store.prev_entry(entry).unwrap();
            assert_eq!(store.next_entry(&prev).unwrap(), *entry);
        }
    }
}

#[test]
fn test_entry_geometry() {
    let store = varied_store();
    let entry = store.entries().nth(2).unwrap();

    assert_eq!(entry.span(), 17 + ENTRY_OVERHEAD);
    assert_eq!(entry.end(), entry.offset + entry.span());
    assert_eq!(entry.handle().offset(), entry.offset + layout::ENTRY_HEADER_SIZE);
    assert_eq!(entry.footer_offset(), entry.handle().offset() + 17);
    assert!(!entry.is_tombstone());
}

#[test]
fn test_navigation_stays_inside_used_window() {
    let store = varied_store();

    // An entry claiming to extend past the used boundary has no successor
    let bogus = Entry {
        offset: store.used(),
        tag: 1,
        version: 0,
        payload_size: 0,
    };
    assert!(store.next_entry(&bogus).is_none());

    let huge = Entry {
        offset: 0,
        tag: 1,
        version: 0,
        payload_size: usize::MAX,
    };
    assert!(store.next_entry(&huge).is_none());
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_entries_reverse_matches_forward() {
    let store = varied_store();

    let forward: Vec<Entry> = store.entries().collect();
    let mut backward: Vec<Entry> = store.entries().rev().collect();
    backward.reverse();

    assert_eq!(forward.len(), SIZES.len());
    assert_eq!(forward, backward);
}

#[test]
fn test_entries_from_both_ends_meet_once() {
    let store = varied_store();
    let mut iter = store.entries();
    let mut seen = Vec::new();

    loop {
        match (iter.next(), iter.next_back()) {
            (None, None) => break,
            (front, back) => {
                seen.extend(front);
                seen.extend(back);
            }
        }
    }

    let mut tags: Vec<u16> = seen.iter().map(|e| e.tag).collect();
    tags.sort_unstable();
    assert_eq!(tags, vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_entries_include_tombstones() {
    let mut store = varied_store();
    let handle = store.entries().nth(1).unwrap().handle();
    store.invalidate(handle).unwrap();

    let tombstones = store.entries().filter(|e| e.is_tombstone()).count();

    assert_eq!(store.entries().count(), SIZES.len());
    assert_eq!(tombstones, 1);
}
