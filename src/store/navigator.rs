//! Navigator
//!
//! Forward/backward traversal between adjacent entries.
//!
//! Forward steps read the header's payload size; backward steps read the
//! footer that precedes an entry. Every step is bounds-checked against the
//! used window `[0, used)`: an offset outside it, or an extent that would
//! overrun it, ends the traversal instead of being dereferenced.

use crate::layout::{
    self, EntryHeader, Tag, Version, ENTRY_FOOTER_SIZE, ENTRY_HEADER_SIZE, TAG_INVALID,
};

use super::{Handle, TagStore};

/// A located entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Header offset within the entry area
    pub offset: usize,
    pub tag: Tag,
    pub version: Version,
    pub payload_size: usize,
}

impl Entry {
    /// Handle to this entry's payload
    pub fn handle(&self) -> Handle {
        Handle(self.offset + ENTRY_HEADER_SIZE)
    }

    /// Total bytes occupied (header + payload + footer)
    pub fn span(&self) -> usize {
        self.payload_size + ENTRY_HEADER_SIZE + ENTRY_FOOTER_SIZE
    }

    /// Offset one past this entry's footer (the next entry's candidate offset)
    pub fn end(&self) -> usize {
        self.offset + self.span()
    }

    /// Offset of this entry's footer
    pub fn footer_offset(&self) -> usize {
        self.offset + ENTRY_HEADER_SIZE + self.payload_size
    }

    /// True if the entry was invalidated
    pub fn is_tombstone(&self) -> bool {
        self.tag == TAG_INVALID
    }
}

/// Read the entry at `offset` if its whole extent lies inside `area`
pub(crate) fn entry_at(area: &[u8], offset: usize) -> Option<Entry> {
    let header = EntryHeader::read(area, offset)?;
    let end = layout::next_offset(offset, header.payload_size)?;
    if end > area.len() {
        return None;
    }

    Some(Entry {
        offset,
        tag: header.tag,
        version: header.version,
        payload_size: header.payload_size,
    })
}

/// Read the entry that ends exactly at `boundary`, walking back via its footer
pub(crate) fn entry_before(area: &[u8], boundary: usize) -> Option<Entry> {
    let footer = boundary.checked_sub(ENTRY_FOOTER_SIZE)?;
    let payload_size = layout::read_footer(area, footer)?;
    let offset = footer
        .checked_sub(payload_size)?
        .checked_sub(ENTRY_HEADER_SIZE)?;

    // A mismatched header would send the forward step elsewhere
    entry_at(area, offset).filter(|entry| entry.end() == boundary)
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> TagStore<B> {
    /// First entry of the region, if any
    pub fn first_entry(&self) -> Option<Entry> {
        entry_at(self.live(), 0)
    }

    /// Last entry of the region, located from the used boundary
    pub fn last_entry(&self) -> Option<Entry> {
        entry_before(self.live(), self.used)
    }

    /// Entry physically following `entry`
    pub fn next_entry(&self, entry: &Entry) -> Option<Entry> {
        let end = layout::next_offset(entry.offset, entry.payload_size)?;
        entry_at(self.live(), end)
    }

    /// Entry physically preceding `entry`
    pub fn prev_entry(&self, entry: &Entry) -> Option<Entry> {
        entry_before(self.live(), entry.offset)
    }

    /// Iterate over all entries (tombstones included) in physical order
    pub fn entries(&self) -> Entries<'_> {
        Entries {
            area: self.live(),
            front: 0,
            back: self.used,
        }
    }
}

/// Double-ended iterator over the entries of a region
pub struct Entries<'a> {
    area: &'a [u8],
    /// Offset of the next entry from the front
    front: usize,
    /// Boundary one past the next entry from the back
    back: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = Entry;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }

        match entry_at(self.area, self.front) {
            Some(entry) if entry.end() <= self.back => {
                self.front = entry.end();
                Some(entry)
            }
            _ => {
                // Broken chain: stop both ends
                self.front = self.back;
                None
            }
        }
    }
}

impl<'a> DoubleEndedIterator for Entries<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back <= self.front {
            return None;
        }

        match entry_before(self.area, self.back) {
            Some(entry) if entry.offset >= self.front => {
                self.back = entry.offset;
                Some(entry)
            }
            _ => {
                self.back = self.front;
                None
            }
        }
    }
}
