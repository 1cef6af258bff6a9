//! Tag Scanner
//!
//! Linear, resumable scans for entries carrying a given tag.

use crate::error::{Result, TagStoreError};
use crate::layout::{Tag, Version, TAG_INVALID};

use super::navigator::{entry_at, Entry};
use super::{Handle, TagStore};

/// A matching entry returned by a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    pub handle: Handle,
    pub version: Version,
    pub payload_size: usize,
}

impl From<Entry> for Found {
    fn from(entry: Entry) -> Self {
        Self {
            handle: entry.handle(),
            version: entry.version,
            payload_size: entry.payload_size,
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> TagStore<B> {
    /// Find the next entry tagged `tag`.
    ///
    /// Without `resume_after` the scan starts at the first entry; with a
    /// previously returned handle it starts at the entry following it.
    /// Returns `Ok(None)` when the used boundary is reached without a match.
    pub fn find_next(&self, tag: Tag, resume_after: Option<Handle>) -> Result<Option<Found>> {
        if tag == TAG_INVALID {
            return Err(TagStoreError::InvalidTag(tag));
        }

        let start = match resume_after {
            Some(handle) => self.entry(handle)?.end(),
            None => 0,
        };

        Ok(self.scan(tag, start).map(Found::from))
    }

    /// Iterate over every entry tagged `tag`, in physical order
    pub fn find_all(&self, tag: Tag) -> Result<FindAll<'_, B>> {
        if tag == TAG_INVALID {
            return Err(TagStoreError::InvalidTag(tag));
        }

        Ok(FindAll {
            store: self,
            tag,
            next: 0,
        })
    }

    /// First entry at or after `start` whose tag equals `tag`.
    ///
    /// Accepts `TAG_INVALID`, which is how the compactor finds tombstones.
    pub(crate) fn scan(&self, tag: Tag, start: usize) -> Option<Entry> {
        let area = self.live();
        let mut offset = start;

        while offset < area.len() {
            let entry = entry_at(area, offset)?;
            if entry.tag == tag {
                return Some(entry);
            }
            offset = entry.end();
        }

        None
    }
}

/// Iterator over the entries carrying one tag
pub struct FindAll<'a, B> {
    store: &'a TagStore<B>,
    tag: Tag,
    /// Offset where the next scan starts
    next: usize,
}

impl<'a, B: AsRef<[u8]> + AsMut<[u8]>> Iterator for FindAll<'a, B> {
    type Item = Found;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.store.scan(self.tag, self.next)?;
        self.next = entry.end();
        Some(entry.into())
    }
}
