//! Mutator
//!
//! Payload access, tombstoning, and the resize policy.
//!
//! Entries are packed with no slack, so an entry never changes size in
//! place. `relocate` is the supported way to change a record's size:
//! append a copy, then tombstone the original.

use tracing::debug;

use crate::error::{Result, TagStoreError};
use crate::layout::{self, EntryHeader, TAG_INVALID};

use super::navigator::{entry_at, Entry};
use super::{Handle, TagStore};

impl<B: AsRef<[u8]> + AsMut<[u8]>> TagStore<B> {
    /// Resolve a handle to its entry.
    ///
    /// Rejects handles whose entry would overrun the used area or whose
    /// header and footer sizes disagree.
    pub fn entry(&self, handle: Handle) -> Result<Entry> {
        let invalid = || TagStoreError::InvalidHandle(handle.0);
        let area = self.live();

        let offset = layout::header_offset_of_payload(handle.0).ok_or_else(invalid)?;
        let entry = entry_at(area, offset).ok_or_else(invalid)?;
        match layout::read_footer(area, entry.footer_offset()) {
            Some(size) if size == entry.payload_size => Ok(entry),
            _ => Err(invalid()),
        }
    }

    /// Payload bytes of an entry
    pub fn payload(&self, handle: Handle) -> Result<&[u8]> {
        let entry = self.entry(handle)?;
        let start = handle.0;
        Ok(&self.live()[start..start + entry.payload_size])
    }

    /// Mutable payload bytes of an entry
    pub fn payload_mut(&mut self, handle: Handle) -> Result<&mut [u8]> {
        let entry = self.entry(handle)?;
        let start = handle.0;
        Ok(&mut self.area_mut()[start..start + entry.payload_size])
    }

    /// Tombstone an entry by rewriting its tag to `TAG_INVALID`.
    ///
    /// No bytes move and no space is reclaimed until `clean`. The payload
    /// must be treated as lost from this point.
    pub fn invalidate(&mut self, handle: Handle) -> Result<()> {
        let entry = self.entry(handle)?;
        let written = EntryHeader::write_tag(self.area_mut(), entry.offset, TAG_INVALID);
        debug_assert!(written.is_some());
        Ok(())
    }

    /// Delete an entry (tombstones it, see `invalidate`)
    pub fn remove(&mut self, handle: Handle) -> Result<()> {
        self.invalidate(handle)
    }

    /// Resize an entry in place.
    ///
    /// Only a no-op resize succeeds; any other size is `Unsupported`
    /// because neighbours are packed contiguously. Use `relocate`.
    pub fn resize(&mut self, handle: Handle, new_size: usize) -> Result<Handle> {
        let entry = self.entry(handle)?;
        if entry.payload_size == new_size {
            return Ok(handle);
        }

        Err(TagStoreError::Unsupported(
            "in-place resize; use relocate (append + copy + invalidate)",
        ))
    }

    /// Move an entry's payload into a new entry of `new_size` bytes.
    ///
    /// The new entry keeps the tag and version, receives the first
    /// `min(old, new)` payload bytes and zeroes the rest; the old entry is
    /// tombstoned. If there is no room the region is left unchanged.
    pub fn relocate(&mut self, handle: Handle, new_size: usize) -> Result<Handle> {
        let old = self.entry(handle)?;
        if old.is_tombstone() {
            return Err(TagStoreError::InvalidHandle(handle.0));
        }

        let new_handle = self.append(old.tag, old.version, new_size)?;
        let copied = old.payload_size.min(new_size);

        let area = self.area_mut();
        area.copy_within(handle.0..handle.0 + copied, new_handle.0);
        area[new_handle.0 + copied..new_handle.0 + new_size].fill(0);

        self.invalidate(handle)?;
        debug!(
            tag = old.tag,
            from = old.payload_size,
            to = new_size,
            "Relocated entry"
        );

        Ok(new_handle)
    }
}
