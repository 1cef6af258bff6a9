//! Allocator
//!
//! Bump-pointer placement of new entries at the tail of the used area.

use tracing::{debug, trace};

use crate::error::{Result, TagStoreError};
use crate::layout::{self, EntryHeader, Tag, Version, ENTRY_HEADER_SIZE, TAG_INVALID};

use super::{Handle, TagStore};

impl<B: AsRef<[u8]> + AsMut<[u8]>> TagStore<B> {
    /// Append an entry with room for `payload_size` bytes.
    ///
    /// The entry is placed at the current used boundary; no existing entry
    /// moves. Payload bytes are left as they are in the free tail, so fill
    /// them through `payload_mut`. On failure the region is unchanged.
    pub fn append(&mut self, tag: Tag, version: Version, payload_size: usize) -> Result<Handle> {
        if tag == TAG_INVALID {
            return Err(TagStoreError::InvalidTag(tag));
        }

        let available = self.available();
        let required = match layout::space_required(payload_size) {
            Some(required) if required <= available => required,
            required => {
                debug!(tag, payload_size, available, "Append rejected: insufficient space");
                return Err(TagStoreError::InsufficientSpace {
                    required: required.unwrap_or(usize::MAX),
                    available,
                });
            }
        };

        let offset = self.used;
        let footer = offset + ENTRY_HEADER_SIZE + payload_size;
        let header = EntryHeader {
            tag,
            version,
            payload_size,
        };

        let area = self.area_mut();
        let written = header
            .write(area, offset)
            .and_then(|_| layout::write_footer(area, footer, payload_size));
        debug_assert!(written.is_some());

        self.set_used(offset + required);
        trace!(tag, version, payload_size, offset, "Appended entry");

        Ok(Handle(offset + ENTRY_HEADER_SIZE))
    }

    /// Append an entry and copy `payload` into it
    pub fn append_bytes(&mut self, tag: Tag, version: Version, payload: &[u8]) -> Result<Handle> {
        let handle = self.append(tag, version, payload.len())?;
        self.payload_mut(handle)?.copy_from_slice(payload);
        Ok(handle)
    }
}
