//! Layout Primitives
//!
//! Sizes, offsets and field codecs for the on-region binary format.
//!
//! ## Region Format
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Region Header (REGION_HEADER_SIZE)                            │
//! │   Magic: i32 (4) | Version: u16 (2) | pad                     │
//! │   StorageSize: usize | EntriesSize: usize                     │
//! ├───────────────────────────────────────────────────────────────┤
//! │ Entry Area (StorageSize - REGION_HEADER_SIZE)                 │
//! │   [Entry 0][Entry 1] ... [Entry N-1][ free tail ............] │
//! │   ^ offset 0                        ^ EntriesSize             │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entry Format
//! ```text
//! ┌──────────┬──────────┬─────┬──────────────┬─────────┬──────────────┐
//! │ Tag: u16 │ Ver: u16 │ pad │ Size: usize  │ Payload │ Size: usize  │
//! └──────────┴──────────┴─────┴──────────────┴─────────┴──────────────┘
//!   header ─────────────────────────────────┘            footer
//! ```
//!
//! Integers are stored in host byte order. Headers keep the natural
//! alignment of their fields, so their sizes depend on the width of `usize`
//! (24/16/8 bytes on 64-bit hosts, 16/8/4 on 32-bit hosts). Entries
//! themselves are packed back to back with no padding.

use std::mem::size_of;

/// Caller-defined record classifier
pub type Tag = u16;

/// Caller-defined payload version
pub type Version = u16;

// =============================================================================
// Constants
// =============================================================================

/// Format identifier stamped at the start of every region ("TagS")
pub const REGION_MAGIC: i32 = 0x5461_6753;

/// Current region format version
pub const REGION_VERSION: u16 = 0;

/// Reserved tag marking a tombstoned (logically deleted) entry
pub const TAG_INVALID: Tag = 0;

/// Width of every size field
pub const SIZE_WIDTH: usize = size_of::<usize>();

const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) / align * align
}

const MAGIC_OFFSET: usize = 0;
const REGION_VERSION_OFFSET: usize = 4;
const STORAGE_SIZE_OFFSET: usize = align_up(6, SIZE_WIDTH);
const ENTRIES_SIZE_OFFSET: usize = STORAGE_SIZE_OFFSET + SIZE_WIDTH;

/// Bytes occupied by the region header; the entry area starts here
pub const REGION_HEADER_SIZE: usize = ENTRIES_SIZE_OFFSET + SIZE_WIDTH;

const TAG_OFFSET: usize = 0;
const ENTRY_VERSION_OFFSET: usize = 2;
const PAYLOAD_SIZE_OFFSET: usize = align_up(4, SIZE_WIDTH);

/// Bytes occupied by an entry header
pub const ENTRY_HEADER_SIZE: usize = PAYLOAD_SIZE_OFFSET + SIZE_WIDTH;

/// Bytes occupied by an entry footer
pub const ENTRY_FOOTER_SIZE: usize = SIZE_WIDTH;

/// Fixed per-entry overhead (header + footer)
pub const ENTRY_OVERHEAD: usize = ENTRY_HEADER_SIZE + ENTRY_FOOTER_SIZE;

// =============================================================================
// Space Arithmetic
// =============================================================================

/// Total span of an entry carrying `payload_size` bytes.
///
/// Returns `None` if the span does not fit in `usize`.
pub fn space_required(payload_size: usize) -> Option<usize> {
    payload_size.checked_add(ENTRY_OVERHEAD)
}

/// Offset of the entry following one at `offset` with `payload_size` bytes
pub fn next_offset(offset: usize, payload_size: usize) -> Option<usize> {
    offset.checked_add(space_required(payload_size)?)
}

/// Entry header offset for a payload handle offset
pub fn header_offset_of_payload(payload: usize) -> Option<usize> {
    payload.checked_sub(ENTRY_HEADER_SIZE)
}

// =============================================================================
// Field Codecs (host byte order, bounds-checked)
// =============================================================================

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    bytes.get(offset..end)?.try_into().ok()
}

fn write_array<const N: usize>(bytes: &mut [u8], offset: usize, value: [u8; N]) -> Option<()> {
    let end = offset.checked_add(N)?;
    bytes.get_mut(offset..end)?.copy_from_slice(&value);
    Some(())
}

pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    read_array(bytes, offset).map(u16::from_ne_bytes)
}

pub(crate) fn write_u16(bytes: &mut [u8], offset: usize, value: u16) -> Option<()> {
    write_array(bytes, offset, value.to_ne_bytes())
}

pub(crate) fn read_usize(bytes: &[u8], offset: usize) -> Option<usize> {
    read_array(bytes, offset).map(usize::from_ne_bytes)
}

pub(crate) fn write_usize(bytes: &mut [u8], offset: usize, value: usize) -> Option<()> {
    write_array(bytes, offset, value.to_ne_bytes())
}

// =============================================================================
// Region Header
// =============================================================================

/// Decoded region header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionHeader {
    /// Format identifier
    pub magic: i32,
    /// Format version
    pub version: u16,
    /// Total managed bytes, header included
    pub storage_size: usize,
    /// Bytes of the entry area currently holding entries
    pub entries_size: usize,
}

impl RegionHeader {
    /// A freshly stamped header for a region of `storage_size` bytes
    pub fn new(storage_size: usize) -> Self {
        Self {
            magic: REGION_MAGIC,
            version: REGION_VERSION,
            storage_size,
            entries_size: 0,
        }
    }

    /// Read a header from the start of `bytes`
    pub fn read(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            magic: read_array(bytes, MAGIC_OFFSET).map(i32::from_ne_bytes)?,
            version: read_u16(bytes, REGION_VERSION_OFFSET)?,
            storage_size: read_usize(bytes, STORAGE_SIZE_OFFSET)?,
            entries_size: read_usize(bytes, ENTRIES_SIZE_OFFSET)?,
        })
    }

    /// Write the header to the start of `bytes`, zeroing the padding
    pub fn write(&self, bytes: &mut [u8]) -> Option<()> {
        bytes.get_mut(..REGION_HEADER_SIZE)?.fill(0);
        write_array(bytes, MAGIC_OFFSET, self.magic.to_ne_bytes())?;
        write_u16(bytes, REGION_VERSION_OFFSET, self.version)?;
        write_usize(bytes, STORAGE_SIZE_OFFSET, self.storage_size)?;
        write_usize(bytes, ENTRIES_SIZE_OFFSET, self.entries_size)
    }

    /// Update only the `entries_size` field in place
    pub fn write_entries_size(bytes: &mut [u8], entries_size: usize) -> Option<()> {
        write_usize(bytes, ENTRIES_SIZE_OFFSET, entries_size)
    }

    /// Check the format identifier and version
    pub fn validate(&self) -> Result<(), String> {
        if self.magic != REGION_MAGIC {
            return Err(format!(
                "bad magic: expected 0x{:08x}, got 0x{:08x}",
                REGION_MAGIC, self.magic
            ));
        }
        if self.version != REGION_VERSION {
            return Err(format!(
                "unsupported version: expected {}, got {}",
                REGION_VERSION, self.version
            ));
        }
        if self.storage_size < REGION_HEADER_SIZE {
            return Err(format!(
                "storage size {} smaller than header ({})",
                self.storage_size, REGION_HEADER_SIZE
            ));
        }
        Ok(())
    }

    /// Bytes available for entries
    pub fn entry_space(&self) -> usize {
        self.storage_size.saturating_sub(REGION_HEADER_SIZE)
    }
}

// =============================================================================
// Entry Header / Footer
// =============================================================================

/// Decoded entry header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    pub tag: Tag,
    pub version: Version,
    pub payload_size: usize,
}

impl EntryHeader {
    /// Read the header of the entry at `offset` within an entry area
    pub fn read(area: &[u8], offset: usize) -> Option<Self> {
        Some(Self {
            tag: read_u16(area, offset.checked_add(TAG_OFFSET)?)?,
            version: read_u16(area, offset.checked_add(ENTRY_VERSION_OFFSET)?)?,
            payload_size: read_usize(area, offset.checked_add(PAYLOAD_SIZE_OFFSET)?)?,
        })
    }

    /// Write this header at `offset`, zeroing its padding
    pub fn write(&self, area: &mut [u8], offset: usize) -> Option<()> {
        let end = offset.checked_add(ENTRY_HEADER_SIZE)?;
        area.get_mut(offset..end)?.fill(0);
        write_u16(area, offset + TAG_OFFSET, self.tag)?;
        write_u16(area, offset + ENTRY_VERSION_OFFSET, self.version)?;
        write_usize(area, offset + PAYLOAD_SIZE_OFFSET, self.payload_size)
    }

    /// Rewrite only the tag of the entry at `offset`
    pub fn write_tag(area: &mut [u8], offset: usize, tag: Tag) -> Option<()> {
        write_u16(area, offset.checked_add(TAG_OFFSET)?, tag)
    }
}

/// Read the footer (duplicate payload size) at `offset`
pub fn read_footer(area: &[u8], offset: usize) -> Option<usize> {
    read_usize(area, offset)
}

/// Write the footer (duplicate payload size) at `offset`
pub fn write_footer(area: &mut [u8], offset: usize, payload_size: usize) -> Option<()> {
    write_usize(area, offset, payload_size)
}
