//! Store Module
//!
//! The tagged storage engine over a single caller-provided byte region.
//!
//! ## Responsibilities
//! - Stamp, validate and adopt region headers (reset / attach / initialize)
//! - Bump-pointer placement of new entries at the tail (append)
//! - Forward/backward navigation via duplicated length fields
//! - Resumable tag scans
//! - Tombstoning, structural repair by truncation, and compaction
//!
//! ## Lifecycle
//! ```text
//!   buffer ──► reset ─────────────┐
//!          └─► attach ──► check ──┴──► append / find / remove ──► clean
//!              (initialize = attach + check, reset on failure [+ clean])
//! ```
//!
//! The store holds no locks and no global state. Every operation is a
//! bounded, synchronous computation over the region it wraps; callers that
//! share a region across threads wrap it (see `SharedTagStore`).

mod append;
mod check;
mod clean;
mod mutate;
mod navigator;
mod scan;

pub use check::Consistency;
pub use clean::CleanStats;
pub use navigator::{Entries, Entry};
pub use scan::{FindAll, Found};

use tracing::{info, warn};

use crate::config::StoreConfig;
use crate::error::{Result, TagStoreError};
use crate::layout::{RegionHeader, REGION_HEADER_SIZE};

/// Reference to an entry's payload: its offset within the entry area.
///
/// Handles stay valid until the next `clean`, `clear`, or a repair that
/// truncates past them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub(crate) usize);

impl Handle {
    /// Rebuild a handle from a stored payload offset.
    ///
    /// The offset is validated by every operation that takes a handle.
    pub fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// Payload offset relative to the start of the entry area
    pub fn offset(&self) -> usize {
        self.0
    }
}

/// Fixed-capacity tagged record store over a byte buffer
///
/// `B` is any byte container: `Vec<u8>`, `Box<[u8]>`, or `&mut [u8]`
/// pointing at memory that survives restarts.
pub struct TagStore<B> {
    /// Backing region (header + entry area, possibly followed by unmanaged bytes)
    buffer: B,
    /// Managed bytes, header included (mirrors `storage_size`)
    capacity: usize,
    /// Bytes of the entry area holding entries (mirrors `entries_size`)
    used: usize,
}

/// How `initialize` obtained a valid region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The existing header and every entry were valid and kept
    Reused,
    /// The region was reset from scratch, discarding its entries
    Reset { reason: String },
}

/// Result of an `initialize` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub outcome: InitOutcome,
    /// Outcome of the entry check on an attached region
    pub repair: Consistency,
    /// Compaction performed when `compact_on_open` is set
    pub cleaned: CleanStats,
}

/// Point-in-time usage summary of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionStats {
    pub capacity: usize,
    pub entry_space: usize,
    pub used: usize,
    pub available: usize,
    pub live_entries: usize,
    pub tombstones: usize,
    pub tombstoned_bytes: usize,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> TagStore<B> {
    // =========================================================================
    // Region State
    // =========================================================================

    /// Reset the whole buffer into an empty region
    pub fn reset(buffer: B) -> Result<Self> {
        Self::reset_with(buffer, &StoreConfig::default())
    }

    /// Reset `config.capacity` bytes of the buffer into an empty region.
    ///
    /// Zero-fills the managed bytes, stamps magic/version/capacity and sets
    /// the used size to 0.
    pub fn reset_with(mut buffer: B, config: &StoreConfig) -> Result<Self> {
        let capacity = Self::resolve_capacity(&buffer, config)?;
        Self::format(buffer.as_mut(), capacity);
        info!(capacity, "Region reset");

        Ok(Self {
            buffer,
            capacity,
            used: 0,
        })
    }

    /// Reuse an existing region after validating only its header.
    ///
    /// If the stored capacity differs from the configured one (the backing
    /// memory grew or shrank), the header is adopted to the new capacity and
    /// the used size is clamped to fit. Entries are not verified: call
    /// `check_and_repair` before any other operation.
    pub fn attach(mut buffer: B, config: &StoreConfig) -> Result<Self> {
        let capacity = Self::resolve_capacity(&buffer, config)?;
        let used = Self::adopt_header(buffer.as_mut(), capacity)?;

        Ok(Self {
            buffer,
            capacity,
            used,
        })
    }

    /// Open the whole buffer as a region, resetting it if it is not valid
    pub fn initialize(buffer: B) -> Result<Self> {
        Self::initialize_with(buffer, &StoreConfig::default()).map(|(store, _)| store)
    }

    /// Open a region, resetting it if it fails verification.
    ///
    /// The header is validated first, then every entry. If either check
    /// fails the region is reset and all stored entries are discarded;
    /// `report.repair` still records what the entry check found. Use
    /// `attach` + `check_and_repair` to keep the valid prefix instead.
    /// Tombstones are compacted when `config.compact_on_open` is set. The
    /// returned store is always valid.
    pub fn initialize_with(mut buffer: B, config: &StoreConfig) -> Result<(Self, InitReport)> {
        let capacity = Self::resolve_capacity(&buffer, config)?;

        let (used, mut outcome) = match Self::adopt_header(buffer.as_mut(), capacity) {
            Ok(used) => (used, InitOutcome::Reused),
            Err(e) => {
                warn!("Discarding region contents: {}", e);
                Self::format(buffer.as_mut(), capacity);
                (0, InitOutcome::Reset { reason: e.to_string() })
            }
        };

        let mut store = Self {
            buffer,
            capacity,
            used,
        };

        let repair = match outcome {
            InitOutcome::Reused => store.check_and_repair(),
            InitOutcome::Reset { .. } => Consistency::AlreadyConsistent,
        };
        if let Consistency::Repaired {
            valid_entries,
            discarded_bytes,
        } = repair
        {
            warn!(
                valid_entries,
                discarded_bytes, "Entries failed verification, discarding region contents"
            );
            store.clear();
            outcome = InitOutcome::Reset {
                reason: format!(
                    "corrupt entry after {} valid entries ({} bytes unverifiable)",
                    valid_entries, discarded_bytes
                ),
            };
        }

        let cleaned = if config.compact_on_open {
            store.clean()
        } else {
            CleanStats::default()
        };

        info!(
            capacity,
            used = store.used,
            reused = matches!(outcome, InitOutcome::Reused),
            "Region initialized"
        );

        Ok((
            store,
            InitReport {
                outcome,
                repair,
                cleaned,
            },
        ))
    }

    /// Reset this region in place, discarding every entry
    pub fn clear(&mut self) {
        Self::format(self.buffer.as_mut(), self.capacity);
        self.used = 0;
        info!(capacity = self.capacity, "Region cleared");
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Managed bytes, region header included
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes available to entries (capacity minus region header)
    pub fn entry_space(&self) -> usize {
        self.capacity - REGION_HEADER_SIZE
    }

    /// Bytes currently occupied by entries
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes left in the free tail
    pub fn available(&self) -> usize {
        self.entry_space() - self.used
    }

    /// True if the region holds no entries (tombstones included)
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Region header as tracked by the store.
    ///
    /// Every state change writes the same values to the header bytes.
    pub fn header(&self) -> RegionHeader {
        RegionHeader {
            storage_size: self.capacity,
            entries_size: self.used,
            ..RegionHeader::new(self.capacity)
        }
    }

    /// Raw managed bytes (header + entry area), e.g. for persisting an image
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_ref()[..self.capacity]
    }

    /// Release the backing buffer
    pub fn into_inner(self) -> B {
        self.buffer
    }

    /// Usage summary, counting live entries and tombstones
    pub fn stats(&self) -> RegionStats {
        let mut stats = RegionStats {
            capacity: self.capacity,
            entry_space: self.entry_space(),
            used: self.used,
            available: self.available(),
            live_entries: 0,
            tombstones: 0,
            tombstoned_bytes: 0,
        };

        for entry in self.entries() {
            if entry.is_tombstone() {
                stats.tombstones += 1;
                stats.tombstoned_bytes += entry.span();
            } else {
                stats.live_entries += 1;
            }
        }

        stats
    }

    /// CRC32 over the region header and the used part of the entry area.
    ///
    /// Bytes in the free tail do not contribute.
    pub fn digest(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.buffer.as_ref()[..REGION_HEADER_SIZE + self.used]);
        hasher.finalize()
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Entry area up to the used boundary
    pub(crate) fn live(&self) -> &[u8] {
        &self.buffer.as_ref()[REGION_HEADER_SIZE..REGION_HEADER_SIZE + self.used]
    }

    /// Whole entry area, free tail included
    pub(crate) fn area_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[REGION_HEADER_SIZE..self.capacity]
    }

    /// Update the used size in memory and in the region header
    pub(crate) fn set_used(&mut self, used: usize) {
        debug_assert!(used <= self.entry_space());
        self.used = used;
        let written = RegionHeader::write_entries_size(self.buffer.as_mut(), used);
        debug_assert!(written.is_some());
    }

    fn resolve_capacity(buffer: &B, config: &StoreConfig) -> Result<usize> {
        let buffer_len = buffer.as_ref().len();
        let capacity = config.capacity_for(buffer_len);

        if capacity > buffer_len {
            return Err(TagStoreError::CapacityExceedsBuffer {
                capacity,
                buffer: buffer_len,
            });
        }
        if capacity < REGION_HEADER_SIZE {
            return Err(TagStoreError::RegionTooSmall {
                capacity,
                minimum: REGION_HEADER_SIZE,
            });
        }

        Ok(capacity)
    }

    fn format(bytes: &mut [u8], capacity: usize) {
        let region = &mut bytes[..capacity];
        region.fill(0);
        let written = RegionHeader::new(capacity).write(region);
        debug_assert!(written.is_some());
    }

    /// Validate the header and adopt it to `capacity`; returns the used size
    fn adopt_header(bytes: &mut [u8], capacity: usize) -> Result<usize> {
        let region = &mut bytes[..capacity];
        let mut header = RegionHeader::read(region)
            .ok_or_else(|| TagStoreError::InvalidRegion("truncated header".to_string()))?;
        header.validate().map_err(TagStoreError::InvalidRegion)?;

        let mut adjusted = false;
        if header.storage_size != capacity {
            warn!(
                stored = header.storage_size,
                capacity, "Region capacity changed, adopting new capacity"
            );
            header.storage_size = capacity;
            adjusted = true;
        }

        let entry_space = header.entry_space();
        if header.entries_size > entry_space {
            warn!(
                entries_size = header.entries_size,
                entry_space, "Used size exceeds entry space, clamping"
            );
            header.entries_size = entry_space;
            adjusted = true;
        }

        if adjusted {
            let written = header.write(region);
            debug_assert!(written.is_some());
        }

        Ok(header.entries_size)
    }
}
