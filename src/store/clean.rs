//! Compactor
//!
//! Physically removes tombstoned entries by shifting the trailing bytes
//! down over them. This is the only operation that moves entry bytes.

use tracing::debug;

use crate::layout::TAG_INVALID;

use super::TagStore;

/// Result of a compaction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Tombstones erased
    pub entries_removed: usize,
    /// Bytes returned to the free tail
    pub bytes_reclaimed: usize,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> TagStore<B> {
    /// Erase every tombstone, preserving the order of surviving entries.
    ///
    /// Handles obtained before the call are invalidated. Running it twice
    /// in a row leaves the region unchanged.
    pub fn clean(&mut self) -> CleanStats {
        let mut stats = CleanStats::default();
        let mut cursor = 0;

        while let Some(tombstone) = self.scan(TAG_INVALID, cursor) {
            let start = tombstone.offset;
            let end = tombstone.end();
            let used = self.used;

            self.area_mut().copy_within(end..used, start);
            self.set_used(used - tombstone.span());

            stats.entries_removed += 1;
            stats.bytes_reclaimed += tombstone.span();
            // The entry that followed now sits at `start`
            cursor = start;
        }

        if stats.entries_removed > 0 {
            debug!(
                removed = stats.entries_removed,
                reclaimed = stats.bytes_reclaimed,
                used = self.used,
                "Compacted region"
            );
        }

        stats
    }
}
