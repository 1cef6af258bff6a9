//! Consistency Checker
//!
//! Validates the entry chain and truncates to the last good boundary.
//!
//! Corruption is treated as a suffix hazard (a partial write cut short by
//! an unclean restart). Entries are appended in order, so everything before
//! the first broken entry was fully committed; everything from it onward is
//! dropped rather than guessed at.

use tracing::warn;

use crate::layout::{self, EntryHeader, ENTRY_OVERHEAD};

use super::TagStore;

/// Outcome of a consistency check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consistency {
    /// Every entry was valid up to the recorded used boundary
    AlreadyConsistent,
    /// The used size was truncated to the first invalid entry
    Repaired {
        /// Entries kept before the truncation point
        valid_entries: usize,
        /// Bytes dropped from the used area
        discarded_bytes: usize,
    },
}

impl Consistency {
    /// True if no repair was needed
    pub fn is_consistent(&self) -> bool {
        matches!(self, Consistency::AlreadyConsistent)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> TagStore<B> {
    /// Walk all entries from offset 0 and truncate at the first broken one.
    ///
    /// An entry is broken if its header or footer would lie past the used
    /// boundary, or if the header and footer sizes disagree.
    pub fn check_and_repair(&mut self) -> Consistency {
        let (boundary, valid_entries) = self.valid_prefix();
        if boundary == self.used {
            return Consistency::AlreadyConsistent;
        }

        let discarded_bytes = self.used - boundary;
        warn!(
            offset = boundary,
            valid_entries, discarded_bytes, "Region corrupt, truncating"
        );
        self.set_used(boundary);

        Consistency::Repaired {
            valid_entries,
            discarded_bytes,
        }
    }

    /// Offset of the first broken entry (or `used`) and the count before it
    fn valid_prefix(&self) -> (usize, usize) {
        let area = self.live();
        let mut offset = 0;
        let mut count = 0;

        while offset < area.len() {
            if area.len() - offset < ENTRY_OVERHEAD {
                break;
            }

            let header = match EntryHeader::read(area, offset) {
                Some(header) => header,
                None => break,
            };
            let end = match layout::next_offset(offset, header.payload_size) {
                Some(end) if end <= area.len() => end,
                _ => break,
            };
            let footer = end - layout::ENTRY_FOOTER_SIZE;
            if layout::read_footer(area, footer) != Some(header.payload_size) {
                break;
            }

            offset = end;
            count += 1;
        }

        (offset, count)
    }
}
