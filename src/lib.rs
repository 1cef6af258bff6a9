//! # TagStore
//!
//! A fixed-capacity record store over one contiguous byte region:
//! - Variable-length binary records tagged with a 16-bit identifier
//! - Bump-pointer append, tag scans, tombstone removal
//! - No external index: the region is self-describing and recoverable
//! - Consistency repair by truncation after an unclean restart
//! - Explicit compaction of tombstoned records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Caller (owns the buffer)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ reset / initialize
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    TagStore<B>                               │
//! │   append · find_next · remove · check_and_repair · clean     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Navigator  │          │   Layout    │
//!   │ (next/prev) │          │ (hdr/ftr)   │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use tagstore::TagStore;
//!
//! let mut store = TagStore::reset(vec![0u8; 1024]).unwrap();
//! let handle = store.append_bytes(7, 1, b"hello").unwrap();
//!
//! let found = store.find_next(7, None).unwrap().unwrap();
//! assert_eq!(found.handle, handle);
//! assert_eq!(store.payload(found.handle).unwrap(), b"hello");
//!
//! store.remove(handle).unwrap();
//! store.clean();
//! assert!(store.is_empty());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod layout;
pub mod store;
pub mod shared;
pub mod image;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TagStoreError, Result};
pub use config::StoreConfig;
pub use layout::{Tag, Version, TAG_INVALID};
pub use shared::SharedTagStore;
pub use store::{
    CleanStats, Consistency, Entry, Found, Handle, InitOutcome, InitReport, RegionStats, TagStore,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of TagStore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
