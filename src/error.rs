//! Error types for TagStore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TagStoreError
pub type Result<T> = std::result::Result<T, TagStoreError>;

/// Unified error type for TagStore operations
///
/// Structural corruption inside the entry area is not an error: it is
/// detected and repaired by `TagStore::check_and_repair`.
#[derive(Debug, Error)]
pub enum TagStoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Region Errors
    // -------------------------------------------------------------------------
    #[error("Region too small: {capacity} bytes (minimum {minimum})")]
    RegionTooSmall { capacity: usize, minimum: usize },

    #[error("Capacity {capacity} exceeds backing buffer of {buffer} bytes")]
    CapacityExceedsBuffer { capacity: usize, buffer: usize },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid tag: {0}")]
    InvalidTag(u16),

    #[error("Invalid handle: offset {0} does not address an entry payload")]
    InvalidHandle(usize),

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("Insufficient space: {required} bytes required, {available} available")]
    InsufficientSpace { required: usize, available: usize },

    // -------------------------------------------------------------------------
    // Unsupported Operations
    // -------------------------------------------------------------------------
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}
