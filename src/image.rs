//! Region Images
//!
//! Save and load a region verbatim to a file, standing in for memory that
//! survives a restart. An image carries no extra framing: it is exactly the
//! managed bytes of the region (header + entry area).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::store::TagStore;

/// Write the region bytes of `store` to `path` and sync them to disk
pub fn save<B: AsRef<[u8]> + AsMut<[u8]>>(path: &Path, store: &TagStore<B>) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    file.write_all(store.as_bytes())?;
    file.sync_all()?;

    tracing::debug!(path = %path.display(), bytes = store.capacity(), "Saved region image");
    Ok(())
}

/// Read a region image back into an owned buffer.
///
/// The bytes are not validated here; pass them to `TagStore::initialize`.
pub fn load(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Loaded region image");
    Ok(bytes)
}
