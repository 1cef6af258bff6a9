//! Shared Store
//!
//! Mutex-guarded handle for callers that share one region across threads.
//!
//! ## Concurrency:
//! - The engine itself is single-threaded and lock-free
//! - `SharedTagStore` serializes every access with a `parking_lot::Mutex`
//! - Convenience methods copy payloads out, since handles are only stable
//!   while no other caller can run `clean`

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use crate::layout::{Tag, Version};
use crate::store::{CleanStats, Consistency, Handle, TagStore};

/// A `TagStore` behind a mutex
pub struct SharedTagStore<B> {
    inner: Mutex<TagStore<B>>,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> SharedTagStore<B> {
    /// Wrap an opened store
    pub fn new(store: TagStore<B>) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Exclusive access to the underlying store
    pub fn lock(&self) -> MutexGuard<'_, TagStore<B>> {
        self.inner.lock()
    }

    /// Append a record and copy `payload` into it
    pub fn append_bytes(&self, tag: Tag, version: Version, payload: &[u8]) -> Result<Handle> {
        self.inner.lock().append_bytes(tag, version, payload)
    }

    /// Copy out every record tagged `tag`, in physical order
    pub fn read_all(&self, tag: Tag) -> Result<Vec<(Version, Vec<u8>)>> {
        let store = self.inner.lock();
        store
            .find_all(tag)?
            .map(|found| -> Result<(Version, Vec<u8>)> {
                Ok((found.version, store.payload(found.handle)?.to_vec()))
            })
            .collect()
    }

    /// Tombstone every record tagged `tag`; returns how many were removed
    pub fn remove_all(&self, tag: Tag) -> Result<usize> {
        let mut store = self.inner.lock();
        let handles: Vec<Handle> = store.find_all(tag)?.map(|found| found.handle).collect();
        for handle in &handles {
            store.remove(*handle)?;
        }
        Ok(handles.len())
    }

    /// Verify the region, then compact it
    pub fn maintain(&self) -> (Consistency, CleanStats) {
        let mut store = self.inner.lock();
        let consistency = store.check_and_repair();
        let cleaned = store.clean();
        (consistency, cleaned)
    }

    /// Release the wrapped store
    pub fn into_inner(self) -> TagStore<B> {
        self.inner.into_inner()
    }
}
