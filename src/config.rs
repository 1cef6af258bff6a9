//! Configuration for TagStore
//!
//! Centralized configuration with sensible defaults.

/// Configuration used when resetting or opening a region
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Region Configuration
    // -------------------------------------------------------------------------
    /// Bytes of the backing buffer managed by the store, header included.
    /// `None` manages the whole buffer.
    pub capacity: Option<usize>,

    // -------------------------------------------------------------------------
    // Maintenance Configuration
    // -------------------------------------------------------------------------
    /// Compact tombstoned entries while initializing an existing region
    pub compact_on_open: bool,
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Resolve the managed capacity for a buffer of `buffer_len` bytes
    pub fn capacity_for(&self, buffer_len: usize) -> usize {
        self.capacity.unwrap_or(buffer_len)
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the managed capacity (in bytes, region header included)
    pub fn capacity(mut self, bytes: usize) -> Self {
        self.config.capacity = Some(bytes);
        self
    }

    /// Compact tombstones when initializing an existing region
    pub fn compact_on_open(mut self, enabled: bool) -> Self {
        self.config.compact_on_open = enabled;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
