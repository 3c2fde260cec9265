//! Configuration for lsmkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{LsmError, Result};

/// Main configuration for an lsmkv engine
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding every file the engine owns
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── wal.log      (write-ahead log)
    ///     ├── 0001.seg     (segments, one per generation)
    ///     └── 0002.seg
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Flush once the memtable's key+value byte total reaches this
    pub memtable_size_limit: usize,

    // -------------------------------------------------------------------------
    // Bloom Filter Configuration
    // -------------------------------------------------------------------------
    /// Bit-array size of every per-segment bloom filter
    pub bloom_bits: usize,

    /// Number of derived hash positions per key
    pub bloom_hashes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./lsmkv_data"),
            memtable_size_limit: 64 * 1024, // 64 KB
            bloom_bits: 1000,
            bloom_hashes: 3,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the invariants the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.memtable_size_limit == 0 {
            return Err(LsmError::Config(
                "memtable_size_limit must be greater than zero".to_string(),
            ));
        }
        if self.bloom_hashes == 0 {
            return Err(LsmError::Config(
                "bloom_hashes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    /// Set the bloom filter bit-array size
    pub fn bloom_bits(mut self, bits: usize) -> Self {
        self.config.bloom_bits = bits;
        self
    }

    /// Set the number of bloom filter hash positions
    pub fn bloom_hashes(mut self, hashes: u32) -> Self {
        self.config.bloom_hashes = hashes;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_zero_limit() {
        let result = Config::builder().memtable_size_limit(0).build();
        assert!(matches!(result, Err(LsmError::Config(_))));
    }

    #[test]
    fn test_builder_rejects_zero_hashes() {
        let result = Config::builder().bloom_hashes(0).build();
        assert!(matches!(result, Err(LsmError::Config(_))));
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = Config::builder()
            .data_dir("/tmp/lsm")
            .memtable_size_limit(128)
            .bloom_bits(64)
            .bloom_hashes(5)
            .build()
            .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/lsm"));
        assert_eq!(config.memtable_size_limit, 128);
        assert_eq!(config.bloom_bits, 64);
        assert_eq!(config.bloom_hashes, 5);
    }
}
