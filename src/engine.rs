//! Engine Module
//!
//! The storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Coordinate WAL, MemTable, and Storage
//! - Trigger flushes when the MemTable reaches its byte limit
//! - Run major compaction on request
//! - Recover state on startup

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::memtable::{MemTable, MemTableEntry};
use crate::record;
use crate::storage::{SegmentId, StorageManager};
use crate::wal::{WalRecovery, WalWriter};

/// The main storage engine
///
/// ## Concurrency Model: Fully Serialized
///
/// All mutable state sits behind one mutex. Every public call, flush and
/// compaction included, runs to completion before the next one starts, so
/// callers observe strictly sequential execution. There are no background
/// threads.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// WAL path (derived from data_dir)
    wal_path: PathBuf,

    inner: Mutex<EngineState>,
}

/// State guarded by the engine lock
struct EngineState {
    /// Write-ahead log for the current MemTable generation
    wal: WalWriter,

    /// In-memory table for recent writes
    memtable: MemTable,

    /// Live segments plus their indexes and filters
    storage: StorageManager,
}

impl Engine {
    const WAL_FILENAME: &'static str = "wal.log";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Load existing segments (rebuilding indexes and filters)
    /// 3. Replay the WAL into the MemTable
    /// 4. Open the WAL for appending
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir)?;
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let storage =
            StorageManager::open(&config.data_dir, config.bloom_bits, config.bloom_hashes)?;

        // Replayed records are applied as plain upserts
        let mut memtable = MemTable::new();
        let recovery = WalRecovery::recover(&wal_path, |key, entry| {
            memtable.insert(key, entry);
        })?;

        let wal = WalWriter::open(&wal_path)?;

        info!(
            data_dir = %config.data_dir.display(),
            segments = storage.segment_count(),
            recovered = recovery.records_recovered,
            memtable_entries = memtable.entry_count(),
            "engine opened"
        );

        Ok(Self {
            config,
            wal_path,
            inner: Mutex::new(EngineState {
                wal,
                memtable,
                storage,
            }),
        })
    }

    /// Open with a directory and MemTable byte limit, defaults otherwise
    pub fn open_with_limit(path: impl AsRef<Path>, memtable_size_limit: usize) -> Result<Self> {
        let config = Config::builder()
            .data_dir(path.as_ref())
            .memtable_size_limit(memtable_size_limit)
            .build()?;
        Self::open(config)
    }

    /// Get a value by key
    ///
    /// Search order:
    /// 1. MemTable (most recent writes)
    /// 2. Segments (newest to oldest); the first one holding the key decides
    ///
    /// A tombstone at the deciding layer reads as `None`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let state = self.inner.lock();

        if let Some(entry) = state.memtable.get(key) {
            return Ok(match entry {
                MemTableEntry::Value(value) => Some(value.clone()),
                MemTableEntry::Tombstone => None,
            });
        }

        Ok(state.storage.get(key)?.and_then(MemTableEntry::into_value))
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Append to the WAL (durable on return)
    /// 2. Apply to the MemTable
    /// 3. Flush if the MemTable reached its limit
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.apply(key, MemTableEntry::Value(value.to_vec()))
    }

    /// Delete a key
    ///
    /// Logical delete: records a tombstone exactly as `put` records a value.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.apply(key, MemTableEntry::Tombstone)
    }

    /// Flush the MemTable to a new segment regardless of its size
    ///
    /// Returns the new generation, or `None` if the MemTable was empty.
    pub fn flush(&self) -> Result<Option<SegmentId>> {
        let mut state = self.inner.lock();
        state.flush_memtable()
    }

    /// Major compaction of every live segment into one
    ///
    /// Returns the new generation, or `None` if there were no segments.
    /// The MemTable is left untouched.
    pub fn compact(&self) -> Result<Option<SegmentId>> {
        let mut state = self.inner.lock();
        state.storage.compact()
    }

    /// Close the engine gracefully
    ///
    /// Flushes any pending data and syncs the WAL.
    pub fn close(self) -> Result<()> {
        let mut state = self.inner.into_inner();
        state.flush_memtable()?;
        state.wal.sync()?;
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL path
    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    /// Get the current memtable byte size
    pub fn memtable_size(&self) -> usize {
        self.inner.lock().memtable.size()
    }

    /// Get the memtable entry count
    pub fn memtable_entry_count(&self) -> usize {
        self.inner.lock().memtable.entry_count()
    }

    /// Get the number of live segments
    pub fn segment_count(&self) -> usize {
        self.inner.lock().storage.segment_count()
    }

    /// Live segment generations, oldest first
    pub fn segment_ids(&self) -> Vec<SegmentId> {
        self.inner.lock().storage.segment_ids().to_vec()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn apply(&self, key: &[u8], entry: MemTableEntry) -> Result<()> {
        record::check_lengths(key, &entry)?;

        let mut state = self.inner.lock();

        state.wal.append(key, &entry)?;
        let new_size = state.memtable.insert(key.to_vec(), entry);

        if new_size >= self.config.memtable_size_limit {
            debug!(size = new_size, limit = self.config.memtable_size_limit, "flush triggered");
            state.flush_memtable()?;
        }

        Ok(())
    }
}

impl EngineState {
    /// Write the MemTable out, then clear it and the WAL
    fn flush_memtable(&mut self) -> Result<Option<SegmentId>> {
        let id = self.storage.flush(&self.memtable)?;
        if id.is_some() {
            self.memtable.clear();
            self.wal.clear()?;
        }
        Ok(id)
    }
}
