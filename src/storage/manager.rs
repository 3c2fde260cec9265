//! Storage Manager
//!
//! Owns the live segments and their derived caches.
//!
//! ## Responsibilities
//! - Discover existing segments on startup and rebuild their index + filter
//! - Search segments newest → oldest for reads
//! - Publish new segments from MemTable flushes (temp file + rename)
//! - Major compaction of every live segment into one
//!
//! ## Ownership
//! `segments`, `indexes` and `filters` are keyed by `SegmentId` and always
//! change together: a generation is in all three or in none.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::bloom::BloomFilter;
use crate::error::{LsmError, Result};
use crate::memtable::{MemTable, MemTableEntry};

use super::segment::{
    self, SegmentBuilder, SegmentId, SegmentIndex, COMPACT_TEMP_FILE, FLUSH_TEMP_FILE,
};

/// Manages the on-disk layer
pub struct StorageManager {
    /// Directory where segments live
    data_dir: PathBuf,

    /// Live generations, ascending (oldest first)
    segments: Vec<SegmentId>,

    /// Per-segment key → offset index
    indexes: HashMap<SegmentId, SegmentIndex>,

    /// Per-segment bloom filter
    filters: HashMap<SegmentId, BloomFilter>,

    /// Highest generation handed out so far (0 if none)
    last_id: SegmentId,

    bloom_bits: usize,
    bloom_hashes: u32,
}

impl StorageManager {
    /// Open storage in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Remove temp files left by a crash before publication
    /// 3. Discover `NNNN.seg` files, ignoring anything else
    /// 4. Rebuild each segment's index and filter (oldest first)
    pub fn open(path: &Path, bloom_bits: usize, bloom_hashes: u32) -> Result<Self> {
        fs::create_dir_all(path)?;

        for temp in [FLUSH_TEMP_FILE, COMPACT_TEMP_FILE] {
            let temp_path = path.join(temp);
            if temp_path.exists() {
                warn!(path = %temp_path.display(), "removing unpublished segment");
                fs::remove_file(&temp_path)?;
            }
        }

        let mut ids: Vec<SegmentId> = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();

            if !file_path.is_file() {
                continue;
            }
            match SegmentId::from_path(&file_path) {
                Some(id) => ids.push(id),
                None => debug!(path = %file_path.display(), "ignoring non-segment file"),
            }
        }
        ids.sort();
        ids.dedup();

        let mut manager = Self {
            data_dir: path.to_path_buf(),
            segments: Vec::with_capacity(ids.len()),
            indexes: HashMap::new(),
            filters: HashMap::new(),
            last_id: ids.last().copied().unwrap_or(SegmentId(0)),
            bloom_bits,
            bloom_hashes,
        };

        for id in ids {
            manager.register(id)?;
        }

        if !manager.segments.is_empty() {
            info!(
                segments = manager.segments.len(),
                last_generation = manager.last_id.0,
                "segments discovered"
            );
        }

        Ok(manager)
    }

    /// Look a key up across segments, newest → oldest
    ///
    /// Returns:
    /// - `Ok(Some(Value(..)))` — newest record for the key is a value
    /// - `Ok(Some(Tombstone))` — newest record for the key is a deletion
    /// - `Ok(None)` — no segment holds the key
    /// - `Err(SegmentMissing)` — a live segment's file is gone
    pub fn get(&self, key: &[u8]) -> Result<Option<MemTableEntry>> {
        for &id in self.segments.iter().rev() {
            if let Some(filter) = self.filters.get(&id) {
                if !filter.might_contain(key) {
                    continue;
                }
            }

            let found = match self.indexes.get(&id) {
                Some(index) => match index.get(key) {
                    Some(&offset) => self.lookup(id, key, offset)?,
                    None => None,
                },
                // Every live segment has an index; scan from the start if not
                None => self.lookup(id, key, 0)?,
            };

            if found.is_some() {
                return Ok(found);
            }
        }

        Ok(None)
    }

    /// Write a MemTable to a new segment
    ///
    /// Returns the new generation, or `None` for an empty MemTable.
    /// The caller clears the MemTable and WAL afterwards.
    pub fn flush(&mut self, memtable: &MemTable) -> Result<Option<SegmentId>> {
        if memtable.is_empty() {
            return Ok(None);
        }

        let id = self.last_id.next();
        self.publish(id, FLUSH_TEMP_FILE, memtable.iter())?;
        self.last_id = id;
        self.register(id)?;

        info!(
            generation = id.0,
            entries = memtable.entry_count(),
            bytes = memtable.size(),
            "memtable flushed"
        );

        Ok(Some(id))
    }

    /// Merge every live segment into one, dropping tombstones
    ///
    /// Returns the new generation, or `None` when there is nothing to compact.
    pub fn compact(&mut self) -> Result<Option<SegmentId>> {
        if self.segments.is_empty() {
            return Ok(None);
        }

        // Oldest first, so newer records overwrite older ones
        let mut merged: BTreeMap<Vec<u8>, MemTableEntry> = BTreeMap::new();
        for &id in &self.segments {
            let path = self.segment_path(id);
            let entries = segment::read_all(&path).map_err(|e| missing_as(e, id, &path))?;
            merged.extend(entries);
        }

        let before = merged.len();
        merged.retain(|_, entry| !entry.is_tombstone());
        let dropped = before - merged.len();

        let id = self.last_id.next();
        self.publish(id, COMPACT_TEMP_FILE, merged.iter())?;
        self.last_id = id;

        // The merged segment goes live before any old one is dropped
        let old = std::mem::take(&mut self.segments);
        if let Err(e) = self.register(id) {
            self.segments = old;
            return Err(e);
        }
        for &old_id in &old {
            self.unregister(old_id);
        }

        // Old files are garbage now; failing to delete one is not fatal
        for &old_id in &old {
            remove_compacted(old_id, &self.segment_path(old_id));
        }
        sync_dir(&self.data_dir)?;

        info!(
            generation = id.0,
            merged_segments = old.len(),
            live_keys = merged.len(),
            tombstones_dropped = dropped,
            "compaction complete"
        );

        Ok(Some(id))
    }

    /// Number of live segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Live generations, oldest first
    pub fn segment_ids(&self) -> &[SegmentId] {
        &self.segments
    }

    /// Index of a live segment
    pub fn index(&self, id: SegmentId) -> Option<&SegmentIndex> {
        self.indexes.get(&id)
    }

    /// Bloom filter of a live segment
    pub fn filter(&self, id: SegmentId) -> Option<&BloomFilter> {
        self.filters.get(&id)
    }

    /// Highest generation handed out so far
    pub fn last_id(&self) -> SegmentId {
        self.last_id
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// File path of a generation
    pub fn segment_path(&self, id: SegmentId) -> PathBuf {
        id.path_in(&self.data_dir)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write entries under a temp name, then rename to the generation's name
    fn publish<'a, I>(&self, id: SegmentId, temp_name: &str, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a Vec<u8>, &'a MemTableEntry)>,
    {
        let temp_path = self.data_dir.join(temp_name);
        let final_path = self.segment_path(id);

        SegmentBuilder::write(&temp_path, entries)?;
        fs::rename(&temp_path, &final_path)?;
        sync_dir(&self.data_dir)?;

        Ok(())
    }

    /// Scan a published segment and add it to all three structures
    fn register(&mut self, id: SegmentId) -> Result<()> {
        let path = self.segment_path(id);
        let index = segment::build_index(&path).map_err(|e| missing_as(e, id, &path))?;
        let filter = BloomFilter::from_keys(
            self.bloom_bits,
            self.bloom_hashes,
            index.keys().map(|k| k.as_slice()),
        );

        self.indexes.insert(id, index);
        self.filters.insert(id, filter);
        self.segments.push(id);
        Ok(())
    }

    /// Drop a generation's cached index and filter
    fn unregister(&mut self, id: SegmentId) {
        self.segments.retain(|&s| s != id);
        self.indexes.remove(&id);
        self.filters.remove(&id);
    }

    fn lookup(&self, id: SegmentId, key: &[u8], offset: u64) -> Result<Option<MemTableEntry>> {
        let path = self.segment_path(id);
        segment::point_lookup(&path, key, offset).map_err(|e| missing_as(e, id, &path))
    }
}

/// Turn "file not found" on a live segment into `SegmentMissing`
fn missing_as(err: LsmError, id: SegmentId, path: &Path) -> LsmError {
    match err {
        LsmError::Io(e) if e.kind() == ErrorKind::NotFound => LsmError::SegmentMissing {
            id,
            path: path.to_path_buf(),
        },
        other => other,
    }
}

/// Delete a segment file that compaction superseded
///
/// Already gone is fine. Any other failure is logged and left for a later
/// compaction, since the in-memory state no longer refers to the file.
fn remove_compacted(id: SegmentId, path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(
            generation = id.0,
            path = %path.display(),
            error = %e,
            "failed to remove compacted segment"
        ),
    }
}

/// Persist directory entries (renames, removals)
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}
