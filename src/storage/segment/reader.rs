//! Segment Reader
//!
//! Index building, point lookups and full reads over segment files.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;
use crate::memtable::MemTableEntry;

use super::SegmentIterator;

/// In-memory index: key → offset of the record's key-length prefix
pub type SegmentIndex = BTreeMap<Vec<u8>, u64>;

/// Scan the whole file and record where every key's record starts
pub fn build_index(path: &Path) -> Result<SegmentIndex> {
    let mut index = SegmentIndex::new();
    let mut iter = SegmentIterator::open(path)?;

    for record in iter.by_ref() {
        let record = record?;
        index.insert(record.key, record.offset);
    }

    if iter.was_truncated() {
        warn!(path = %path.display(), "segment ends in a torn record");
    }
    debug!(path = %path.display(), keys = index.len(), "segment index built");

    Ok(index)
}

/// Scan forward from `offset` for `key`
///
/// Pass offset 0 to scan from the start of the file. Returns `None` if the
/// key is not reached before EOF. Keys are ascending, so the scan also stops
/// once it passes where the key would be.
pub fn point_lookup(path: &Path, key: &[u8], offset: u64) -> Result<Option<MemTableEntry>> {
    for record in SegmentIterator::open_at(path, offset)? {
        let record = record?;
        match record.key.as_slice().cmp(key) {
            std::cmp::Ordering::Equal => return Ok(Some(record.entry)),
            std::cmp::Ordering::Greater => return Ok(None),
            std::cmp::Ordering::Less => {}
        }
    }
    Ok(None)
}

/// Decode every record into a sorted mapping
pub fn read_all(path: &Path) -> Result<BTreeMap<Vec<u8>, MemTableEntry>> {
    let mut entries = BTreeMap::new();
    let mut iter = SegmentIterator::open(path)?;

    for record in iter.by_ref() {
        let record = record?;
        entries.insert(record.key, record.entry);
    }

    if iter.was_truncated() {
        warn!(path = %path.display(), "segment ends in a torn record");
    }

    Ok(entries)
}
