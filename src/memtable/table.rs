//! MemTable implementation
//!
//! BTreeMap-based memtable with an incrementally maintained byte size.

use std::collections::btree_map;
use std::collections::BTreeMap;

use super::MemTableEntry;

/// In-memory table for recent writes
#[derive(Debug, Default)]
pub struct MemTable {
    data: BTreeMap<Vec<u8>, MemTableEntry>,
    /// Sum of key length + value length over all entries
    size: usize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a key, tombstones included
    pub fn get(&self, key: &[u8]) -> Option<&MemTableEntry> {
        self.data.get(key)
    }

    /// Upsert a value, returning the new byte size
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> usize {
        self.insert(key, MemTableEntry::Value(value))
    }

    /// Record a tombstone, returning the new byte size
    pub fn delete(&mut self, key: Vec<u8>) -> usize {
        self.insert(key, MemTableEntry::Tombstone)
    }

    /// Upsert an entry as-is, returning the new byte size
    pub fn insert(&mut self, key: Vec<u8>, entry: MemTableEntry) -> usize {
        let key_len = key.len();
        let value_len = entry.value_len();
        match self.data.insert(key, entry) {
            // Key bytes were already counted when the key first arrived
            Some(old) => self.size = self.size - old.value_len() + value_len,
            None => self.size += key_len + value_len,
        }
        self.size
    }

    /// Key+value byte total, the flush trigger metric
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of entries, tombstones included
    pub fn entry_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop every entry (after a successful flush)
    pub fn clear(&mut self) {
        self.data.clear();
        self.size = 0;
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> btree_map::Iter<'_, Vec<u8>, MemTableEntry> {
        self.data.iter()
    }

    /// The full sorted contents
    pub fn data(&self) -> &BTreeMap<Vec<u8>, MemTableEntry> {
        &self.data
    }
}
