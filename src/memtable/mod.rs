//! MemTable Module
//!
//! In-memory buffer for writes since the last flush.
//!
//! ## Responsibilities
//! - Ordered key → entry mapping (required for segment generation)
//! - Track key+value byte totals for the flush trigger
//! - Hold tombstones verbatim; interpreting them is the engine's job
//!
//! ## Data Structure Choice
//! A plain BTreeMap. The engine serializes every call behind its own lock,
//! so the table needs no interior locking.

mod table;

pub use table::MemTable;

/// Entry stored in the MemTable (and encoded in WAL and segment records)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemTableEntry {
    /// A live value
    Value(Vec<u8>),

    /// A tombstone (deleted key)
    Tombstone,
}

impl MemTableEntry {
    /// Bytes this entry contributes to the memtable size metric
    pub fn value_len(&self) -> usize {
        match self {
            MemTableEntry::Value(v) => v.len(),
            MemTableEntry::Tombstone => 0,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, MemTableEntry::Tombstone)
    }

    /// The live value, or `None` for a tombstone
    pub fn into_value(self) -> Option<Vec<u8>> {
        match self {
            MemTableEntry::Value(v) => Some(v),
            MemTableEntry::Tombstone => None,
        }
    }
}
