//! WAL Reader
//!
//! Lazy, in-order iteration over the records of a WAL file.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::memtable::MemTableEntry;
use crate::record::RecordReader;

/// Reads records from the WAL file, front to back
///
/// The sequence ends at clean EOF or at the first record that cannot be
/// fully decoded; `was_truncated` tells the two apart afterwards.
pub struct WalReader {
    records: RecordReader<BufReader<File>>,
}

impl WalReader {
    /// Open a WAL file for reading from the start
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            records: RecordReader::new(BufReader::new(file), 0),
        })
    }

    /// Offset just past the last complete record read so far
    pub fn valid_bytes(&self) -> u64 {
        self.records.position()
    }

    /// Whether reading stopped on a torn record
    pub fn was_truncated(&self) -> bool {
        self.records.was_truncated()
    }
}

impl Iterator for WalReader {
    type Item = Result<(Vec<u8>, MemTableEntry)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .next()
            .map(|r| r.map(|record| (record.key, record.entry)))
    }
}
