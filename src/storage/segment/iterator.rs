//! Segment Iterator
//!
//! Sequential decoding of a segment file from a given offset.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::Path;

use crate::error::Result;
use crate::record::{Record, RecordReader};

/// Forward iterator over a segment's records
///
/// Ends at EOF or at a torn trailing record.
pub struct SegmentIterator {
    records: RecordReader<BufReader<File>>,
}

impl SegmentIterator {
    /// Iterate the whole file
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_at(path, 0)
    }

    /// Iterate starting at the record that begins at `offset`
    pub fn open_at(path: &Path, offset: u64) -> Result<Self> {
        let mut file = File::open(path)?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset))?;
        }
        Ok(Self {
            records: RecordReader::new(BufReader::new(file), offset),
        })
    }

    /// Whether iteration stopped on a torn record
    pub fn was_truncated(&self) -> bool {
        self.records.was_truncated()
    }
}

impl Iterator for SegmentIterator {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }
}
