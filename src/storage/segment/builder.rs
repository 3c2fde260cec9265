//! Segment Builder
//!
//! Writes sorted entries to a new segment file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;

use crate::error::{LsmError, Result};
use crate::memtable::MemTableEntry;
use crate::record;

/// What a finished segment file looks like
#[derive(Debug, Clone)]
pub struct SegmentInfo {
    /// Path the file was written to
    pub path: PathBuf,
    /// Number of records written
    pub entry_count: u64,
    /// File size in bytes
    pub file_size: u64,
}

/// Builder for segment files
///
/// Truncates any prior content at the path. Keys must arrive in strictly
/// ascending order.
pub struct SegmentBuilder {
    path: PathBuf,
    writer: BufWriter<File>,
    buf: BytesMut,
    entry_count: u64,
    file_size: u64,
    last_key: Option<Vec<u8>>,
}

impl SegmentBuilder {
    /// Create (or truncate) the file at `path`
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            buf: BytesMut::new(),
            entry_count: 0,
            file_size: 0,
            last_key: None,
        })
    }

    /// Append an entry (must be called in ascending key order)
    pub fn add(&mut self, key: &[u8], entry: &MemTableEntry) -> Result<()> {
        if let Some(last) = &self.last_key {
            if key <= last.as_slice() {
                return Err(LsmError::Storage(format!(
                    "segment keys out of order in {}",
                    self.path.display()
                )));
            }
        }
        record::check_lengths(key, entry)?;

        self.buf.clear();
        record::encode_into(&mut self.buf, key, entry);
        self.writer.write_all(&self.buf)?;

        self.file_size += self.buf.len() as u64;
        self.entry_count += 1;
        self.last_key = Some(key.to_vec());
        Ok(())
    }

    /// Flush and fsync the file
    pub fn finish(self) -> Result<SegmentInfo> {
        let file = self.writer.into_inner().map_err(|e| {
            LsmError::Storage(format!("Failed to flush segment: {}", e))
        })?;
        file.sync_all()?;

        Ok(SegmentInfo {
            path: self.path,
            entry_count: self.entry_count,
            file_size: self.file_size,
        })
    }

    /// Write a full sorted entry set to `path` in one go
    pub fn write<'a, I>(path: &Path, entries: I) -> Result<SegmentInfo>
    where
        I: IntoIterator<Item = (&'a Vec<u8>, &'a MemTableEntry)>,
    {
        let mut builder = Self::new(path)?;
        for (key, entry) in entries {
            builder.add(key, entry)?;
        }
        builder.finish()
    }
}
