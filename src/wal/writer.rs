//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;
use tracing::{debug, error};

use crate::error::{LsmError, Result};
use crate::memtable::MemTableEntry;
use crate::record;

/// Writes records to the WAL file
///
/// Every `append` is synced before it returns; nothing is ever buffered
/// across calls. A failed append is cut back off the file, so the log is
/// always a sequence of whole records.
pub struct WalWriter {
    path: PathBuf,
    file: File,
    /// Reused encode buffer
    buf: BytesMut,
    /// Records appended since open or the last clear
    appended: u64,
    /// File length up to the end of the last complete record
    committed: u64,
    /// Set when a failed append could not be rolled back
    poisoned: bool,
}

impl WalWriter {
    /// Open or create a WAL file, positioned for appending
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let committed = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            buf: BytesMut::new(),
            appended: 0,
            committed,
            poisoned: false,
        })
    }

    /// Append one record and make it durable
    ///
    /// This is the WAL's only durability point; callers need not `sync`.
    /// On failure nothing of the record is left in the log.
    pub fn append(&mut self, key: &[u8], entry: &MemTableEntry) -> Result<()> {
        if self.poisoned {
            return Err(LsmError::Storage(format!(
                "WAL {} holds a partial record that could not be removed",
                self.path.display()
            )));
        }

        self.buf.clear();
        record::encode_into(&mut self.buf, key, entry);

        if let Err(e) = self.write_synced() {
            self.rollback();
            return Err(e.into());
        }
        self.committed += self.buf.len() as u64;
        self.appended += 1;

        Ok(())
    }

    /// Force any written bytes to stable storage
    ///
    /// A no-op in practice since `append` already syncs.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Truncate the log to empty
    ///
    /// Only call once every appended record is durable elsewhere.
    pub fn clear(&mut self) -> Result<()> {
        self.file.set_len(0)?;
        self.file.sync_all()?;
        debug!(path = %self.path.display(), records = self.appended, "WAL cleared");
        self.appended = 0;
        self.committed = 0;
        self.poisoned = false;
        Ok(())
    }

    /// Records appended since open or the last clear
    pub fn appended(&self) -> u64 {
        self.appended
    }

    /// Current length of the log file in bytes
    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_synced(&mut self) -> io::Result<()> {
        self.file.write_all(&self.buf)?;
        self.file.sync_data()
    }

    /// Cut the file back to the last complete record
    fn rollback(&mut self) {
        let result = self
            .file
            .set_len(self.committed)
            .and_then(|_| self.file.sync_data());
        if let Err(e) = result {
            error!(path = %self.path.display(), error = %e, "WAL rollback failed");
            self.poisoned = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::WalRecovery;
    use tempfile::TempDir;

    fn value(v: &[u8]) -> MemTableEntry {
        MemTableEntry::Value(v.to_vec())
    }

    #[test]
    fn test_rollback_removes_partial_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wal.log");
        let mut writer = WalWriter::open(&path).unwrap();
        writer.append(b"a", &value(b"1")).unwrap();
        let good_len = writer.len().unwrap();

        // What a write cut short by ENOSPC leaves behind
        writer.file.write_all(&[3, 0, 0]).unwrap();
        writer.rollback();

        assert_eq!(writer.len().unwrap(), good_len);

        writer.append(b"b", &value(b"2")).unwrap();

        let mut entries = Vec::new();
        let result = WalRecovery::recover(&path, |k, e| entries.push((k, e))).unwrap();
        assert!(!result.was_truncated);
        assert_eq!(
            entries,
            vec![(b"a".to_vec(), value(b"1")), (b"b".to_vec(), value(b"2"))]
        );
    }

    #[test]
    fn test_poisoned_writer_refuses_appends_until_cleared() {
        let dir = TempDir::new().unwrap();
        let mut writer = WalWriter::open(&dir.path().join("wal.log")).unwrap();
        writer.poisoned = true;

        let result = writer.append(b"a", &value(b"1"));
        assert!(matches!(result, Err(LsmError::Storage(_))));

        writer.clear().unwrap();
        writer.append(b"a", &value(b"1")).unwrap();
        assert_eq!(writer.appended(), 1);
    }
}
