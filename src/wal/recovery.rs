//! WAL Recovery
//!
//! Replays the WAL after a restart.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;
use crate::memtable::MemTableEntry;

use super::WalReader;

/// Handles WAL replay after a restart or crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of records handed to the visitor
    pub records_recovered: u64,

    /// Length of the well-formed prefix of the log
    pub valid_bytes: u64,

    /// Whether a torn trailing record was found (and cut off, for `recover`)
    pub was_truncated: bool,
}

impl WalRecovery {
    /// Replay every well-formed record into `visit`, in file order
    ///
    /// A missing file replays nothing. A torn trailing record ends replay
    /// without error and is cut from the file so later appends stay readable.
    pub fn recover<F>(path: &Path, visit: F) -> Result<RecoveryResult>
    where
        F: FnMut(Vec<u8>, MemTableEntry),
    {
        let result = Self::scan(path, visit)?;

        if result.was_truncated {
            warn!(
                path = %path.display(),
                valid_bytes = result.valid_bytes,
                "WAL ends in a torn record, truncating"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_bytes)?;
            file.sync_all()?;
        }

        if result.records_recovered > 0 {
            info!(
                records = result.records_recovered,
                truncated = result.was_truncated,
                "WAL replay complete"
            );
        }

        Ok(result)
    }

    /// Inspect a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path, |_, _| {})
    }

    fn scan<F>(path: &Path, mut visit: F) -> Result<RecoveryResult>
    where
        F: FnMut(Vec<u8>, MemTableEntry),
    {
        if !path.exists() {
            return Ok(RecoveryResult::default());
        }

        let mut reader = WalReader::open(path)?;
        let mut records_recovered = 0;

        for record in reader.by_ref() {
            let (key, entry) = record?;
            visit(key, entry);
            records_recovered += 1;
        }

        Ok(RecoveryResult {
            records_recovered,
            valid_bytes: reader.valid_bytes(),
            was_truncated: reader.was_truncated(),
        })
    }
}
