//! Segment Module
//!
//! Immutable, sorted, on-disk runs of records (SSTables).
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Data (variable, no header, no footer)                   │
//! │   [KeyLen: u32][Key][ValueLen: u32][Value]              │
//! │   ... repeated for each entry, keys ascending ...       │
//! │   (ValueLen = u32::MAX means tombstone, no value bytes) │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The sparse index (key → record offset) and the bloom filter are not
//! stored in the file; they are derived by scanning it.
//!
//! ## Naming
//! `{generation:04}.seg`, e.g. `0007.seg`. Generations above 9999 simply
//! print wider. Any other name in the data directory is ignored, including
//! numeric names that are not in that exact form (`7.seg`, `00007.seg`).

mod builder;
mod iterator;
mod reader;

use std::fmt;
use std::path::{Path, PathBuf};

pub use builder::{SegmentBuilder, SegmentInfo};
pub use iterator::SegmentIterator;
pub use reader::{build_index, point_lookup, read_all, SegmentIndex};

/// File extension of published segments
pub const SEGMENT_EXTENSION: &str = "seg";

/// Temporary file a flush writes before renaming into place
pub const FLUSH_TEMP_FILE: &str = "flush.tmp";

/// Temporary file a compaction writes before renaming into place
pub const COMPACT_TEMP_FILE: &str = "compact.tmp";

/// Segment generation number; higher is more recent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub u64);

impl SegmentId {
    /// The following generation
    pub fn next(self) -> Self {
        SegmentId(self.0 + 1)
    }

    /// "0007.seg"
    pub fn file_name(self) -> String {
        format!("{:04}.{}", self.0, SEGMENT_EXTENSION)
    }

    /// Full path of this segment inside `dir`
    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }

    /// Parse a generation from a segment filename
    /// "0042.seg" → Some(42), "notes.seg" / "0042.tmp" → None
    ///
    /// Only the canonical spelling is accepted: "42.seg" and "00042.seg" are
    /// not segments, so every generation maps to exactly one path.
    pub fn from_path(path: &Path) -> Option<Self> {
        if path.extension()? != SEGMENT_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let id = SegmentId(stem.parse().ok()?);
        if path.file_name()? != id.file_name().as_str() {
            return None;
        }
        Some(id)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}
