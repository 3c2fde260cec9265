//! Record codec
//!
//! The single binary record layout shared by the WAL and segment files.
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬──────────┬────────────────┬────────────┐
//! │ KeyLen (4)   │   Key    │  ValueLen (4)  │   Value    │
//! └──────────────┴──────────┴────────────────┴────────────┘
//! ```
//!
//! - Lengths are `u32` in native byte order
//! - No separators, no checksum, no version tag
//! - `ValueLen == u32::MAX` marks a tombstone and carries no value bytes
//!
//! Decoding distinguishes a clean end of stream from a torn record. Callers
//! decide what a torn record means; both the WAL and segment scans treat it as
//! the end of recoverable data.

use std::io::{self, ErrorKind, Read};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{LsmError, Result};
use crate::memtable::MemTableEntry;

/// Size of each length prefix
pub const LEN_PREFIX_SIZE: usize = 4;

/// Length prefix value reserved for tombstones
pub const TOMBSTONE_LEN: u32 = u32::MAX;

/// Largest key or value length that can be encoded
pub const MAX_FIELD_LEN: usize = (u32::MAX - 1) as usize;

/// A decoded record and the byte offset its key-length prefix starts at
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub offset: u64,
    pub key: Vec<u8>,
    pub entry: MemTableEntry,
}

/// Outcome of decoding one record from a stream
#[derive(Debug, PartialEq)]
pub enum Decoded {
    /// A complete record
    Record(Record),
    /// The stream ended exactly on a record boundary
    Eof,
    /// The stream ended partway through a record
    Truncated,
}

// =============================================================================
// Encoding
// =============================================================================

/// Number of bytes `encode_into` appends for this record
pub fn encoded_len(key: &[u8], entry: &MemTableEntry) -> usize {
    let value_len = match entry {
        MemTableEntry::Value(v) => v.len(),
        MemTableEntry::Tombstone => 0,
    };
    LEN_PREFIX_SIZE * 2 + key.len() + value_len
}

/// Reject keys and values the format cannot represent
pub fn check_lengths(key: &[u8], entry: &MemTableEntry) -> Result<()> {
    if key.is_empty() {
        return Err(LsmError::InvalidKey("key must not be empty".to_string()));
    }
    if key.len() > MAX_FIELD_LEN {
        return Err(LsmError::InvalidKey(format!(
            "key too large: {} bytes (max {})",
            key.len(),
            MAX_FIELD_LEN
        )));
    }
    if let MemTableEntry::Value(v) = entry {
        if v.len() > MAX_FIELD_LEN {
            return Err(LsmError::InvalidValue(format!(
                "value too large: {} bytes (max {})",
                v.len(),
                MAX_FIELD_LEN
            )));
        }
    }
    Ok(())
}

/// Append one encoded record to `buf`
///
/// Lengths must already have been checked with `check_lengths`.
pub fn encode_into(buf: &mut BytesMut, key: &[u8], entry: &MemTableEntry) {
    buf.reserve(encoded_len(key, entry));
    buf.put_u32_ne(key.len() as u32);
    buf.put_slice(key);
    match entry {
        MemTableEntry::Value(v) => {
            buf.put_u32_ne(v.len() as u32);
            buf.put_slice(v);
        }
        MemTableEntry::Tombstone => buf.put_u32_ne(TOMBSTONE_LEN),
    }
}

/// Encode a single record into a fresh buffer
pub fn encode(key: &[u8], entry: &MemTableEntry) -> BytesMut {
    let mut buf = BytesMut::with_capacity(encoded_len(key, entry));
    encode_into(&mut buf, key, entry);
    buf
}

// =============================================================================
// Decoding
// =============================================================================

/// Read until `buf` is full or the stream ends; returns bytes read
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read exactly `len` bytes, or `None` if the stream ends first
///
/// Grows the buffer as bytes arrive so a corrupt length prefix cannot force
/// a huge up-front allocation.
fn read_field<R: Read>(reader: &mut R, len: usize) -> io::Result<Option<Vec<u8>>> {
    let mut field = Vec::new();
    reader.take(len as u64).read_to_end(&mut field)?;
    if field.len() == len {
        Ok(Some(field))
    } else {
        Ok(None)
    }
}

/// A length prefix, or how many prefix bytes existed before EOF
enum LenPrefix {
    Len(u32),
    Short(usize),
}

fn read_len<R: Read>(reader: &mut R) -> io::Result<LenPrefix> {
    let mut prefix = [0u8; LEN_PREFIX_SIZE];
    let n = fill(reader, &mut prefix)?;
    if n == LEN_PREFIX_SIZE {
        Ok(LenPrefix::Len((&prefix[..]).get_u32_ne()))
    } else {
        Ok(LenPrefix::Short(n))
    }
}

/// Decode the record starting at `offset`
///
/// I/O failures other than a short read are returned as errors.
pub fn decode<R: Read>(reader: &mut R, offset: u64) -> io::Result<Decoded> {
    let key_len = match read_len(reader)? {
        LenPrefix::Len(len) => len as usize,
        LenPrefix::Short(0) => return Ok(Decoded::Eof),
        LenPrefix::Short(_) => return Ok(Decoded::Truncated),
    };

    let key = match read_field(reader, key_len)? {
        Some(key) => key,
        None => return Ok(Decoded::Truncated),
    };

    let value_len = match read_len(reader)? {
        LenPrefix::Len(len) => len,
        LenPrefix::Short(_) => return Ok(Decoded::Truncated),
    };

    let entry = if value_len == TOMBSTONE_LEN {
        MemTableEntry::Tombstone
    } else {
        match read_field(reader, value_len as usize)? {
            Some(value) => MemTableEntry::Value(value),
            None => return Ok(Decoded::Truncated),
        }
    };

    Ok(Decoded::Record(Record { offset, key, entry }))
}

// =============================================================================
// Sequential Reader
// =============================================================================

/// Lazy, forward-only sequence of records
///
/// Yields records in stream order and stops for good at the first clean EOF,
/// torn record, or I/O error.
pub struct RecordReader<R> {
    reader: R,
    /// Offset of the next record to decode
    position: u64,
    truncated: bool,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    /// Start reading at `position` (the reader must already be positioned there)
    pub fn new(reader: R, position: u64) -> Self {
        Self {
            reader,
            position,
            truncated: false,
            done: false,
        }
    }

    /// Offset just past the last complete record yielded
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Whether iteration stopped on a torn record
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match decode(&mut self.reader, self.position) {
            Ok(Decoded::Record(record)) => {
                self.position += encoded_len(&record.key, &record.entry) as u64;
                Some(Ok(record))
            }
            Ok(Decoded::Eof) => {
                self.done = true;
                None
            }
            Ok(Decoded::Truncated) => {
                self.done = true;
                self.truncated = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(LsmError::Io(e)))
            }
        }
    }
}
