//! Bloom Filter
//!
//! Fixed-size probabilistic membership test kept alongside every segment.
//!
//! - If any probed bit is 0 → key is DEFINITELY NOT in the segment
//! - If all probed bits are 1 → key MIGHT be in the segment
//!
//! A false positive only costs one index lookup; the index and the segment
//! data always confirm a hit before a value is returned.
//!
//! ## Position Derivation
//! One 64-bit xxh3 base hash per key. Position `i` mixes the base hash with
//! a per-index odd constant, rotates it, and multiplies by an odd constant
//! before reducing modulo the bit-array size.

use bit_vec::BitVec;
use xxhash_rust::xxh3::xxh3_64;

/// Default bit-array size
pub const DEFAULT_BITS: usize = 1000;

/// Default number of hash positions per key
pub const DEFAULT_HASHES: u32 = 3;

const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX: u64 = 0xFF51_AFD7_ED55_8CCD;

/// Per-segment bloom filter
#[derive(Debug, Clone)]
pub struct BloomFilter {
    bits: BitVec,
    num_hashes: u32,
}

impl BloomFilter {
    /// Create an empty filter with `num_bits` bits and `num_hashes` positions per key
    pub fn new(num_bits: usize, num_hashes: u32) -> Self {
        Self {
            bits: BitVec::from_elem(num_bits, false),
            num_hashes,
        }
    }

    /// Build a filter containing every key from `keys`
    pub fn from_keys<'a, I>(num_bits: usize, num_hashes: u32, keys: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut filter = Self::new(num_bits, num_hashes);
        for key in keys {
            filter.add(key);
        }
        filter
    }

    /// Add a key
    pub fn add(&mut self, key: &[u8]) {
        if self.bits.is_empty() {
            return;
        }
        let base = xxh3_64(key);
        for i in 0..self.num_hashes {
            let pos = self.position(base, i);
            self.bits.set(pos, true);
        }
    }

    /// Check if a key might have been added
    ///
    /// A zero-size filter answers `true` for everything.
    pub fn might_contain(&self, key: &[u8]) -> bool {
        if self.bits.is_empty() {
            return true;
        }
        let base = xxh3_64(key);
        (0..self.num_hashes).all(|i| self.bits.get(self.position(base, i)).unwrap_or(false))
    }

    /// Size of the bit array
    pub fn num_bits(&self) -> usize {
        self.bits.len()
    }

    /// Number of hash positions per key
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Number of set bits (for diagnostics)
    pub fn count_ones(&self) -> usize {
        self.bits.iter().filter(|b| *b).count()
    }

    fn position(&self, base: u64, index: u32) -> usize {
        let seed = GOLDEN.wrapping_mul(u64::from(index) * 2 + 1);
        let mixed = (base ^ seed)
            .rotate_left(index.wrapping_mul(21) % 64)
            .wrapping_mul(MIX);
        (mixed % self.bits.len() as u64) as usize
    }
}

impl Default for BloomFilter {
    fn default() -> Self {
        Self::new(DEFAULT_BITS, DEFAULT_HASHES)
    }
}
