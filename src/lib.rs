//! # lsmkv
//!
//! A single-node LSM-tree key-value storage engine with:
//! - Write-Ahead Logging (WAL) with replay on restart
//! - A sorted in-memory MemTable flushed to immutable segments
//! - Per-segment bloom filters and key → offset indexes
//! - Full (major) compaction that reclaims deleted keys
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Engine                             │
//! │              (one lock, strictly sequential)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │     WAL     │          │  MemTable   │
//!   │  (Append)   │          │ (BTreeMap)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │ flush
//!                                   ▼
//!                    ┌──────────────────────────────┐
//!                    │ Storage: segments 0001.seg.. │
//!                    │   + index + bloom per seg    │
//!                    └──────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod bloom;
pub mod wal;
pub mod memtable;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use bloom::BloomFilter;
pub use config::Config;
pub use engine::Engine;
pub use error::{LsmError, Result};
pub use memtable::MemTableEntry;
pub use storage::SegmentId;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of lsmkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
