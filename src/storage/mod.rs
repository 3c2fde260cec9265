//! Storage Module
//!
//! Persistent layer of immutable, sorted segment files.
//!
//! ## Responsibilities
//! - Persist flushed MemTables as sorted segments
//! - Point lookups guarded by per-segment bloom filters and indexes
//! - Major compaction of all segments into one
//! - Publish every new file atomically (write temp, then rename)

pub mod segment;
mod manager;

pub use segment::SegmentId;
pub use manager::StorageManager;
