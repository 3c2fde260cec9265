//! Write-Ahead Log (WAL) Module
//!
//! Provides durability for every mutation applied to the active MemTable.
//!
//! ## Responsibilities
//! - Append one record per mutation and make it durable before returning
//! - Replay records in file order after a restart
//! - Stop replay quietly at a torn trailing record (crash mid-append)
//! - Truncate to empty once the MemTable has been flushed to a segment
//!
//! ## File Format
//! A flat sequence of records in the shared layout (see `crate::record`):
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ Record 1                                        │
//! │ ┌─────────┬───────┬───────────┬───────────────┐ │
//! │ │KeyLen(4)│  Key  │ValueLen(4)│ Value         │ │
//! │ └─────────┴───────┴───────────┴───────────────┘ │
//! ├─────────────────────────────────────────────────┤
//! │ Record 2 ...                                    │
//! └─────────────────────────────────────────────────┘
//! ```

mod reader;
mod recovery;
mod writer;

pub use reader::WalReader;
pub use recovery::{RecoveryResult, WalRecovery};
pub use writer::WalWriter;
