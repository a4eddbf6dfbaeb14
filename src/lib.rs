//! # hashkv
//!
//! A log-structured, hash-indexed key-value storage engine with:
//! - Append-only segment files with size-based rotation
//! - An in-memory hash index of key → (segment, offset)
//! - Single-writer/multi-reader concurrency model
//! - Tombstone deletes and index rebuild on startup
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     HashIndex (engine)                       │
//! │            (Single Writer / Multi Reader)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   KeyDir    │          │  Segment    │
//!   │  (RwLock)   │          │  Manager    │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Segments   │
//!                           │ (append-only│
//!                           │   files)    │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use hashkv::{Config, HashIndex};
//!
//! # fn main() -> hashkv::Result<()> {
//! let config = Config::builder()
//!     .directory("./hashkv_data")
//!     .max_segment_size(32 * 1024)
//!     .build();
//! let db = HashIndex::open(config)?;
//!
//! db.put(b"exampleKey", b"exampleValue")?;
//! assert_eq!(db.get(b"exampleKey")?, b"exampleValue".to_vec());
//!
//! db.delete(b"exampleKey")?;
//! db.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod segment;
pub mod index;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HashKvError, RecordField, Result};
pub use config::Config;
pub use engine::HashIndex;
pub use index::{RecordLocation, ReplayStats};
pub use segment::SegmentId;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of hashkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
