//! Segment Module
//!
//! Append-only segment files and the manager that rotates between them.
//!
//! ## Responsibilities
//! - Append encoded records at the logical end of the active segment
//! - Positional reads that never touch a shared file cursor
//! - Roll over to a fresh segment once the active one would overflow
//! - Own every file handle; nothing else in the crate touches segment files
//!
//! ## Directory Layout
//! ```text
//! {directory}/
//!   ├── LOCK                 (advisory exclusive lock)
//!   ├── segment-000000.log   (sealed)
//!   ├── segment-000001.log   (sealed)
//!   └── segment-000002.log   (active)
//! ```
//!
//! Offsets are relative to the start of their own segment file.

mod file;
mod io;
mod iterator;
mod manager;

pub use file::Segment;
pub use iterator::{ScannedRecord, SegmentIterator};
pub use manager::SegmentManager;

/// Zero-based creation-order identifier of a segment
pub type SegmentId = u32;
