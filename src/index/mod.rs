//! Index Module
//!
//! In-memory key directory mapping every live key to its newest record.
//!
//! ## Responsibilities
//! - O(1) key → (segment, offset) lookups under a shared lock
//! - Short exclusive sections for publishing and removing entries
//! - Rebuilding the directory from the segments on startup
//!
//! ## Data Structure Choice
//! HashMap wrapped in RwLock:
//! - Point lookups only, no ordering needed
//! - Writers hold the lock for one map operation, never across disk I/O

mod keydir;
mod replay;

pub use keydir::KeyDir;
pub use replay::{replay, ReplayStats};

use crate::segment::SegmentId;

/// Where the newest record of a key starts on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordLocation {
    pub segment_id: SegmentId,
    /// Offset of the record header within its segment
    pub offset: u64,
}
