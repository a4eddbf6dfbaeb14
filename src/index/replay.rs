//! Index replay
//!
//! Rebuilds the key directory by scanning every segment in creation order.

use std::collections::HashMap;

use crate::error::{HashKvError, Result};
use crate::segment::SegmentManager;

use super::{KeyDir, RecordLocation};

/// Outcome of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of segments scanned
    pub segments: usize,

    /// Live records applied (including ones later shadowed)
    pub records: u64,

    /// Tombstones applied
    pub tombstones: u64,

    /// Bytes dropped from incomplete trailing records
    pub bytes_truncated: u64,
}

/// Scan all segments and return the resulting key directory
///
/// This will:
/// 1. Walk segments oldest → newest, records in append order
/// 2. Insert live records, remove keys on tombstones
/// 3. Truncate an incomplete record left at the end of the newest segment
///
/// Only the newest segment can have been cut short by a crash; sealed
/// segments were complete when the writer moved on. An incomplete record in
/// a sealed segment fails with `Corruption` and nothing is truncated.
pub fn replay(manager: &SegmentManager) -> Result<(KeyDir, ReplayStats)> {
    let mut entries: HashMap<Vec<u8>, RecordLocation> = HashMap::new();
    let mut stats = ReplayStats::default();

    let segments = manager.segments()?;
    let newest = segments.len().saturating_sub(1);

    for (position, segment) in segments.iter().enumerate() {
        let mut records = segment.iter();

        for record in records.by_ref() {
            let record = record?;
            if record.is_tombstone() {
                entries.remove(&record.key);
                stats.tombstones += 1;
            } else {
                let location = RecordLocation {
                    segment_id: segment.id(),
                    offset: record.offset,
                };
                entries.insert(record.key, location);
                stats.records += 1;
            }
        }

        if let Some(torn_at) = records.torn_tail() {
            if position != newest {
                return Err(HashKvError::Corruption(format!(
                    "incomplete record at offset {} of sealed segment {}",
                    torn_at,
                    segment.id()
                )));
            }

            let dropped = segment.logical_size() - torn_at;
            tracing::warn!(
                segment = segment.id(),
                offset = torn_at,
                bytes = dropped,
                "Truncating incomplete record at end of segment"
            );
            segment.truncate(torn_at)?;
            stats.bytes_truncated += dropped;
        }

        stats.segments += 1;
    }

    Ok((KeyDir::from_map(entries), stats))
}
