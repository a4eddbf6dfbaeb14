//! Segment Iterator
//!
//! Sequential scan over every record in a segment, used to rebuild the index.

use crate::error::Result;
use crate::record::{self, RecordHeader, HEADER_SIZE};

use super::Segment;

/// A record found by a sequential scan (value bytes are not loaded)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedRecord {
    /// Offset of the record header within the segment
    pub offset: u64,
    pub header: RecordHeader,
    pub key: Vec<u8>,
}

impl ScannedRecord {
    pub fn is_tombstone(&self) -> bool {
        self.header.is_tombstone()
    }
}

/// Iterator over the records of one segment in append order
///
/// Stops early at an incomplete trailing record; `torn_tail()` then reports
/// where it starts.
pub struct SegmentIterator<'a> {
    segment: &'a Segment,
    /// Next record starts here
    offset: u64,
    /// Logical size captured when the scan started
    end: u64,
    torn_at: Option<u64>,
    failed: bool,
}

impl<'a> SegmentIterator<'a> {
    pub(super) fn new(segment: &'a Segment) -> Self {
        Self {
            segment,
            offset: 0,
            end: segment.logical_size(),
            torn_at: None,
            failed: false,
        }
    }

    /// Offset of an incomplete trailing record, if the scan hit one
    pub fn torn_tail(&self) -> Option<u64> {
        self.torn_at
    }

    /// Length of the prefix made of complete records seen so far
    pub fn valid_len(&self) -> u64 {
        self.torn_at.unwrap_or(self.offset)
    }

    fn read_record(&mut self) -> Result<Option<ScannedRecord>> {
        let remaining = self.end - self.offset;
        if remaining < HEADER_SIZE as u64 {
            self.torn_at = Some(self.offset);
            return Ok(None);
        }

        let header_bytes = self.segment.read_at(self.offset, HEADER_SIZE)?;
        let header = record::decode_header(&header_bytes)?;

        if header.record_len() > remaining {
            self.torn_at = Some(self.offset);
            return Ok(None);
        }

        let key = self
            .segment
            .read_at(self.offset + HEADER_SIZE as u64, header.key_len as usize)?;

        let scanned = ScannedRecord {
            offset: self.offset,
            header,
            key,
        };
        self.offset += header.record_len();

        Ok(Some(scanned))
    }
}

impl<'a> Iterator for SegmentIterator<'a> {
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.torn_at.is_some() || self.offset >= self.end {
            return None;
        }

        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
