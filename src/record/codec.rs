//! Record codec
//!
//! Encoding and decoding functions for on-disk records.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{HashKvError, RecordField, Result};

use super::{HEADER_SIZE, MAX_KEY_LEN, MAX_VALUE_LEN, TOMBSTONE_MARKER};

/// Decoded fixed-size record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Exact byte count of the key region
    pub key_len: u32,
    /// Exact byte count of the value region, or `TOMBSTONE_MARKER`
    pub raw_value_len: u32,
}

impl RecordHeader {
    /// True if this header marks a deleted key
    pub fn is_tombstone(&self) -> bool {
        self.raw_value_len == TOMBSTONE_MARKER
    }

    /// Length of the value region, `None` for tombstones
    pub fn value_len(&self) -> Option<u32> {
        if self.is_tombstone() {
            None
        } else {
            Some(self.raw_value_len)
        }
    }

    /// Offset of the value bytes relative to the start of the record
    pub fn value_offset(&self) -> u64 {
        HEADER_SIZE as u64 + self.key_len as u64
    }

    /// Total bytes the record occupies on disk, header included
    pub fn record_len(&self) -> u64 {
        self.value_offset() + self.value_len().unwrap_or(0) as u64
    }
}

/// Validate field lengths and return the encoded size of a live record
///
/// Fails with `Encoding` if either length does not fit its header slot.
pub fn encoded_len(key_len: usize, value_len: usize) -> Result<usize> {
    if key_len > MAX_KEY_LEN {
        return Err(HashKvError::Encoding {
            field: RecordField::Key,
            len: key_len,
        });
    }
    if value_len > MAX_VALUE_LEN {
        return Err(HashKvError::Encoding {
            field: RecordField::Value,
            len: value_len,
        });
    }
    HEADER_SIZE
        .checked_add(key_len)
        .and_then(|len| len.checked_add(value_len))
        .ok_or(HashKvError::Encoding {
            field: RecordField::Value,
            len: value_len,
        })
}

/// Encode a live record
///
/// Format: key_len (4) + value_len (4) + key + value
pub fn encode(key: &[u8], value: &[u8]) -> Result<Bytes> {
    let total = encoded_len(key.len(), value.len())?;

    let mut buf = BytesMut::with_capacity(total);
    buf.put_u32(key.len() as u32);
    buf.put_u32(value.len() as u32);
    buf.put_slice(key);
    buf.put_slice(value);

    Ok(buf.freeze())
}

/// Encode a tombstone for `key`
///
/// Format: key_len (4) + TOMBSTONE_MARKER (4) + key
pub fn encode_tombstone(key: &[u8]) -> Result<Bytes> {
    let total = encoded_len(key.len(), 0)?;

    let mut buf = BytesMut::with_capacity(total);
    buf.put_u32(key.len() as u32);
    buf.put_u32(TOMBSTONE_MARKER);
    buf.put_slice(key);

    Ok(buf.freeze())
}

/// Decode the fixed header from the first 8 bytes of `bytes`
///
/// Trailing bytes are ignored.
pub fn decode_header(mut bytes: &[u8]) -> Result<RecordHeader> {
    if bytes.len() < HEADER_SIZE {
        return Err(HashKvError::CorruptHeader { len: bytes.len() });
    }

    let key_len = bytes.get_u32();
    let raw_value_len = bytes.get_u32();

    Ok(RecordHeader {
        key_len,
        raw_value_len,
    })
}
