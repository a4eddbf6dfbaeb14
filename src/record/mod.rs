//! Record Module
//!
//! Binary encoding of a single key/value pair as it sits in a segment file.
//!
//! ## Record Format
//! ```text
//! ┌──────────────┬────────────────┬───────────┬─────────────┐
//! │ KeyLen (4)   │ ValueLen (4)   │ Key       │ Value       │
//! │ u32, BE      │ u32, BE        │ KeyLen B  │ ValueLen B  │
//! └──────────────┴────────────────┴───────────┴─────────────┘
//! ```
//!
//! - No padding, no checksum, no per-file header.
//! - `ValueLen = 0xFFFF_FFFF` marks a tombstone: the key was deleted and no
//!   value bytes follow. An empty value (`ValueLen = 0`) is a live record.

mod codec;

pub use codec::{decode_header, encode, encode_tombstone, encoded_len, RecordHeader};

/// Fixed header size: KeyLen (4) + ValueLen (4)
pub const HEADER_SIZE: usize = 8;

/// Sentinel in the value length slot marking a tombstone
pub const TOMBSTONE_MARKER: u32 = u32::MAX;

/// Largest key the header can describe
pub const MAX_KEY_LEN: usize = u32::MAX as usize;

/// Largest value the header can describe (the sentinel itself is reserved)
pub const MAX_VALUE_LEN: usize = (TOMBSTONE_MARKER - 1) as usize;
