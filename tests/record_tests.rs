//! Tests for the record codec
//!
//! These tests verify:
//! - Exact on-disk byte layout (big-endian lengths, no padding)
//! - Tombstone encoding and its distinction from empty values
//! - Header decoding and short-input rejection
//! - Length limits of the header fields

use hashkv::record::{
    decode_header, encode, encode_tombstone, encoded_len, HEADER_SIZE, MAX_KEY_LEN, MAX_VALUE_LEN,
    TOMBSTONE_MARKER,
};
use hashkv::{HashKvError, RecordField};

// =============================================================================
// Encoding Layout Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let bytes = encode(b"ab", b"cd").unwrap();

    assert_eq!(
        &bytes[..],
        &[0, 0, 0, 2, 0, 0, 0, 2, b'a', b'b', b'c', b'd']
    );
}

#[test]
fn test_encode_lengths_are_big_endian() {
    let key = vec![b'k'; 258];
    let value = vec![b'v'; 0x0001_0003];

    let bytes = encode(&key, &value).unwrap();

    assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x01, 0x02]);
    assert_eq!(&bytes[4..8], &[0x00, 0x01, 0x00, 0x03]);
    assert_eq!(bytes.len(), HEADER_SIZE + key.len() + value.len());
}

#[test]
fn test_encode_key_then_value() {
    let bytes = encode(b"key", b"value").unwrap();

    assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 3], b"key");
    assert_eq!(&bytes[HEADER_SIZE + 3..], b"value");
}

#[test]
fn test_encode_empty_key_and_value() {
    let bytes = encode(b"", b"").unwrap();

    assert_eq!(&bytes[..], &[0u8; 8]);
}

#[test]
fn test_encode_tombstone_layout() {
    let bytes = encode_tombstone(b"k").unwrap();

    assert_eq!(&bytes[..], &[0, 0, 0, 1, 0xFF, 0xFF, 0xFF, 0xFF, b'k']);
}

#[test]
fn test_tombstone_differs_from_empty_value() {
    let empty = encode(b"k", b"").unwrap();
    let tombstone = encode_tombstone(b"k").unwrap();

    assert_ne!(empty, tombstone);
    assert!(!decode_header(&empty).unwrap().is_tombstone());
    assert!(decode_header(&tombstone).unwrap().is_tombstone());
}

// =============================================================================
// Header Decoding Tests
// =============================================================================

#[test]
fn test_decode_header_of_encoded_record() {
    let bytes = encode(b"ij", b"0123456789").unwrap();

    let header = decode_header(&bytes).unwrap();

    assert_eq!(header.key_len, 2);
    assert_eq!(header.value_len(), Some(10));
    assert_eq!(header.value_offset(), 10);
    assert_eq!(header.record_len(), 20);
    assert!(!header.is_tombstone());
}

#[test]
fn test_decode_tombstone_header() {
    let bytes = encode_tombstone(b"gone").unwrap();

    let header = decode_header(&bytes).unwrap();

    assert_eq!(header.key_len, 4);
    assert_eq!(header.raw_value_len, TOMBSTONE_MARKER);
    assert_eq!(header.value_len(), None);
    assert_eq!(header.record_len(), (HEADER_SIZE + 4) as u64);
}

#[test]
fn test_decode_header_ignores_trailing_bytes() {
    let mut bytes = encode(b"a", b"b").unwrap().to_vec();
    bytes.extend_from_slice(b"garbage after the record");

    let header = decode_header(&bytes).unwrap();

    assert_eq!(header.key_len, 1);
    assert_eq!(header.value_len(), Some(1));
}

#[test]
fn test_decode_header_too_short() {
    let result = decode_header(&[0, 0, 0, 1, 0, 0, 0]);

    assert!(matches!(result, Err(HashKvError::CorruptHeader { len: 7 })));
}

#[test]
fn test_decode_header_empty_input() {
    let result = decode_header(&[]);

    assert!(matches!(result, Err(HashKvError::CorruptHeader { len: 0 })));
}

// =============================================================================
// Length Limit Tests
// =============================================================================

#[test]
fn test_encoded_len() {
    assert_eq!(encoded_len(2, 2).unwrap(), 12);
    assert_eq!(encoded_len(2, 10).unwrap(), 20);
    assert_eq!(encoded_len(0, 0).unwrap(), HEADER_SIZE);
}

#[test]
fn test_encoded_len_rejects_value_at_sentinel() {
    let result = encoded_len(1, MAX_VALUE_LEN + 1);

    match result {
        Err(HashKvError::Encoding { field, len }) => {
            assert_eq!(field, RecordField::Value);
            assert_eq!(len, TOMBSTONE_MARKER as usize);
        }
        other => panic!("expected encoding error, got {:?}", other),
    }
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_encoded_len_rejects_oversized_key() {
    let result = encoded_len(MAX_KEY_LEN + 1, 0);

    assert!(matches!(
        result,
        Err(HashKvError::Encoding {
            field: RecordField::Key,
            ..
        })
    ));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_encoded_len_accepts_field_maximums() {
    assert_eq!(
        encoded_len(MAX_KEY_LEN, 0).unwrap(),
        HEADER_SIZE + u32::MAX as usize
    );
    assert_eq!(
        encoded_len(0, MAX_VALUE_LEN).unwrap(),
        HEADER_SIZE + (u32::MAX - 1) as usize
    );
}
