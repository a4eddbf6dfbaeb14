//! Error types for hashkv
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::segment::SegmentId;

/// Result type alias using HashKvError
pub type Result<T> = std::result::Result<T, HashKvError>;

/// Which length field of a record overflowed its header slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Key,
    Value,
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordField::Key => f.write_str("key"),
            RecordField::Value => f.write_str("value"),
        }
    }
}

/// Unified error type for hashkv operations
#[derive(Debug, Error)]
pub enum HashKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {field} of {len} bytes does not fit the record header")]
    Encoding { field: RecordField, len: usize },

    #[error("Corrupt record header: expected 8 bytes, got {len}")]
    CorruptHeader { len: usize },

    // -------------------------------------------------------------------------
    // Index Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error("Unknown segment: {0}")]
    UnknownSegment(SegmentId),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Data directory is locked by another engine: {}", .0.display())]
    DirectoryLocked(PathBuf),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Engine is closed")]
    EngineClosed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
