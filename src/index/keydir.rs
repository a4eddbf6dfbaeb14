//! Key directory implementation
//!
//! HashMap-based key directory with RwLock for concurrency.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::RecordLocation;

/// Maps each live key to the location of its newest record
#[derive(Debug, Default)]
pub struct KeyDir {
    entries: RwLock<HashMap<Vec<u8>, RecordLocation>>,
}

impl KeyDir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from an already-populated map (replay)
    pub fn from_map(entries: HashMap<Vec<u8>, RecordLocation>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Look up a key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<RecordLocation> {
        self.entries.read().get(key).copied()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Point `key` at `location`, replacing any previous mapping (write lock)
    pub fn insert(&self, key: Vec<u8>, location: RecordLocation) -> Option<RecordLocation> {
        self.entries.write().insert(key, location)
    }

    /// Drop `key` from the directory (write lock)
    pub fn remove(&self, key: &[u8]) -> Option<RecordLocation> {
        self.entries.write().remove(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
