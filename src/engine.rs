//! Engine Module
//!
//! The hash-indexed storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Encode records and append them to the active segment
//! - Publish durable record locations in the key directory
//! - Resolve reads with one header read and one value read
//! - Rebuild the key directory from the segments on startup

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::config::Config;
use crate::error::{HashKvError, Result};
use crate::index::{self, KeyDir, RecordLocation, ReplayStats};
use crate::record::{self, HEADER_SIZE};
use crate::segment::SegmentManager;

/// The main storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (put/delete): Serialized by `write_lock`
///   - Only ONE write operation at a time, engine-wide
///   - Under write_lock: rotate if needed → append → flush → publish
///   - The key directory's write lock is taken only for the final O(1)
///     insert/remove, after the record is durable
///
/// - **Reads** (get): No write_lock needed
///   - Shared key directory lock for the lookup only
///   - Positional reads on the segment, concurrent with the writer
///
/// Publishing while still holding `write_lock` keeps the key directory in
/// the same order as the log, so an older put can never overwrite a newer
/// put or delete of the same key.
pub struct HashIndex {
    /// Engine configuration
    config: Config,

    /// Owner of every segment file
    segments: SegmentManager,

    /// key → location of newest record (internal RwLock)
    keydir: KeyDir,

    /// Serializes write operations (put/delete/close)
    write_lock: Mutex<()>,

    /// Set once close has begun
    closed: AtomicBool,

    /// What the startup replay found
    replay_stats: ReplayStats,
}

impl HashIndex {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Open the segment directory (lock, discover, create segment 0)
    /// 3. Replay every segment to rebuild the key directory
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let segments = SegmentManager::open(&config.directory, config.max_segment_size)?;
        let (keydir, replay_stats) = index::replay(&segments)?;

        tracing::info!(
            dir = %config.directory.display(),
            segments = replay_stats.segments,
            keys = keydir.len(),
            records = replay_stats.records,
            tombstones = replay_stats.tombstones,
            truncated = replay_stats.bytes_truncated,
            "Engine opened"
        );

        Ok(Self {
            config,
            segments,
            keydir,
            write_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
            replay_stats,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().directory(path).build();
        Self::open(config)
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Encode the record
    /// 2. Acquire write lock
    /// 3. Append to the active segment (rotating if needed) and flush
    /// 4. Publish the new location
    ///
    /// If any step fails the key directory is left untouched.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.ensure_open()?;
        let record = record::encode(key, value)?;

        let writer = self.write_lock.lock();
        self.ensure_open()?;

        let location = self.append_durable(&writer, &record)?;
        self.keydir.insert(key.to_vec(), location);

        tracing::trace!(
            key_len = key.len(),
            value_len = value.len(),
            segment = location.segment_id,
            offset = location.offset,
            "put"
        );
        Ok(())
    }

    /// Get a value by key
    ///
    /// Exactly two positional reads: the 8-byte header at the stored offset,
    /// then the value right after the key.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.ensure_open()?;

        let location = self.keydir.get(key).ok_or(HashKvError::KeyNotFound)?;
        let segment = self.segments.segment_by_id(location.segment_id)?;

        let header_bytes = segment.read_at(location.offset, HEADER_SIZE)?;
        let header = record::decode_header(&header_bytes)?;
        let value_len = header.value_len().ok_or_else(|| {
            HashKvError::Corruption(format!(
                "index points at a tombstone (segment {}, offset {})",
                location.segment_id, location.offset
            ))
        })?;

        segment.read_at(location.offset + header.value_offset(), value_len as usize)
    }

    /// Delete a key
    ///
    /// Steps:
    /// 1. Acquire write lock
    /// 2. Fail with `KeyNotFound` if the key is not live
    /// 3. Append a tombstone and flush
    /// 4. Remove the key from the key directory
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        self.ensure_open()?;

        let writer = self.write_lock.lock();
        self.ensure_open()?;

        if !self.keydir.contains(key) {
            return Err(HashKvError::KeyNotFound);
        }

        let tombstone = record::encode_tombstone(key)?;
        let location = self.append_durable(&writer, &tombstone)?;
        self.keydir.remove(key);

        tracing::trace!(
            key_len = key.len(),
            segment = location.segment_id,
            offset = location.offset,
            "delete"
        );
        Ok(())
    }

    /// Close the engine
    ///
    /// Waits for any in-flight write, then flushes and releases every
    /// segment. Calling it again is a no-op; every other operation fails
    /// with `EngineClosed` afterwards.
    pub fn close(&self) -> Result<()> {
        let _writer = self.write_lock.lock();
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        tracing::debug!(dir = %self.config.directory.display(), "Closing engine");
        self.segments.close()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Check whether a key is live
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.keydir.contains(key)
    }

    /// Where the newest record of `key` lives, if the key is live
    pub fn locate(&self, key: &[u8]) -> Option<RecordLocation> {
        self.keydir.get(key)
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.keydir.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keydir.is_empty()
    }

    /// Number of segment files
    pub fn segment_count(&self) -> usize {
        self.segments.segment_count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Get the segment directory path
    pub fn dir(&self) -> &Path {
        &self.config.directory
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// What the startup replay found
    pub fn replay_stats(&self) -> &ReplayStats {
        &self.replay_stats
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(HashKvError::EngineClosed)
        } else {
            Ok(())
        }
    }

    /// Append an encoded record and make it durable (write lock held)
    ///
    /// On failure the record is cut back off the segment, so neither the
    /// key directory nor a later replay ever sees it.
    fn append_durable(
        &self,
        _writer: &MutexGuard<'_, ()>,
        record: &[u8],
    ) -> Result<RecordLocation> {
        let segment = self.segments.ensure_capacity(record.len() as u64)?;
        let offset = segment.append(record)?;
        if let Err(e) = segment.flush() {
            segment.rollback(offset);
            return Err(e);
        }

        Ok(RecordLocation {
            segment_id: segment.id(),
            offset,
        })
    }
}

impl Drop for HashIndex {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "Failed to close engine on drop");
        }
    }
}

impl std::fmt::Debug for HashIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashIndex")
            .field("config", &self.config)
            .field("segments", &self.segments)
            .field("keys", &self.keydir.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
