//! Segment Manager
//!
//! Owns the ordered sequence of segments and decides when to roll over.
//!
//! ## Responsibilities
//! - Discover existing segment files on startup
//! - Hand out the active segment to the single writer
//! - Create the next segment when the active one would overflow
//! - Resolve segment ids for readers
//! - Flush and release every file handle on close

use std::fs::{self, File, OpenOptions};
use std::mem;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::RwLock;

use crate::error::{HashKvError, Result};

use super::io::sync_dir;
use super::{Segment, SegmentId};

/// Mutable part of the manager, guarded by one RwLock
struct SegmentSet {
    /// Every segment ever created, indexed by id (append-only)
    segments: Vec<Arc<Segment>>,
    /// Index of the segment receiving appends
    active: usize,
    /// Holds the advisory directory lock while open
    lock_file: Option<File>,
    closed: bool,
}

impl SegmentSet {
    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(HashKvError::EngineClosed)
        } else {
            Ok(())
        }
    }
}

/// Manages the segment files of one directory
///
/// ## Concurrency:
/// - `segments`: RwLock, readers resolve ids while the writer rotates
/// - `ensure_capacity` must be called by one thread at a time (the engine's
///   log-write lock); the size check and the rotation it triggers both
///   happen under that lock
/// - Segments are shared as `Arc`, so a reader keeps its handle alive even
///   if the manager is closed underneath it
pub struct SegmentManager {
    /// Directory where segments live
    dir: PathBuf,

    /// Rotation threshold in bytes
    max_segment_size: u64,

    state: RwLock<SegmentSet>,
}

impl SegmentManager {
    const LOCK_FILENAME: &'static str = "LOCK";
    const SEGMENT_PREFIX: &'static str = "segment-";
    const SEGMENT_SUFFIX: &'static str = ".log";

    /// Open or create the segment directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Take the exclusive directory lock
    /// 3. Discover segment files (ids must run 0..n without gaps)
    /// 4. Open them in creation order; the newest becomes active
    /// 5. Create segment 0 if the directory held none
    pub fn open(dir: &Path, max_segment_size: u64) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let lock_file = Self::lock_directory(dir)?;

        let mut ids: Vec<SegmentId> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.is_file() {
                if let Some(id) = Self::parse_segment_id(&file_path) {
                    ids.push(id);
                }
            }
        }
        ids.sort_unstable();

        for (expected, id) in ids.iter().enumerate() {
            if *id as usize != expected {
                return Err(HashKvError::Corruption(format!(
                    "segment ids are not contiguous: expected {}, found {}",
                    expected, id
                )));
            }
        }

        let mut segments = Vec::with_capacity(ids.len().max(1));
        for id in ids {
            let segment = Segment::open(&Self::segment_path(dir, id), id)?;
            segments.push(Arc::new(segment));
        }

        if segments.is_empty() {
            let segment = Segment::create(&Self::segment_path(dir, 0), 0)?;
            sync_dir(dir)?;
            segments.push(Arc::new(segment));
        }

        let active = segments.len() - 1;
        tracing::debug!(
            dir = %dir.display(),
            segments = segments.len(),
            active,
            "Segment manager opened"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            max_segment_size,
            state: RwLock::new(SegmentSet {
                segments,
                active,
                lock_file: Some(lock_file),
                closed: false,
            }),
        })
    }

    /// The segment currently receiving appends
    pub fn active_segment(&self) -> Result<Arc<Segment>> {
        let state = self.state.read();
        state.check_open()?;
        Ok(Arc::clone(&state.segments[state.active]))
    }

    /// Return a segment with room for `entry_size` more bytes
    ///
    /// Rolls over to a new segment when the active one is non-empty and the
    /// entry would push it past `max_segment_size`. An entry larger than the
    /// maximum therefore always lands alone in a segment of its own.
    ///
    /// Must only be called while holding the engine's log-write lock.
    pub fn ensure_capacity(&self, entry_size: u64) -> Result<Arc<Segment>> {
        let next_id = {
            let state = self.state.read();
            state.check_open()?;

            let active = &state.segments[state.active];
            let size = active.logical_size();
            if size == 0 || size.saturating_add(entry_size) <= self.max_segment_size {
                return Ok(Arc::clone(active));
            }
            // A sealed segment must not keep bytes past its logical end
            active.trim_pending()?;
            state.segments.len() as SegmentId
        };

        self.rotate(next_id)
    }

    /// Resolve a segment id for reading
    pub fn segment_by_id(&self, id: SegmentId) -> Result<Arc<Segment>> {
        let state = self.state.read();
        state.check_open()?;
        state
            .segments
            .get(id as usize)
            .cloned()
            .ok_or(HashKvError::UnknownSegment(id))
    }

    /// All segments in creation order
    pub fn segments(&self) -> Result<Vec<Arc<Segment>>> {
        let state = self.state.read();
        state.check_open()?;
        Ok(state.segments.clone())
    }

    /// Number of segments created so far (0 once closed)
    pub fn segment_count(&self) -> usize {
        self.state.read().segments.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_segment_size(&self) -> u64 {
        self.max_segment_size
    }

    /// Flush every segment and release all file handles
    ///
    /// Idempotent. Every segment is flushed even if an earlier one fails;
    /// the first failure is returned.
    pub fn close(&self) -> Result<()> {
        let (segments, lock_file) = {
            let mut state = self.state.write();
            if state.closed {
                return Ok(());
            }
            state.closed = true;
            (mem::take(&mut state.segments), state.lock_file.take())
        };

        let mut first_err = None;
        for segment in &segments {
            if let Err(e) = segment.trim_pending().and_then(|()| segment.flush()) {
                tracing::warn!(segment = segment.id(), error = %e, "Failed to flush segment on close");
                first_err.get_or_insert(e);
            }
        }
        drop(segments);

        if let Some(lock_file) = lock_file {
            if let Err(e) = lock_file.unlock() {
                first_err.get_or_insert(HashKvError::Io(e));
            }
        }

        tracing::debug!(dir = %self.dir.display(), "Segment manager closed");

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Generate segment path given a directory and ID
    /// (dir, 42) → "{dir}/segment-000042.log"
    pub fn segment_path(dir: &Path, id: SegmentId) -> PathBuf {
        dir.join(format!(
            "{}{:06}{}",
            Self::SEGMENT_PREFIX,
            id,
            Self::SEGMENT_SUFFIX
        ))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Create segment `id`, then publish it as the active segment
    ///
    /// The file is created before the state lock is taken so readers are
    /// never blocked on file creation.
    fn rotate(&self, id: SegmentId) -> Result<Arc<Segment>> {
        let segment = Arc::new(Segment::create(&Self::segment_path(&self.dir, id), id)?);
        sync_dir(&self.dir)?;

        let mut state = self.state.write();
        state.check_open()?;
        state.segments.push(Arc::clone(&segment));
        state.active = state.segments.len() - 1;

        tracing::debug!(segment = id, "Rotated to new active segment");
        Ok(segment)
    }

    /// "segment-000042.log" → Some(42)
    fn parse_segment_id(path: &Path) -> Option<SegmentId> {
        let name = path.file_name()?.to_str()?;
        name.strip_prefix(Self::SEGMENT_PREFIX)?
            .strip_suffix(Self::SEGMENT_SUFFIX)?
            .parse()
            .ok()
    }

    fn lock_directory(dir: &Path) -> Result<File> {
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(dir.join(Self::LOCK_FILENAME))?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(lock_file),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => {
                Err(HashKvError::DirectoryLocked(dir.to_path_buf()))
            }
            Err(e) => Err(HashKvError::Io(e)),
        }
    }
}

impl std::fmt::Debug for SegmentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SegmentManager")
            .field("dir", &self.dir)
            .field("max_segment_size", &self.max_segment_size)
            .field("segments", &state.segments.len())
            .field("active", &state.active)
            .field("closed", &state.closed)
            .finish()
    }
}
