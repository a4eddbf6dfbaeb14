//! Segment file
//!
//! A single append-only byte store with random-access reads.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{HashKvError, Result};

use super::io;
use super::iterator::SegmentIterator;
use super::SegmentId;

/// One append-only segment file
///
/// ## Concurrency:
/// - `append`/`truncate`: single writer only (the engine's log-write lock)
/// - `read_at`/`logical_size`: any number of threads, concurrently with the
///   writer, since reads are positional and bounded by the committed size
pub struct Segment {
    /// Creation-order identifier
    id: SegmentId,
    /// Location on disk
    path: PathBuf,
    /// Open handle, read + write
    file: File,
    /// Bytes committed by successful appends
    size: AtomicU64,
    /// Set when bytes past `size` could not be cut off after a failed append
    needs_trim: AtomicBool,
}

impl Segment {
    /// Create a brand-new, empty segment file
    ///
    /// Fails if a file already exists at `path`.
    pub fn create(path: &Path, id: SegmentId) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            id,
            path: path.to_path_buf(),
            file,
            size: AtomicU64::new(0),
            needs_trim: AtomicBool::new(false),
        })
    }

    /// Open an existing segment file; its whole length counts as committed
    pub fn open(path: &Path, id: SegmentId) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            id,
            path: path.to_path_buf(),
            file,
            size: AtomicU64::new(size),
            needs_trim: AtomicBool::new(false),
        })
    }

    /// Append `bytes` at the logical end and return the offset they start at
    ///
    /// The logical size only moves once the whole buffer is written. A failed
    /// write is rolled back so no partial record stays in the file; if that
    /// cut fails too, the next append retries it before writing anything.
    pub fn append(&self, bytes: &[u8]) -> Result<u64> {
        self.trim_pending()?;
        let offset = self.size.load(Ordering::Acquire);

        if let Err(e) = io::write_all_at(&self.file, bytes, offset) {
            self.rollback(offset);
            return Err(e.into());
        }
        self.size
            .store(offset + bytes.len() as u64, Ordering::Release);
        Ok(offset)
    }

    /// Discard everything from `offset` on, in memory and on disk
    ///
    /// Used to undo an append whose write or flush failed. The file length
    /// must match the logical size, since reopening treats the whole file as
    /// committed records.
    pub fn rollback(&self, offset: u64) {
        if let Err(e) = self.truncate(offset) {
            tracing::error!(
                segment = self.id,
                offset,
                error = %e,
                "Failed to roll back append; retrying on next append"
            );
            self.size.store(offset, Ordering::Release);
            self.needs_trim.store(true, Ordering::Release);
        }
    }

    /// Read exactly `len` bytes starting at `offset`
    pub fn read_at(&self, offset: u64, len: usize) -> Result<Vec<u8>> {
        let size = self.logical_size();
        let end = offset.checked_add(len as u64);
        if end.map_or(true, |end| end > size) {
            return Err(HashKvError::Corruption(format!(
                "read of {} bytes at offset {} runs past end of segment {} (size {})",
                len, offset, self.id, size
            )));
        }

        let mut buf = vec![0u8; len];
        io::read_exact_at(&self.file, &mut buf, offset)?;
        Ok(buf)
    }

    /// Bytes committed so far
    pub fn logical_size(&self) -> u64 {
        self.size.load(Ordering::Acquire)
    }

    /// Force every appended byte to stable storage
    pub fn flush(&self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    /// Scan records from the start of the segment
    pub fn iter(&self) -> SegmentIterator<'_> {
        SegmentIterator::new(self)
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Retry a rollback that failed earlier, if any
    pub(crate) fn trim_pending(&self) -> Result<()> {
        if self.needs_trim.load(Ordering::Acquire) {
            self.truncate(self.logical_size())?;
        }
        Ok(())
    }

    /// Cut the file back to `len` bytes (drops an incomplete trailing record)
    pub(crate) fn truncate(&self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.file.sync_all()?;
        self.size.store(len, Ordering::Release);
        self.needs_trim.store(false, Ordering::Release);
        Ok(())
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("size", &self.logical_size())
            .finish()
    }
}
