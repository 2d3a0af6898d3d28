use parking_lot::Mutex;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use super::{BinaryReader, ReadSeek};
use crate::error::{Error, Result};

/// Reader type shared by all archive parsers
pub type ArchiveReader = BinaryReader<Box<dyn ReadSeek>>;

/// Shared, closable handle to one mounted archive.
///
/// Clones refer to the same underlying source. Seek + read is not atomic, so
/// every access goes through a per-handle lock. After [`close`](Self::close)
/// the source is dropped and any further read fails with an I/O error.
#[derive(Clone)]
pub struct ArchiveHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    name: String,
    reader: Mutex<Option<ArchiveReader>>,
}

impl ArchiveHandle {
    /// Open an archive file from disk
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        Self::from_reader(path.display().to_string(), BufReader::new(file))
    }

    /// Wrap any seekable source, e.g. an in-memory archive
    pub fn from_reader<R: ReadSeek + 'static>(name: impl Into<String>, reader: R) -> Result<Self> {
        let reader = BinaryReader::new(Box::new(reader) as Box<dyn ReadSeek>)?;
        Ok(Self {
            inner: Arc::new(HandleInner {
                name: name.into(),
                reader: Mutex::new(Some(reader)),
            }),
        })
    }

    /// Name the archive was opened under (its path for files on disk)
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Size of the archive in bytes, or `None` once closed
    pub fn size(&self) -> Option<u64> {
        self.inner.reader.lock().as_ref().map(BinaryReader::len)
    }

    /// Run `op` with exclusive access to the archive's reader
    pub fn with_reader<T>(&self, op: impl FnOnce(&mut ArchiveReader) -> Result<T>) -> Result<T> {
        let mut guard = self.inner.reader.lock();
        match guard.as_mut() {
            Some(reader) => op(reader),
            None => Err(Error::Io(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("archive '{}' has been closed", self.inner.name),
            ))),
        }
    }

    /// Release the underlying source. Safe to call more than once.
    pub fn close(&self) {
        self.inner.reader.lock().take();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.reader.lock().is_none()
    }

    /// Whether two handles refer to the same archive
    pub fn same_archive(&self, other: &ArchiveHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}
