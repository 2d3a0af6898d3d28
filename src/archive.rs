//! Normalized archive contents.
//!
//! Both container parsers ([`crate::scs`] and [`crate::zip`]) produce the same
//! [`ArchiveIndex`]: directory hash to [`DirectoryEntry`] and file hash to
//! [`FileEntry`]. The format is picked by probing the hash-archive header; if
//! it does not validate, the archive is read as ZIP.

use flate2::read::{DeflateDecoder, ZlibDecoder};
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::io::{Read, Seek};
use std::sync::{Arc, OnceLock};

use crate::encoding::decode_text;
use crate::error::{Error, Result};
use crate::io::{ArchiveHandle, BinaryReader};
use crate::record::{self, Record, Validation};
use crate::scs::{self, ScsHeader};
use crate::zip;

/// Upper bound for preallocating decompression buffers from untrusted sizes
const MAX_PREALLOC: u64 = 64 * 1024 * 1024;

/// Container format of a mounted archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// SCS hash archive (`SCS#` magic)
    HashArchive,
    /// Plain ZIP archive
    Zip,
}

impl ArchiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            ArchiveKind::HashArchive => "SCS hash archive",
            ArchiveKind::Zip => "ZIP archive",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a body is stored in its archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Raw bytes, returned as-is
    Stored,
    /// zlib stream (hash archives)
    Zlib,
    /// Raw deflate stream (ZIP)
    Deflate,
}

/// Where a file body lives and how to decode it.
///
/// Captured by value when the archive is parsed, so it keeps pointing at the
/// same bytes even if a later mount overrides the file in the namespace.
#[derive(Debug, Clone)]
pub struct BodyLocation {
    handle: ArchiveHandle,
    offset: u64,
    stored_len: u64,
    size: u64,
    compression: Compression,
}

impl BodyLocation {
    pub fn new(
        handle: ArchiveHandle,
        offset: u64,
        stored_len: u64,
        size: u64,
        compression: Compression,
    ) -> Self {
        Self {
            handle,
            offset,
            stored_len,
            size,
            compression,
        }
    }

    /// Archive the body is read from
    pub fn handle(&self) -> &ArchiveHandle {
        &self.handle
    }

    /// Absolute offset of the stored bytes
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Number of bytes stored in the archive
    pub fn stored_len(&self) -> u64 {
        self.stored_len
    }

    /// Declared uncompressed size
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Read and decode the body.
    ///
    /// Fails with an I/O error once the owning archive has been closed.
    pub fn read(&self) -> Result<Vec<u8>> {
        self.handle.with_reader(|reader| self.read_from(reader))
    }

    /// Read the body through an already-locked reader, leaving its cursor
    /// where it was.
    pub(crate) fn read_from<R: Read + Seek>(&self, reader: &mut BinaryReader<R>) -> Result<Vec<u8>> {
        let raw = reader.with_saved_position(|r| {
            r.seek(self.offset)?;
            r.read(self.stored_len)
        })?;
        decompress(self.compression, raw, self.size)
    }
}

/// Inflate a body, reading at most one byte past the declared size so an
/// oversized stream is caught without inflating all of it
fn decompress(compression: Compression, raw: Vec<u8>, size: u64) -> Result<Vec<u8>> {
    let limit = size.saturating_add(1);
    let mut out = Vec::new();
    match compression {
        Compression::Stored => return Ok(raw),
        Compression::Zlib => {
            out.reserve(size.min(MAX_PREALLOC) as usize);
            ZlibDecoder::new(raw.as_slice()).take(limit).read_to_end(&mut out)?
        }
        Compression::Deflate => {
            out.reserve(size.min(MAX_PREALLOC) as usize);
            DeflateDecoder::new(raw.as_slice()).take(limit).read_to_end(&mut out)?
        }
    };
    if out.len() as u64 != size {
        return Err(Error::SizeMismatch {
            expected: size,
            actual: out.len() as u64,
        });
    }
    Ok(out)
}

/// Child names of one directory, merged across every archive that lists it
#[derive(Debug, Clone, Default)]
pub struct DirectoryEntry {
    subdirs: BTreeSet<String>,
    files: BTreeSet<String>,
    sources: Vec<String>,
}

impl DirectoryEntry {
    /// Names of child directories, without separators
    pub fn subdirs(&self) -> &BTreeSet<String> {
        &self.subdirs
    }

    /// Names of child files, without separators
    pub fn files(&self) -> &BTreeSet<String> {
        &self.files
    }

    /// Archives that contributed to this directory, in mount order
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub(crate) fn add_subdir(&mut self, name: &str) {
        let name = name.trim_matches(['/', '\\']);
        if !name.is_empty() {
            self.subdirs.insert(name.to_string());
        }
    }

    pub(crate) fn add_file(&mut self, name: &str) {
        let name = name.trim_matches(['/', '\\']);
        if !name.is_empty() {
            self.files.insert(name.to_string());
        }
    }

    /// Union another listing of the same directory into this one
    pub(crate) fn merge(&mut self, other: DirectoryEntry) {
        self.subdirs.extend(other.subdirs);
        self.files.extend(other.files);
        for source in other.sources {
            self.add_source(&source);
        }
    }

    pub(crate) fn add_source(&mut self, name: &str) {
        if !self.sources.iter().any(|s| s == name) {
            self.sources.push(name.to_string());
        }
    }
}

/// A file in the namespace.
///
/// Only the hash is known when an archive is parsed; the display path is
/// filled in the first time a lookup resolves the file by name. Clones share
/// that slot.
#[derive(Debug, Clone)]
pub struct FileEntry {
    hash: u64,
    body: BodyLocation,
    path: Arc<OnceLock<String>>,
}

impl FileEntry {
    pub fn new(hash: u64, body: BodyLocation) -> Self {
        Self {
            hash,
            body,
            path: Arc::new(OnceLock::new()),
        }
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn body(&self) -> &BodyLocation {
        &self.body
    }

    /// Display path (`/dir/name`), once a lookup has supplied it
    pub fn path(&self) -> Option<&str> {
        self.path.get().map(String::as_str)
    }

    /// Name of the archive the body is read from
    pub fn source(&self) -> &str {
        self.body.handle().name()
    }

    /// Declared uncompressed size
    pub fn size(&self) -> u64 {
        self.body.size()
    }

    /// Read the decoded body
    pub fn read(&self) -> Result<Vec<u8>> {
        self.body.read()
    }

    /// Read the body as text: UTF-8, or code page 437 when it is not valid UTF-8
    pub fn read_text(&self) -> Result<String> {
        Ok(decode_text(&self.read()?).into_owned())
    }

    pub(crate) fn fill_path(&self, normalized: &str) {
        let _ = self.path.set(format!("/{normalized}"));
    }
}

/// Directory and file tables parsed from one archive
#[derive(Debug, Default)]
pub struct ArchiveIndex {
    pub dirs: HashMap<u64, DirectoryEntry>,
    pub files: HashMap<u64, FileEntry>,
}

/// Probe the hash-archive header to pick a parser
pub fn detect(handle: &ArchiveHandle) -> Result<ArchiveKind> {
    handle.with_reader(|reader| {
        reader.with_saved_position(|r| {
            if r.len() < ScsHeader::SIZE as u64 {
                return Ok(ArchiveKind::Zip);
            }
            r.seek(0)?;
            let header: ScsHeader = record::read_unchecked(r)?;
            match header.validate() {
                Validation::Valid => Ok(ArchiveKind::HashArchive),
                Validation::Mismatch(field) => {
                    debug!("{}: not a hash archive ({field} mismatch)", handle.name());
                    Ok(ArchiveKind::Zip)
                }
            }
        })
    })
}

/// Detect the container format and parse the archive.
///
/// Input that neither parser accepts is reported as
/// [`Error::UnsupportedArchive`].
pub fn parse(handle: &ArchiveHandle) -> Result<(ArchiveKind, ArchiveIndex)> {
    let kind = detect(handle)?;
    let index = match kind {
        ArchiveKind::HashArchive => scs::parse(handle)?,
        ArchiveKind::Zip => zip::parse(handle).map_err(|e| {
            if e.is_corruption() {
                Error::UnsupportedArchive {
                    name: handle.name().to_string(),
                    reason: e.to_string(),
                }
            } else {
                e
            }
        })?,
    };
    Ok((kind, index))
}
