//! The merged archive namespace.
//!
//! Archives are mounted in order (base game first, then mods). Directory
//! listings sharing a hash are unioned; a file hash defined again by a later
//! archive replaces the earlier entry, which is how mods override base data.

use log::{debug, info};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::archive::{self, ArchiveIndex, ArchiveKind, DirectoryEntry, FileEntry};
use crate::error::{Error, Result};
use crate::hash::{hash_path, normalize_path};
use crate::io::{ArchiveHandle, ReadSeek};

/// File extension of game archives
pub const ARCHIVE_EXTENSION: &str = "scs";

/// Hash-addressed namespace over any number of mounted archives.
///
/// Mount sequentially before sharing the filesystem between threads; lookups
/// and body reads take `&self`, and reads are serialized per archive.
#[derive(Debug, Default)]
pub struct FileSystem {
    dirs: HashMap<u64, DirectoryEntry>,
    files: HashMap<u64, FileEntry>,
    archives: Vec<(ArchiveHandle, ArchiveKind)>,
}

impl FileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a directory of archives or a single archive file
    pub fn mount(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if path.is_dir() {
            self.mount_dir(path)
        } else {
            self.mount_file(path).map(|_| 1)
        }
    }

    /// Mount every `*.scs` file in a directory, in file-name order.
    ///
    /// Returns the number of archives mounted. Each archive is merged only
    /// after it parses completely; an error stops at the failing archive and
    /// leaves the ones before it mounted.
    pub fn mount_dir(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let mut archives = Vec::new();
        for entry in fs::read_dir(path)? {
            let archive = entry?.path();
            if archive.is_file() && has_archive_extension(&archive) {
                archives.push(archive);
            }
        }
        archives.sort();
        debug!("{}: found {} archives", path.display(), archives.len());

        for archive in &archives {
            self.mount_file(archive)?;
        }
        Ok(archives.len())
    }

    /// Mount one archive file, detecting its format
    pub fn mount_file(&mut self, path: impl AsRef<Path>) -> Result<ArchiveKind> {
        let handle = ArchiveHandle::open(path.as_ref())?;
        self.mount_handle(handle)
    }

    /// Mount an archive from any seekable source, e.g. bytes in memory
    pub fn mount_reader<R: ReadSeek + 'static>(
        &mut self,
        name: impl Into<String>,
        reader: R,
    ) -> Result<ArchiveKind> {
        let handle = ArchiveHandle::from_reader(name, reader)?;
        self.mount_handle(handle)
    }

    fn mount_handle(&mut self, handle: ArchiveHandle) -> Result<ArchiveKind> {
        let (kind, index) = archive::parse(&handle)?;
        info!(
            "Mounted {} as {kind}: {} directories, {} files",
            handle.name(),
            index.dirs.len(),
            index.files.len()
        );
        self.merge(handle.name(), index);
        self.archives.push((handle, kind));
        Ok(kind)
    }

    fn merge(&mut self, source: &str, index: ArchiveIndex) {
        for (hash, mut dir) in index.dirs {
            dir.add_source(source);
            match self.dirs.get_mut(&hash) {
                Some(existing) => existing.merge(dir),
                None => {
                    self.dirs.insert(hash, dir);
                }
            }
        }
        // Last mounted archive wins
        self.files.extend(index.files);
    }

    /// Look up a file by path.
    ///
    /// The path may carry leading or trailing separators. A hit records the
    /// path on the entry, since the namespace itself only stores hashes.
    pub fn get_file(&self, path: &str) -> Option<FileEntry> {
        let normalized = normalize_path(path);
        let entry = self.files.get(&hash_path(normalized))?;
        entry.fill_path(normalized);
        Some(entry.clone())
    }

    /// Merged listing of a directory
    pub fn get_dir(&self, path: &str) -> Option<&DirectoryEntry> {
        self.dirs.get(&hash_path(path))
    }

    /// Files directly inside a directory whose name contains `filter`.
    ///
    /// An empty filter matches every file. A missing directory yields an
    /// empty list.
    pub fn get_files_in_dir(&self, dir_path: &str, filter: &str) -> Vec<FileEntry> {
        let dir_path = normalize_path(dir_path);
        let Some(dir) = self.get_dir(dir_path) else {
            return Vec::new();
        };

        dir.files()
            .iter()
            .filter(|name| name.contains(filter))
            .filter_map(|name| {
                let path = if dir_path.is_empty() {
                    name.clone()
                } else {
                    format!("{dir_path}/{name}")
                };
                let file = self.get_file(&path);
                if file.is_none() {
                    debug!("'{path}' is listed but has no file entry");
                }
                file
            })
            .collect()
    }

    /// Read a file's body, or `None` if the path is not mapped
    pub fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.get_file(path).map(|file| file.read()).transpose()
    }

    /// Mounted archives and their detected formats, in mount order
    pub fn archives(&self) -> &[(ArchiveHandle, ArchiveKind)] {
        &self.archives
    }

    pub fn dir_count(&self) -> usize {
        self.dirs.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Close every mounted archive.
    ///
    /// The namespace stays intact, but reading any body afterwards fails with
    /// an I/O error, including through entries obtained earlier.
    pub fn close_archives(&mut self) {
        for (handle, _) in self.archives.drain(..) {
            handle.close();
        }
    }
}

fn has_archive_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_extension() {
        assert!(has_archive_extension(Path::new("base.scs")));
        assert!(has_archive_extension(Path::new("/game/DEF.SCS")));
        assert!(!has_archive_extension(Path::new("base.zip")));
        assert!(!has_archive_extension(Path::new("scs")));
    }

    #[test]
    fn test_empty_namespace_lookups() {
        let fs = FileSystem::new();
        assert!(fs.get_file("/def/city.sii").is_none());
        assert!(fs.get_dir("/def").is_none());
        assert!(fs.get_files_in_dir("/def", "city").is_empty());
        assert!(fs.read_file("def/city.sii").unwrap().is_none());
    }

    #[test]
    fn test_mount_missing_sources() {
        let mut fs = FileSystem::new();
        assert!(matches!(
            fs.mount_dir("/nonexistent/game"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            fs.mount_file("/nonexistent/game/base.scs"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(fs.mount("/nonexistent"), Err(Error::NotFound(_))));
        assert_eq!(fs.dir_count(), 0);
        assert!(fs.archives().is_empty());
    }

    #[test]
    fn test_mount_dir_only_takes_archive_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readme.txt"), b"not an archive").unwrap();
        fs::create_dir(dir.path().join("mods.scs")).unwrap();

        let mut vfs = FileSystem::new();
        assert_eq!(vfs.mount_dir(dir.path()).unwrap(), 0);
        assert!(vfs.archives().is_empty());
        assert!(matches!(
            vfs.mount_dir(dir.path().join("readme.txt")),
            Err(Error::NotFound(_))
        ));
    }
}
