use log::debug;

use super::structures::{ScsEntry, ScsHeader};
use crate::archive::{ArchiveIndex, BodyLocation, DirectoryEntry, FileEntry};
use crate::encoding::decode_cp437;
use crate::error::Result;
use crate::io::ArchiveHandle;
use crate::record;

/// Parse a hash archive into its directory and file tables.
///
/// Fails with [`FormatMismatch`](crate::Error::FormatMismatch) if the header
/// does not validate. Directory listings are read eagerly; file bodies are
/// only located. A later entry with the same file hash replaces an earlier
/// one; directory listings sharing a hash are unioned.
pub fn parse(handle: &ArchiveHandle) -> Result<ArchiveIndex> {
    handle.with_reader(|reader| {
        reader.seek(0)?;
        let header: ScsHeader = record::read_record(reader)?;

        // Read the whole entry table at once
        reader.seek(header.entry_table_offset as u64)?;
        let entries: Vec<ScsEntry> = record::read_records(reader, header.entry_count as usize)?;

        let mut index = ArchiveIndex::default();
        for entry in entries {
            let body = BodyLocation::new(
                handle.clone(),
                entry.offset,
                entry.stored_size as u64,
                entry.size as u64,
                entry.compression(),
            );

            if entry.is_directory() {
                let listing = body.read_from(reader)?;
                let dir = index.dirs.entry(entry.hash).or_default();
                add_listing(dir, &listing);
            } else {
                index.files.insert(entry.hash, FileEntry::new(entry.hash, body));
            }
        }

        debug!(
            "{}: {} entries, {} directories, {} files",
            handle.name(),
            header.entry_count,
            index.dirs.len(),
            index.files.len()
        );
        Ok(index)
    })
}

/// Add the names from a directory listing body
fn add_listing(dir: &mut DirectoryEntry, listing: &[u8]) {
    for line in decode_cp437(listing).lines() {
        if line.is_empty() {
            continue;
        }
        match line.strip_prefix('*') {
            Some(subdir) => dir.add_subdir(subdir),
            None => dir.add_file(line),
        }
    }
}
