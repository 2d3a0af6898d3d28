//! ZIP archive parser.
//!
//! ## Parsing Strategy
//!
//! 1. Read the End of Central Directory (EOCD) from a fixed offset 22 bytes
//!    before the end of the file; archives with a trailing comment fail here
//! 2. Walk exactly the declared number of Central Directory records
//! 3. For each file, read its Local File Header to find where the data begins,
//!    since the local name and extra fields can differ from the central ones

use log::{debug, warn};
use std::io::{Read, Seek};

use super::structures::*;
use crate::archive::{ArchiveIndex, BodyLocation, FileEntry};
use crate::encoding::decode_cp437;
use crate::error::{Error, Result};
use crate::hash::hash_path;
use crate::io::{ArchiveHandle, BinaryReader};
use crate::record::{self, Record};

/// Parse a ZIP archive into directory and file tables.
///
/// Every entry's leaf name is added to its parent directory (root-level
/// entries belong to the directory with the empty path). Directory records
/// only register their name; file records also get a [`FileEntry`].
pub fn parse(handle: &ArchiveHandle) -> Result<ArchiveIndex> {
    handle.with_reader(|reader| {
        let eocd = read_eocd(reader)?;
        reader.seek(eocd.cd_offset as u64)?;

        let mut index = ArchiveIndex::default();
        for _ in 0..eocd.total_entries {
            let header: CentralDirectoryHeader = record::read_record(reader)?;
            let name = reader.read(header.file_name_length as u64)?;
            reader.skip(header.extra_field_length as u64 + header.file_comment_length as u64)?;

            // Directories have a trailing slash; ZIP always uses forward slashes
            let decoded = decode_cp437(&name);
            let file_path = decoded.trim_matches('/');
            let (parent_path, leaf) = split_parent(file_path);
            let parent = index.dirs.entry(hash_path(parent_path)).or_default();

            if header.is_directory() {
                parent.add_subdir(leaf);
                continue;
            }

            if let CompressionMethod::Unknown(method) = header.compression_method {
                warn!("{}: '{file_path}' uses unsupported compression method {method}", handle.name());
            }

            let data_offset = reader.with_saved_position(|r| data_offset(r, &header))?;
            let hash = hash_path(file_path);
            let body = BodyLocation::new(
                handle.clone(),
                data_offset,
                header.compressed_size as u64,
                header.uncompressed_size as u64,
                header.compression(),
            );
            index.files.insert(hash, FileEntry::new(hash, body));
            parent.add_file(leaf);
        }

        debug!(
            "{}: {} central directory records, {} directories, {} files",
            handle.name(),
            eocd.total_entries,
            index.dirs.len(),
            index.files.len()
        );
        Ok(index)
    })
}

/// Read the EOCD, assuming it has no trailing comment
fn read_eocd<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<EndOfCentralDirectory> {
    let size = EndOfCentralDirectory::SIZE as u64;
    let Some(offset) = reader.len().checked_sub(size) else {
        return Err(Error::UnexpectedEof {
            offset: 0,
            wanted: size,
        });
    };
    reader.seek(offset)?;
    record::read_record(reader)
}

/// Offset of a file's data: after the local header and its name and extra fields
fn data_offset<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
    header: &CentralDirectoryHeader,
) -> Result<u64> {
    let lfh_offset = header.lfh_offset as u64;
    reader.seek(lfh_offset)?;
    let lfh: LocalFileHeader = record::read_record(reader)?;
    Ok(lfh_offset
        + LocalFileHeader::SIZE as u64
        + lfh.file_name_length as u64
        + lfh.extra_field_length as u64)
}

/// Split a path at its last separator into (parent path, leaf name)
fn split_parent(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some((parent, leaf)) => (parent, leaf),
        None => ("", path),
    }
}
