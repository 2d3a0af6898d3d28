//! Fixture builders shared by the integration tests
#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::{Cursor, Write};

use scsfs::hash::hash_path;

const ENTRY_FLAG_DIRECTORY: u32 = 0x1;
const ENTRY_FLAG_COMPRESSED: u32 = 0x2;

struct PendingEntry {
    hash: u64,
    flags: u32,
    stored: Vec<u8>,
    size: u32,
}

/// Writes `SCS#` hash archives in memory
#[derive(Default)]
pub struct ScsBuilder {
    entries: Vec<PendingEntry>,
}

impl ScsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an uncompressed file
    pub fn file(mut self, path: &str, data: &[u8]) -> Self {
        self.entries.push(PendingEntry {
            hash: hash_path(path),
            flags: 0,
            stored: data.to_vec(),
            size: data.len() as u32,
        });
        self
    }

    /// Add a zlib-compressed file
    pub fn compressed_file(mut self, path: &str, data: &[u8]) -> Self {
        self.entries.push(PendingEntry {
            hash: hash_path(path),
            flags: ENTRY_FLAG_COMPRESSED,
            stored: zlib(data),
            size: data.len() as u32,
        });
        self
    }

    /// Add a directory listing (`*name` lines for subdirectories)
    pub fn dir(mut self, path: &str, subdirs: &[&str], files: &[&str]) -> Self {
        let listing = subdirs
            .iter()
            .map(|s| format!("*{s}"))
            .chain(files.iter().map(|f| f.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        self.entries.push(PendingEntry {
            hash: hash_path(path),
            flags: ENTRY_FLAG_DIRECTORY,
            size: listing.len() as u32,
            stored: listing.into_bytes(),
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        const HEADER_SIZE: u64 = 20;

        let mut bodies = Vec::new();
        let mut offsets = Vec::new();
        for entry in &self.entries {
            offsets.push(HEADER_SIZE + bodies.len() as u64);
            bodies.extend_from_slice(&entry.stored);
        }
        let table_offset = HEADER_SIZE + bodies.len() as u64;

        let mut out = Vec::new();
        out.extend_from_slice(b"SCS#");
        out.write_u16::<LittleEndian>(1).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.extend_from_slice(b"CITY");
        out.write_u32::<LittleEndian>(self.entries.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(table_offset as u32).unwrap();
        out.extend_from_slice(&bodies);

        for (entry, offset) in self.entries.iter().zip(offsets) {
            out.write_u64::<LittleEndian>(entry.hash).unwrap();
            out.write_u64::<LittleEndian>(offset).unwrap();
            out.write_u32::<LittleEndian>(entry.flags).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(entry.size).unwrap();
            out.write_u32::<LittleEndian>(entry.stored.len() as u32).unwrap();
        }
        out
    }

    pub fn reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.build())
    }
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Build a ZIP archive with the `zip` crate.
///
/// Paths ending in `/` become directory records; everything else is a file
/// written with the given method.
pub fn zip_archive(entries: &[(&str, &[u8])], method: zip::CompressionMethod) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default().compression_method(method);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Bytes of a sector file with the given raw items and trailing node count
pub fn sector_bytes(item_count: u32, items: &[Vec<u8>], node_count: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(898).unwrap();
    out.extend_from_slice(b"euro2\0\0\0");
    out.write_u32::<LittleEndian>(3).unwrap();
    out.write_u32::<LittleEndian>(item_count).unwrap();
    for item in items {
        out.extend_from_slice(item);
    }
    out.write_u32::<LittleEndian>(node_count).unwrap();
    out
}

fn item(tag: u32, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u32::<LittleEndian>(tag).unwrap();
    out.write_u64::<LittleEndian>(0xfeed).unwrap();
    out.extend_from_slice(&[0u8; 40 + 4 + 1]);
    out.extend_from_slice(body);
    out
}

pub fn road_item(start: u64, end: u64, length: f32) -> Vec<u8> {
    let mut body = vec![0u8; 192];
    body.write_u64::<LittleEndian>(start).unwrap();
    body.write_u64::<LittleEndian>(end).unwrap();
    body.write_f32::<LittleEndian>(length).unwrap();
    item(3, &body)
}

pub fn city_item() -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u64::<LittleEndian>(0x1234).unwrap();
    body.write_f32::<LittleEndian>(100.0).unwrap();
    body.write_f32::<LittleEndian>(80.0).unwrap();
    body.write_u64::<LittleEndian>(0x99).unwrap();
    item(12, &body)
}

pub fn model_item(parts: u32) -> Vec<u8> {
    let mut body = vec![0u8; 24];
    body.write_u32::<LittleEndian>(parts).unwrap();
    body.extend(std::iter::repeat_n(0u8, parts as usize * 8));
    body.extend_from_slice(&[0u8; 8 + 12 + 8 + 4 + 4]);
    item(5, &body)
}

pub fn trigger_item_without_parameters() -> Vec<u8> {
    let mut body = Vec::new();
    body.write_u32::<LittleEndian>(1).unwrap();
    body.extend_from_slice(&[0u8; 8]);
    body.write_u32::<LittleEndian>(0).unwrap();
    body.write_u32::<LittleEndian>(1).unwrap();
    body.extend_from_slice(&[0u8; 8]);
    body.write_i32::<LittleEndian>(-1).unwrap();
    body.extend_from_slice(&[0u8; 24]);
    item(34, &body)
}

pub fn raw_item(tag: u32, body: &[u8]) -> Vec<u8> {
    item(tag, body)
}
