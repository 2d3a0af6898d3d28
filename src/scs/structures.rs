use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::archive::Compression;
use crate::error::Result;
use crate::record::{Record, Validation};

/// Hash archive header - 20 bytes
#[derive(Debug, Clone)]
pub struct ScsHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub salt: u16,
    pub hash_method: [u8; 4],
    pub entry_count: u32,
    pub entry_table_offset: u32,
}

impl ScsHeader {
    pub const MAGIC: &'static [u8; 4] = b"SCS#";
    pub const VERSION: u16 = 1;
    pub const HASH_METHOD: &'static [u8; 4] = b"CITY";
}

impl Record for ScsHeader {
    const NAME: &'static str = "SCS header";
    const SIZE: usize = 20;

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(buf);
        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        let version = cursor.read_u16::<LittleEndian>()?;
        let salt = cursor.read_u16::<LittleEndian>()?;
        let mut hash_method = [0u8; 4];
        cursor.read_exact(&mut hash_method)?;

        Ok(Self {
            magic,
            version,
            salt,
            hash_method,
            entry_count: cursor.read_u32::<LittleEndian>()?,
            entry_table_offset: cursor.read_u32::<LittleEndian>()?,
        })
    }

    fn validate(&self) -> Validation {
        Validation::Valid
            .check("magic", &self.magic == Self::MAGIC)
            .check("version", self.version == Self::VERSION)
            .check("hash_method", &self.hash_method == Self::HASH_METHOD)
    }
}

/// Hash archive entry - 32 bytes
#[derive(Debug, Clone)]
pub struct ScsEntry {
    pub hash: u64,
    pub offset: u64,
    pub flags: u32,
    pub crc: u32,
    pub size: u32,
    pub stored_size: u32,
}

impl ScsEntry {
    pub const FLAG_DIRECTORY: u32 = 0x1;
    pub const FLAG_COMPRESSED: u32 = 0x2;

    pub fn is_directory(&self) -> bool {
        self.flags & Self::FLAG_DIRECTORY != 0
    }

    pub fn is_compressed(&self) -> bool {
        self.flags & Self::FLAG_COMPRESSED != 0
    }

    /// Storage is decided by the lengths, not the flag: a body is inflated
    /// only when it is non-empty and smaller than its declared size.
    pub fn compression(&self) -> Compression {
        if self.size > self.stored_size && self.stored_size > 0 {
            Compression::Zlib
        } else {
            Compression::Stored
        }
    }
}

impl Record for ScsEntry {
    const NAME: &'static str = "SCS entry";
    const SIZE: usize = 32;

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(buf);
        Ok(Self {
            hash: cursor.read_u64::<LittleEndian>()?,
            offset: cursor.read_u64::<LittleEndian>()?,
            flags: cursor.read_u32::<LittleEndian>()?,
            crc: cursor.read_u32::<LittleEndian>()?,
            size: cursor.read_u32::<LittleEndian>()?,
            stored_size: cursor.read_u32::<LittleEndian>()?,
        })
    }
}
