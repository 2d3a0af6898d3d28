use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::archive::Compression;
use crate::error::Result;
use crate::record::{Record, Validation};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }
}

fn read_signature(cursor: &mut Cursor<&[u8]>) -> Result<[u8; 4]> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    Ok(sig)
}

/// End of Central Directory (EOCD) - 22 bytes without a comment
#[derive(Debug, Clone)]
pub struct EndOfCentralDirectory {
    pub signature: [u8; 4],
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8; 4] = b"PK\x05\x06";

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

impl Record for EndOfCentralDirectory {
    const NAME: &'static str = "ZIP end of central directory";
    const SIZE: usize = 22;

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(buf);
        Ok(Self {
            signature: read_signature(&mut cursor)?,
            disk_number: cursor.read_u16::<LittleEndian>()?,
            disk_with_cd: cursor.read_u16::<LittleEndian>()?,
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    /// Only single-disk, comment-free, non-ZIP64 archives are accepted
    fn validate(&self) -> Validation {
        Validation::Valid
            .check("signature", &self.signature == Self::SIGNATURE)
            .check("comment_len", self.comment_len == 0)
            .check("disk_number", self.disk_number == 0 && self.disk_with_cd == 0)
            .check("zip64", !self.is_zip64())
    }
}

/// Central Directory File Header (CDFH) - 46 bytes before the variable fields
#[derive(Debug, Clone)]
pub struct CentralDirectoryHeader {
    pub signature: [u8; 4],
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub last_mod_time: u16,
    pub last_mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_length: u16,
    pub extra_field_length: u16,
    pub file_comment_length: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub lfh_offset: u32,
}

impl CentralDirectoryHeader {
    pub const SIGNATURE: &'static [u8; 4] = b"PK\x01\x02";

    /// Directory entries are recognized by an empty body
    pub fn is_directory(&self) -> bool {
        self.compressed_size == 0
    }

    /// Inflate only when the sizes differ and something is stored
    pub fn compression(&self) -> Compression {
        if self.compressed_size != self.uncompressed_size && self.compressed_size != 0 {
            Compression::Deflate
        } else {
            Compression::Stored
        }
    }
}

impl Record for CentralDirectoryHeader {
    const NAME: &'static str = "ZIP central directory header";
    const SIZE: usize = 46;

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(buf);
        Ok(Self {
            signature: read_signature(&mut cursor)?,
            version_made_by: cursor.read_u16::<LittleEndian>()?,
            version_needed: cursor.read_u16::<LittleEndian>()?,
            flags: cursor.read_u16::<LittleEndian>()?,
            compression_method: CompressionMethod::from_u16(cursor.read_u16::<LittleEndian>()?),
            last_mod_time: cursor.read_u16::<LittleEndian>()?,
            last_mod_date: cursor.read_u16::<LittleEndian>()?,
            crc32: cursor.read_u32::<LittleEndian>()?,
            compressed_size: cursor.read_u32::<LittleEndian>()?,
            uncompressed_size: cursor.read_u32::<LittleEndian>()?,
            file_name_length: cursor.read_u16::<LittleEndian>()?,
            extra_field_length: cursor.read_u16::<LittleEndian>()?,
            file_comment_length: cursor.read_u16::<LittleEndian>()?,
            disk_number_start: cursor.read_u16::<LittleEndian>()?,
            internal_attrs: cursor.read_u16::<LittleEndian>()?,
            external_attrs: cursor.read_u32::<LittleEndian>()?,
            lfh_offset: cursor.read_u32::<LittleEndian>()?,
        })
    }

    fn validate(&self) -> Validation {
        Validation::Valid.check("signature", &self.signature == Self::SIGNATURE)
    }
}

/// Local File Header (LFH) - 30 bytes before the variable fields
#[derive(Debug, Clone)]
pub struct LocalFileHeader {
    pub signature: [u8; 4],
    pub file_name_length: u16,
    pub extra_field_length: u16,
}

impl LocalFileHeader {
    pub const SIGNATURE: &'static [u8; 4] = b"PK\x03\x04";
}

impl Record for LocalFileHeader {
    const NAME: &'static str = "ZIP local file header";
    const SIZE: usize = 30;

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(buf);
        let signature = read_signature(&mut cursor)?;
        // Offset to filename length field
        cursor.set_position(26);
        Ok(Self {
            signature,
            file_name_length: cursor.read_u16::<LittleEndian>()?,
            extra_field_length: cursor.read_u16::<LittleEndian>()?,
        })
    }

    fn validate(&self) -> Validation {
        Validation::Valid.check("signature", &self.signature == Self::SIGNATURE)
    }
}
