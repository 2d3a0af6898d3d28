mod handle;
mod reader;

pub use handle::{ArchiveHandle, ArchiveReader};
pub use reader::BinaryReader;

use std::io::{Read, Seek};

/// Combined trait for seekable archive sources
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}
