//! Error types for archive mounting, lookups and sector decoding

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scsfs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scsfs operations
#[derive(Error, Debug)]
pub enum Error {
    /// A mount source (archive file or directory) does not exist
    #[error("Source not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A fixed-layout record failed its post-decode validation
    #[error("{record} record mismatch in field '{field}'")]
    FormatMismatch {
        /// Record name
        record: &'static str,
        /// First field that failed validation
        field: &'static str,
    },

    /// Neither the hash-archive parser nor the ZIP parser accepted the file
    #[error("Unsupported archive '{name}': {reason}")]
    UnsupportedArchive {
        /// Archive name (usually its path)
        name: String,
        /// Why the ZIP fallback rejected it
        reason: String,
    },

    /// Truncated or corrupt binary data
    #[error("Unexpected end of data at offset {offset}: wanted {wanted} more bytes")]
    UnexpectedEof {
        /// Cursor position at the failed read
        offset: u64,
        /// Number of bytes requested
        wanted: u64,
    },

    /// A sector item carries a type tag outside the known set
    #[error("Unrecognized item type {tag} at offset {offset}")]
    UnrecognizedItemType {
        /// Raw type tag
        tag: u32,
        /// Offset of the tag
        offset: u64,
    },

    /// The sector header describes a game build this decoder does not support
    #[error("Unsupported sector {field}: expected {expected}, found {found}")]
    UnsupportedSectorVersion {
        /// Header field name
        field: &'static str,
        /// Supported value
        expected: u32,
        /// Value found in the file
        found: u32,
    },

    /// A recognized sector item contains a value its layout cannot represent
    #[error("Invalid {item} item at offset {offset}: {reason}")]
    InvalidItemLayout {
        /// Item type name
        item: &'static str,
        /// Offset of the offending value
        offset: u64,
        /// Description of the problem
        reason: String,
    },

    /// A decompressed body does not have its declared length
    #[error("Decompressed size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Declared uncompressed length
        expected: u64,
        /// Actual decompressed length
        actual: u64,
    },

    /// I/O error, including reads on a closed archive
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a new FormatMismatch error
    pub fn format_mismatch(record: &'static str, field: &'static str) -> Self {
        Error::FormatMismatch { record, field }
    }

    /// Create a new InvalidItemLayout error
    pub fn invalid_item<S: Into<String>>(item: &'static str, offset: u64, reason: S) -> Self {
        Error::InvalidItemLayout {
            item,
            offset,
            reason: reason.into(),
        }
    }

    /// Check if this error indicates corrupt or unsupported input data
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::FormatMismatch { .. }
                | Error::UnsupportedArchive { .. }
                | Error::UnexpectedEof { .. }
                | Error::UnrecognizedItemType { .. }
                | Error::UnsupportedSectorVersion { .. }
                | Error::InvalidItemLayout { .. }
                | Error::SizeMismatch { .. }
        )
    }
}
