//! ZIP archive parsing.
//!
//! Mods are often shipped as plain ZIP files renamed to `.scs`. Only the
//! subset of ZIP seen in game archives is supported:
//!
//! - [`structures`]: the EOCD, central directory and local header records
//! - [`parser`]: walking the central directory into an
//!   [`ArchiveIndex`](crate::archive::ArchiveIndex)
//!
//! ## Supported Features
//!
//! - STORED (no compression) and DEFLATE bodies
//! - Directory records (trailing slash, empty body)
//!
//! ## Limitations
//!
//! - No archive comments (the EOCD must be the last 22 bytes)
//! - No ZIP64, encryption or multi-disk archives

mod parser;
mod structures;

pub use parser::parse;
pub use structures::*;
