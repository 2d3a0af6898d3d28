//! SCS hash archives.
//!
//! A hash archive is a 20-byte header followed (at any offset) by a flat
//! table of 32-byte entries. Entries carry no names, only the CityHash64 of
//! the normalized path:
//!
//! ```text
//! header: "SCS#" | version u16 = 1 | salt u16 | "CITY" | entry count u32 | table offset u32
//! entry:  hash u64 | body offset u64 | flags u32 | crc u32 | size u32 | stored size u32
//! ```
//!
//! Directory entries have flag bit 0 set; their body is a newline separated
//! listing in code page 437 where subdirectories are prefixed with `*`.

mod parser;
mod structures;

pub use parser::parse;
pub use structures::*;
