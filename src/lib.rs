//! # scsfs
//!
//! Read-only access to SCS Software game data: the archive virtual
//! filesystem and the binary map sector format.
//!
//! Game data ships as `.scs` archives in one of two containers: the `SCS#`
//! hash archive, where every path is stored only as a 64-bit CityHash, or a
//! plain ZIP. Archives are mounted into a [`FileSystem`] in load order; later
//! archives add to shared directories and override files defined earlier,
//! the same way mods override base game data.
//!
//! ## Features
//!
//! - Format detection between hash archives and ZIP
//! - Lazy, frozen-at-mount file bodies (stored, zlib or deflate)
//! - Directory listings merged across archives, with source tracking
//! - Map sector decoding (header, every known item layout, roads)
//!
//! ## Example
//!
//! ```no_run
//! use scsfs::{FileSystem, sector};
//!
//! fn main() -> scsfs::Result<()> {
//!     let mut fs = FileSystem::new();
//!     fs.mount_dir("/games/ets2")?;
//!
//!     for file in fs.get_files_in_dir("def/country", ".sii") {
//!         println!("{} ({} bytes)", file.path().unwrap_or_default(), file.size());
//!     }
//!
//!     if let Some(data) = fs.read_file("map/europe/sec+0000+0000.base")? {
//!         let sector = sector::decode_sector(&data)?;
//!         println!("{} roads", sector.roads().count());
//!     }
//!
//!     fs.close_archives();
//!     Ok(())
//! }
//! ```

pub mod archive;
pub mod cli;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod io;
pub mod record;
pub mod scs;
pub mod sector;
pub mod vfs;
pub mod zip;

pub use archive::{ArchiveKind, BodyLocation, Compression, DirectoryEntry, FileEntry};
pub use cli::Cli;
pub use error::{Error, Result};
pub use hash::{hash_path, normalize_path};
pub use io::ArchiveHandle;
pub use sector::{Road, Sector, SectorItem, decode_sector};
pub use vfs::FileSystem;
