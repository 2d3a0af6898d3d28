//! Map sector decoding.
//!
//! A sector file (`map/<name>/sec+XXXX+YYYY.base`) describes every map item in
//! one tile of the world:
//!
//! ```text
//! header       version u32 (898), game id [8], map version u32 (3), item count u32
//! items        item count × (type tag u32, common header [53], type-specific body)
//! node count   u32
//! ```
//!
//! Items carry no length or next-item offset, so the decoder depends on every
//! body layout in [`items`] consuming exactly the right number of bytes. An
//! unknown tag or a read past the end fails the whole decode; no partial item
//! list is returned.

mod items;

pub use items::{ITEM_HEADER_SIZE, ItemType, Road, SectorItem};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace, warn};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use crate::error::{Error, Result};
use crate::io::BinaryReader;
use crate::record::{self, Record};

/// Sector file header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorHeader {
    pub version: u32,
    /// Game identifier, not validated
    pub game_id: [u8; 8],
    pub map_version: u32,
    pub item_count: u32,
}

impl SectorHeader {
    pub const VERSION: u32 = 898;
    pub const MAP_VERSION: u32 = 3;

    /// Reject headers written by an unsupported game build
    pub fn ensure_supported(&self) -> Result<()> {
        for (field, expected, found) in [
            ("version", Self::VERSION, self.version),
            ("map version", Self::MAP_VERSION, self.map_version),
        ] {
            if expected != found {
                return Err(Error::UnsupportedSectorVersion {
                    field,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

impl Record for SectorHeader {
    const NAME: &'static str = "sector header";
    const SIZE: usize = 20;

    fn decode(buf: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(buf);
        let version = cursor.read_u32::<LittleEndian>()?;
        let mut game_id = [0u8; 8];
        cursor.read_exact(&mut game_id)?;
        Ok(Self {
            version,
            game_id,
            map_version: cursor.read_u32::<LittleEndian>()?,
            item_count: cursor.read_u32::<LittleEndian>()?,
        })
    }
}

/// A decoded sector
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub header: SectorHeader,
    /// Modeled items in file order
    pub items: Vec<SectorItem>,
    /// Number of items of each type walked, modeled or not
    pub item_counts: BTreeMap<ItemType, u32>,
    /// Trailing node count
    pub node_count: u32,
    /// Bytes left after the node count
    pub trailing_bytes: u64,
}

impl Sector {
    pub fn roads(&self) -> impl Iterator<Item = &Road> {
        self.items.iter().map(|item| match item {
            SectorItem::Road(road) => road,
        })
    }
}

/// Decode a decompressed sector file.
///
/// The item count in the header is trusted. If it is smaller than the number
/// of items actually stored, the decode still succeeds: the next item's tag is
/// taken as the node count and the rest is reported in
/// [`Sector::trailing_bytes`] (and logged as a warning).
pub fn decode_sector(data: &[u8]) -> Result<Sector> {
    let mut reader = BinaryReader::new(Cursor::new(data))?;
    let header: SectorHeader = record::read_unchecked(&mut reader)?;
    header.ensure_supported()?;

    let mut items = Vec::new();
    let mut item_counts = BTreeMap::new();
    for _ in 0..header.item_count {
        let offset = reader.position()?;
        let tag = reader.read_u32()?;
        let item_type = ItemType::from_tag(tag).ok_or(Error::UnrecognizedItemType { tag, offset })?;
        trace!("{} item at offset {offset}", item_type.name());

        reader.skip(ITEM_HEADER_SIZE)?;
        if let Some(item) = items::read_item(&mut reader, item_type)? {
            items.push(item);
        }
        *item_counts.entry(item_type).or_insert(0) += 1;
    }

    let node_count = reader.read_u32()?;
    let trailing_bytes = reader.remaining()?;
    if trailing_bytes > 0 {
        warn!("{trailing_bytes} bytes left after the sector node count; the item count may be short");
    }
    debug!(
        "Decoded sector: {} items, {} modeled, {node_count} nodes",
        header.item_count,
        items.len()
    );

    Ok(Sector {
        header,
        items,
        item_counts,
        node_count,
        trailing_bytes,
    })
}
