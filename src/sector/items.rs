//! Sector item types and their byte layouts.
//!
//! Most layouts are a flat list of [`Field`]s. Types with nested,
//! data-dependent structure (terrain sides, prefab node tables, trigger
//! actions, sign overrides, trajectory rules, cutscene actions) have their
//! own readers. Only roads are materialized; everything else is consumed and
//! dropped.

use std::io::{Read, Seek};

use crate::error::{Error, Result};
use crate::io::BinaryReader;

/// Bytes after the type tag shared by every item: uid (8), bounding volume
/// (40), flags (4), view distance (1)
pub const ITEM_HEADER_SIZE: u64 = 53;

/// Unmodeled road fields before the node uids
const ROAD_UNMODELED_SIZE: u64 = 192;

/// Map item type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemType {
    Terrain,
    Building,
    Road,
    Prefab,
    Model,
    Company,
    Service,
    CutPlane,
    Mover,
    NoWeather,
    City,
    Hinge,
    MapOverlay,
    Ferry,
    Sound,
    Garage,
    CameraPoint,
    Trigger,
    FuelPump,
    Sign,
    BusStop,
    TrafficRule,
    BezierPatch,
    Compound,
    Trajectory,
    MapArea,
    FarModel,
    Curve,
    CameraPath,
    Cutscene,
    Hookup,
    VisibilityArea,
}

impl ItemType {
    pub fn from_tag(tag: u32) -> Option<Self> {
        let item_type = match tag {
            1 => ItemType::Terrain,
            2 => ItemType::Building,
            3 => ItemType::Road,
            4 => ItemType::Prefab,
            5 => ItemType::Model,
            6 => ItemType::Company,
            7 => ItemType::Service,
            8 => ItemType::CutPlane,
            9 => ItemType::Mover,
            11 => ItemType::NoWeather,
            12 => ItemType::City,
            13 => ItemType::Hinge,
            18 => ItemType::MapOverlay,
            19 => ItemType::Ferry,
            21 => ItemType::Sound,
            22 => ItemType::Garage,
            23 => ItemType::CameraPoint,
            34 => ItemType::Trigger,
            35 => ItemType::FuelPump,
            36 => ItemType::Sign,
            37 => ItemType::BusStop,
            38 => ItemType::TrafficRule,
            39 => ItemType::BezierPatch,
            40 => ItemType::Compound,
            41 => ItemType::Trajectory,
            42 => ItemType::MapArea,
            43 => ItemType::FarModel,
            44 => ItemType::Curve,
            45 => ItemType::CameraPath,
            46 => ItemType::Cutscene,
            47 => ItemType::Hookup,
            48 => ItemType::VisibilityArea,
            _ => return None,
        };
        Some(item_type)
    }

    pub fn tag(&self) -> u32 {
        match self {
            ItemType::Terrain => 1,
            ItemType::Building => 2,
            ItemType::Road => 3,
            ItemType::Prefab => 4,
            ItemType::Model => 5,
            ItemType::Company => 6,
            ItemType::Service => 7,
            ItemType::CutPlane => 8,
            ItemType::Mover => 9,
            ItemType::NoWeather => 11,
            ItemType::City => 12,
            ItemType::Hinge => 13,
            ItemType::MapOverlay => 18,
            ItemType::Ferry => 19,
            ItemType::Sound => 21,
            ItemType::Garage => 22,
            ItemType::CameraPoint => 23,
            ItemType::Trigger => 34,
            ItemType::FuelPump => 35,
            ItemType::Sign => 36,
            ItemType::BusStop => 37,
            ItemType::TrafficRule => 38,
            ItemType::BezierPatch => 39,
            ItemType::Compound => 40,
            ItemType::Trajectory => 41,
            ItemType::MapArea => 42,
            ItemType::FarModel => 43,
            ItemType::Curve => 44,
            ItemType::CameraPath => 45,
            ItemType::Cutscene => 46,
            ItemType::Hookup => 47,
            ItemType::VisibilityArea => 48,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ItemType::Terrain => "terrain",
            ItemType::Building => "building",
            ItemType::Road => "road",
            ItemType::Prefab => "prefab",
            ItemType::Model => "model",
            ItemType::Company => "company",
            ItemType::Service => "service",
            ItemType::CutPlane => "cut plane",
            ItemType::Mover => "mover",
            ItemType::NoWeather => "no weather area",
            ItemType::City => "city",
            ItemType::Hinge => "hinge",
            ItemType::MapOverlay => "map overlay",
            ItemType::Ferry => "ferry",
            ItemType::Sound => "sound",
            ItemType::Garage => "garage",
            ItemType::CameraPoint => "camera point",
            ItemType::Trigger => "trigger",
            ItemType::FuelPump => "fuel pump",
            ItemType::Sign => "sign",
            ItemType::BusStop => "bus stop",
            ItemType::TrafficRule => "traffic rule",
            ItemType::BezierPatch => "bezier patch",
            ItemType::Compound => "compound",
            ItemType::Trajectory => "trajectory",
            ItemType::MapArea => "map area",
            ItemType::FarModel => "far model",
            ItemType::Curve => "curve",
            ItemType::CameraPath => "camera path",
            ItemType::Cutscene => "cutscene",
            ItemType::Hookup => "hookup",
            ItemType::VisibilityArea => "visibility area",
        }
    }
}

/// A road segment between two map nodes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Road {
    pub start_node_uid: u64,
    pub end_node_uid: u64,
    pub length: f32,
}

/// A decoded map item
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SectorItem {
    Road(Road),
}

/// One step of a flat item layout
#[derive(Debug, Clone, Copy)]
enum Field {
    /// 8-byte token or uid
    Token,
    Float,
    Int,
    Short,
    Byte,
    /// Fixed run of bytes
    Fixed(u64),
    /// u32 count followed by `count` elements of the given width
    Array(u64),
}

use Field::*;

const BUILDING: &[Field] = &[Token, Token, Token, Token, Float, Int, Float, Array(4)];
const MODEL: &[Field] = &[Token, Token, Token, Array(8), Token, Fixed(12), Token, Int, Float];
const COMPANY: &[Field] = &[
    Token,
    Token,
    Token,
    Token,
    Array(8),
    Array(8),
    Array(8),
    Array(8),
    Array(8),
];
const SERVICE: &[Field] = &[Token, Token, Array(8)];
const CUT_PLANE: &[Field] = &[Array(8)];
const MOVER: &[Field] = &[
    Token,
    Token,
    Token,
    Float,
    Float,
    Float,
    Int,
    Array(8),
    Array(8),
    Array(4),
];
const NO_WEATHER: &[Field] = &[Float, Float, Int, Token];
const CITY: &[Field] = &[Token, Float, Float, Token];
const HINGE: &[Field] = &[Token, Token, Token, Float, Float];
const MAP_OVERLAY: &[Field] = &[Token, Token];
const FERRY: &[Field] = &[Token, Token, Token, Fixed(12)];
const SOUND: &[Field] = &[Token, Token, Float];
const GARAGE: &[Field] = &[Token, Int, Token, Token, Array(8)];
const CAMERA_POINT: &[Field] = &[Array(8), Token];
const FUEL_PUMP: &[Field] = &[Token, Token];
// Unverified: another reader disagrees on this layout
const BUS_STOP: &[Field] = &[Token, Token, Token];
const TRAFFIC_RULE: &[Field] = &[Array(8), Array(8), Token, Float];
const BEZIER_PATCH: &[Field] = &[
    Fixed(192),
    Short,
    Short,
    Token,
    Int,
    Array(28),
    Array(20),
    Array(12),
];
const COMPOUND: &[Field] = &[Token, Array(8), Array(8)];
const MAP_AREA: &[Field] = &[Array(8), Int];
const FAR_MODEL: &[Field] = &[Float, Float, Array(20), Array(8)];
const CURVE: &[Field] = &[
    Token,
    Token,
    Token,
    Token,
    Float,
    Int,
    Float,
    Float,
    Float,
    Array(4),
    Array(8),
];
const CAMERA_PATH: &[Field] = &[Array(8), Array(8), Array(8), Float];
const HOOKUP: &[Field] = &[Token, Token];
const VISIBILITY_AREA: &[Field] = &[Token, Float, Float, Array(8)];

const TERRAIN_HEAD: &[Field] = &[Token, Token, Float, Int, Float];
const TERRAIN_SIDE: &[Field] = &[Float, Token, Float, Byte, Byte, Array(28), Array(10), Array(4)];
const TERRAIN_TAIL: &[Field] = &[Array(20), Token, Token];
const PREFAB_HEAD: &[Field] = &[Token, Token, Token, Array(8)];
const PREFAB_MIDDLE: &[Field] = &[Array(8), Token, Short];
const TRIGGER_HEAD: &[Field] = &[Array(8), Array(8)];
const TRIGGER_ACTION_TAIL: &[Field] = &[Array(8), Float, Int];
const SIGN_HEAD: &[Field] = &[Token, Token, Token, Array(32)];
const TRAJECTORY_HEAD: &[Field] = &[Array(8), Int];
const TRAJECTORY_TAIL: &[Field] = &[Array(16), Array(8)];
const CUTSCENE_HEAD: &[Field] = &[Array(8), Token, Int];

/// Consume one item body (after the common header).
///
/// Returns the typed item for modeled types and `None` for the rest.
pub fn read_item<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
    item_type: ItemType,
) -> Result<Option<SectorItem>> {
    let layout = match item_type {
        ItemType::Road => return read_road(reader).map(|road| Some(SectorItem::Road(road))),
        ItemType::Terrain => return skip_terrain(reader).map(|_| None),
        ItemType::Prefab => return skip_prefab(reader).map(|_| None),
        ItemType::Trigger => return skip_trigger(reader).map(|_| None),
        ItemType::Sign => return skip_sign(reader).map(|_| None),
        ItemType::Trajectory => return skip_trajectory(reader).map(|_| None),
        ItemType::Cutscene => return skip_cutscene(reader).map(|_| None),
        ItemType::Building => BUILDING,
        ItemType::Model => MODEL,
        ItemType::Company => COMPANY,
        ItemType::Service => SERVICE,
        ItemType::CutPlane => CUT_PLANE,
        ItemType::Mover => MOVER,
        ItemType::NoWeather => NO_WEATHER,
        ItemType::City => CITY,
        ItemType::Hinge => HINGE,
        ItemType::MapOverlay => MAP_OVERLAY,
        ItemType::Ferry => FERRY,
        ItemType::Sound => SOUND,
        ItemType::Garage => GARAGE,
        ItemType::CameraPoint => CAMERA_POINT,
        ItemType::FuelPump => FUEL_PUMP,
        ItemType::BusStop => BUS_STOP,
        ItemType::TrafficRule => TRAFFIC_RULE,
        ItemType::BezierPatch => BEZIER_PATCH,
        ItemType::Compound => COMPOUND,
        ItemType::MapArea => MAP_AREA,
        ItemType::FarModel => FAR_MODEL,
        ItemType::Curve => CURVE,
        ItemType::CameraPath => CAMERA_PATH,
        ItemType::Hookup => HOOKUP,
        ItemType::VisibilityArea => VISIBILITY_AREA,
    };
    skip_fields(reader, layout)?;
    Ok(None)
}

fn skip_fields<R: Read + Seek>(reader: &mut BinaryReader<R>, fields: &[Field]) -> Result<()> {
    for field in fields {
        match *field {
            Token => reader.skip(8)?,
            Float | Int => reader.skip(4)?,
            Short => reader.skip(2)?,
            Byte => reader.skip(1)?,
            Fixed(n) => reader.skip(n)?,
            Array(width) => skip_array(reader, width)?,
        }
    }
    Ok(())
}

/// Skip a u32-counted array of `width`-byte elements
fn skip_array<R: Read + Seek>(reader: &mut BinaryReader<R>, width: u64) -> Result<()> {
    let count = reader.read_u32()? as u64;
    reader.skip(count * width)
}

/// Skip a u64-length-prefixed string
fn skip_string<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<()> {
    let len = reader.read_u64()?;
    reader.skip(len)
}

/// Skip a u32-counted list of strings
fn skip_strings<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<()> {
    let count = reader.read_u32()?;
    for _ in 0..count {
        skip_string(reader)?;
    }
    Ok(())
}

fn read_road<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<Road> {
    reader.skip(ROAD_UNMODELED_SIZE)?;
    Ok(Road {
        start_node_uid: reader.read_u64()?,
        end_node_uid: reader.read_u64()?,
        length: reader.read_f32()?,
    })
}

fn skip_terrain<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<()> {
    skip_fields(reader, TERRAIN_HEAD)?;
    for _ in 0..2 {
        skip_fields(reader, TERRAIN_SIDE)?;
        let rows = reader.read_u16()? as u64;
        let cols = reader.read_u16()? as u64;
        reader.skip(rows * cols * 4)?;
    }
    skip_fields(reader, TERRAIN_TAIL)
}

fn skip_prefab<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<()> {
    skip_fields(reader, PREFAB_HEAD)?;
    // The node count also sizes the per-node look table further on
    let nodes = reader.read_u32()? as u64;
    reader.skip(nodes * 8)?;
    skip_fields(reader, PREFAB_MIDDLE)?;
    reader.skip(nodes * 36)?;
    reader.skip(8)
}

fn skip_trigger<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<()> {
    skip_fields(reader, TRIGGER_HEAD)?;
    let actions = reader.read_u32()?;
    for _ in 0..actions {
        reader.skip(8)?;
        // A negative override count means the action has no parameters
        let overrides = reader.read_i32()?;
        if overrides < 0 {
            continue;
        }
        reader.skip(overrides as u64 * 4)?;
        skip_strings(reader)?;
        skip_fields(reader, TRIGGER_ACTION_TAIL)?;
    }
    reader.skip(24)
}

fn skip_sign<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<()> {
    skip_fields(reader, SIGN_HEAD)?;
    skip_string(reader)?;
    let overrides = reader.read_u32()?;
    for _ in 0..overrides {
        reader.skip(4 + 8)?;
        let attributes = reader.read_u32()?;
        for _ in 0..attributes {
            let offset = reader.position()?;
            let value_type = reader.read_u16()?;
            reader.skip(4)?;
            match value_type {
                0 => reader.skip(1)?,
                1..=3 => reader.skip(4)?,
                4 | 5 => reader.skip(8)?,
                6 => skip_string(reader)?,
                other => {
                    return Err(Error::invalid_item(
                        ItemType::Sign.name(),
                        offset,
                        format!("unknown attribute value type {other}"),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn skip_trajectory<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<()> {
    skip_fields(reader, TRAJECTORY_HEAD)?;
    let rules = reader.read_u32()?;
    for _ in 0..rules {
        reader.skip(8 + 4)?;
        skip_strings(reader)?;
    }
    skip_fields(reader, TRAJECTORY_TAIL)
}

fn skip_cutscene<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<()> {
    skip_fields(reader, CUTSCENE_HEAD)?;
    let actions = reader.read_u32()?;
    for _ in 0..actions {
        skip_array(reader, 4)?;
        skip_strings(reader)?;
        skip_array(reader, 8)?;
        reader.skip(4 + 4)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(data: Vec<u8>) -> BinaryReader<Cursor<Vec<u8>>> {
        BinaryReader::new(Cursor::new(data)).unwrap()
    }

    fn consumed(item_type: ItemType, data: Vec<u8>) -> Result<u64> {
        let mut r = reader(data);
        read_item(&mut r, item_type)?;
        r.position()
    }

    fn u32s(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    #[test]
    fn test_tag_mapping() {
        for tag in 0..=60 {
            if let Some(item_type) = ItemType::from_tag(tag) {
                assert_eq!(item_type.tag(), tag);
            }
        }
        assert_eq!(ItemType::from_tag(3), Some(ItemType::Road));
        assert_eq!(ItemType::from_tag(10), None);
        assert_eq!(ItemType::from_tag(49), None);
        assert_eq!(ItemType::from_tag(0), None);
    }

    #[test]
    fn test_road() {
        let mut data = vec![0u8; 192];
        data.extend_from_slice(&0x11u64.to_le_bytes());
        data.extend_from_slice(&0x22u64.to_le_bytes());
        data.extend_from_slice(&42.5f32.to_le_bytes());
        let mut r = reader(data);
        let item = read_item(&mut r, ItemType::Road).unwrap();
        assert_eq!(
            item,
            Some(SectorItem::Road(Road {
                start_node_uid: 0x11,
                end_node_uid: 0x22,
                length: 42.5,
            }))
        );
        assert_eq!(r.remaining().unwrap(), 0);
    }

    #[test]
    fn test_flat_layout_with_arrays() {
        // Cut plane: 3 nodes
        let mut data = u32s(&[3]);
        data.extend_from_slice(&[0u8; 24]);
        assert_eq!(consumed(ItemType::CutPlane, data).unwrap(), 28);

        // Service: node, prefab, 2 sub-items
        let mut data = vec![0u8; 16];
        data.extend_from_slice(&u32s(&[2]));
        data.extend_from_slice(&[0u8; 16]);
        assert_eq!(consumed(ItemType::Service, data).unwrap(), 36);
    }

    #[test]
    fn test_prefab_node_count_sizes_two_tables() {
        let mut data = vec![0u8; 24];
        data.extend_from_slice(&u32s(&[0])); // parts
        data.extend_from_slice(&u32s(&[2])); // nodes
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&u32s(&[0])); // connected items
        data.extend_from_slice(&[0u8; 8 + 2]);
        data.extend_from_slice(&[0u8; 2 * 36]);
        data.extend_from_slice(&[0u8; 8]);
        let len = data.len() as u64;
        assert_eq!(consumed(ItemType::Prefab, data).unwrap(), len);
    }

    #[test]
    fn test_terrain_quads() {
        let mut data = vec![0u8; 8 + 8 + 4 + 4 + 4];
        for (rows, cols) in [(2u16, 3u16), (0, 0)] {
            data.extend_from_slice(&[0u8; 4 + 8 + 4 + 1 + 1]);
            data.extend_from_slice(&u32s(&[0, 0, 0]));
            data.extend_from_slice(&rows.to_le_bytes());
            data.extend_from_slice(&cols.to_le_bytes());
            data.extend(std::iter::repeat_n(0u8, rows as usize * cols as usize * 4));
        }
        data.extend_from_slice(&u32s(&[1]));
        data.extend_from_slice(&[0u8; 20]);
        data.extend_from_slice(&[0u8; 16]);
        let len = data.len() as u64;
        assert_eq!(consumed(ItemType::Terrain, data).unwrap(), len);
    }

    #[test]
    fn test_trigger_negative_override_ends_action() {
        let mut data = u32s(&[0, 0]);
        data.extend_from_slice(&u32s(&[2])); // actions

        // No parameters
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&(-1i32).to_le_bytes());

        // Two overrides, one parameter string, one target tag
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&2i32.to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&u32s(&[1]));
        data.extend_from_slice(&3u64.to_le_bytes());
        data.extend_from_slice(b"abc");
        data.extend_from_slice(&u32s(&[1]));
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&[0u8; 8]);

        data.extend_from_slice(&[0u8; 24]);
        let len = data.len() as u64;
        assert_eq!(consumed(ItemType::Trigger, data).unwrap(), len);
    }

    fn sign_with_attribute(value_type: u16, value: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; 24];
        data.extend_from_slice(&u32s(&[0])); // boards
        data.extend_from_slice(&0u64.to_le_bytes()); // empty template string
        data.extend_from_slice(&u32s(&[1])); // overrides
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&u32s(&[1])); // attributes
        data.extend_from_slice(&value_type.to_le_bytes());
        data.extend_from_slice(&u32s(&[0]));
        data.extend_from_slice(value);
        data
    }

    #[test]
    fn test_sign_attribute_widths() {
        let mut text = 5u64.to_le_bytes().to_vec();
        text.extend_from_slice(b"A7 35");
        for (value_type, value) in [
            (0u16, vec![1u8]),
            (2, vec![0u8; 4]),
            (5, vec![0u8; 8]),
            (6, text),
        ] {
            let data = sign_with_attribute(value_type, &value);
            let len = data.len() as u64;
            assert_eq!(consumed(ItemType::Sign, data).unwrap(), len, "type {value_type}");
        }
    }

    #[test]
    fn test_sign_unknown_attribute_type() {
        let data = sign_with_attribute(9, &[0u8; 16]);
        match consumed(ItemType::Sign, data) {
            Err(Error::InvalidItemLayout { item, offset, .. }) => {
                assert_eq!(item, "sign");
                assert_eq!(offset, 24 + 4 + 8 + 4 + 12 + 4);
            }
            other => panic!("expected InvalidItemLayout, got {other:?}"),
        }
    }

    #[test]
    fn test_trajectory_and_cutscene() {
        let mut data = u32s(&[0, 0]);
        data.extend_from_slice(&u32s(&[1])); // rules
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&u32s(&[1]));
        data.extend_from_slice(&1u64.to_le_bytes());
        data.push(b'x');
        data.extend_from_slice(&u32s(&[1]));
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&u32s(&[0]));
        let len = data.len() as u64;
        assert_eq!(consumed(ItemType::Trajectory, data).unwrap(), len);

        let mut data = u32s(&[0]);
        data.extend_from_slice(&[0u8; 12]);
        data.extend_from_slice(&u32s(&[1])); // actions
        data.extend_from_slice(&u32s(&[1, 0]));
        data.extend_from_slice(&u32s(&[0, 0, 0, 0]));
        let len = data.len() as u64;
        assert_eq!(consumed(ItemType::Cutscene, data).unwrap(), len);
    }

    #[test]
    fn test_truncated_array_is_eof() {
        let mut data = u32s(&[1000]);
        data.extend_from_slice(&[0u8; 8]);
        assert!(matches!(
            consumed(ItemType::CutPlane, data),
            Err(Error::UnexpectedEof { .. })
        ));
    }
}
