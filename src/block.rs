//! Block types and integer coordinates of the voxel grid.
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::numeric::floor_to_i32;
use crate::CHUNK_WIDTH;

/// Block types the simulation core distinguishes.
///
/// Anything the core has no special behaviour for is carried as
/// [`BlockType::Other`] and treated as solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockType {
    /// Empty space.
    #[default]
    Air,
    /// Plain solid rock.
    Stone,
    /// Solid soil.
    Dirt,
    /// Solid soil with grass on top.
    Grass,
    /// Flowing water.
    Water,
    /// Source water.
    StationaryWater,
    /// Flowing lava.
    Lava,
    /// Source lava.
    StationaryLava,
    /// Fire.
    Fire,
    /// Slows anything passing through.
    Cobweb,
    /// Plain minecart rail.
    Rail,
    /// Powered rail.
    PoweredRail,
    /// Detector rail.
    DetectorRail,
    /// Activator rail.
    ActivatorRail,
    /// Any other block, identified by its numeric type.
    Other(u8),
}

impl BlockType {
    /// Whether entities collide with this block.
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(
            self,
            Self::Stone | Self::Dirt | Self::Grass | Self::Other(_)
        )
    }

    /// Whether the block is flowing or source water.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::Water | Self::StationaryWater)
    }

    /// Whether the block is flowing or source lava.
    #[must_use]
    pub const fn is_lava(self) -> bool {
        matches!(self, Self::Lava | Self::StationaryLava)
    }

    /// Whether a minecart may be placed on this block.
    #[must_use]
    pub const fn is_rail(self) -> bool {
        matches!(
            self,
            Self::Rail | Self::PoweredRail | Self::DetectorRail | Self::ActivatorRail
        )
    }
}

/// Integer coordinate of a block in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Creates a block coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block containing a world-space position.
    #[must_use]
    pub fn containing(position: DVec3) -> Self {
        Self {
            x: floor_to_i32(position.x),
            y: floor_to_i32(position.y),
            z: floor_to_i32(position.z),
        }
    }

    /// Returns this coordinate moved by the given deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            z: self.z.wrapping_add(dz),
        }
    }

    /// The chunk column that contains this block.
    #[must_use]
    pub const fn chunk(self) -> ChunkCoord {
        ChunkCoord::of_block(self.x, self.z)
    }

    /// Centre of the block in world space.
    #[must_use]
    pub fn center(self) -> DVec3 {
        DVec3::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }
}

impl From<(i32, i32, i32)> for BlockPos {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self { x, y, z }
    }
}

/// Horizontal coordinate of a chunk column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    /// Chunk index along X.
    pub x: i32,
    /// Chunk index along Z.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk column containing the block column `(block_x, block_z)`.
    #[must_use]
    pub const fn of_block(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x.div_euclid(CHUNK_WIDTH),
            z: block_z.div_euclid(CHUNK_WIDTH),
        }
    }

    /// The chunk column containing a world-space position.
    #[must_use]
    pub fn of_position(position: DVec3) -> Self {
        Self::of_block(floor_to_i32(position.x), floor_to_i32(position.z))
    }
}

/// Cardinal direction of a flowing fluid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowDirection {
    /// Flowing towards +X.
    XPlus,
    /// Flowing towards -X.
    XMinus,
    /// Flowing towards +Z.
    ZPlus,
    /// Flowing towards -Z.
    ZMinus,
}

/// Face of a block that was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockFace {
    /// Bottom face.
    Bottom,
    /// Top face.
    Top,
    /// North face (-Z).
    North,
    /// South face (+Z).
    South,
    /// West face (-X).
    West,
    /// East face (+X).
    East,
}
