//! Small worlds and entity constructors.

use glam::DVec3;
use voxsim::{BlockGrid, BlockType, ChunkCoord, Entity, EntityKind};

/// Height of the stone floor laid by [`flat_world`].
pub const FLOOR_Y: i32 = 63;

/// A 5×5 grid of loaded chunk columns around the origin with a stone floor
/// at [`FLOOR_Y`].
///
/// # Examples
/// ```
/// use test_utils::{flat_world, FLOOR_Y};
/// use voxsim::{BlockPos, BlockType, SpatialQuery};
/// let grid = flat_world();
/// assert_eq!(grid.block_at(BlockPos::new(0, FLOOR_Y, 0)), Some(BlockType::Stone));
/// ```
pub fn flat_world() -> BlockGrid {
    let mut grid = BlockGrid::new();
    for x in -2..=2 {
        for z in -2..=2 {
            let chunk = ChunkCoord::new(x, z);
            grid.load_chunk(chunk);
            grid.fill_layer(chunk, FLOOR_Y, BlockType::Stone);
        }
    }
    grid
}

/// A pending mob at `position`.
pub fn mob_at(position: DVec3) -> Entity {
    Entity::new(EntityKind::mob(), position)
}

/// A pending player at `position`.
pub fn player_at(position: DVec3) -> Entity {
    Entity::new(EntityKind::player(), position)
}
