//! Read-only view of the voxel world consumed by the simulation core.
//!
//! Storage, generation and chunk streaming live elsewhere; the core only
//! asks questions through [`SpatialQuery`]. Every lookup is fallible: an
//! unloaded chunk answers `None` rather than blocking, and callers treat
//! that as "try again next tick".

use glam::DVec3;

use crate::block::{BlockPos, BlockType, ChunkCoord, FlowDirection};
use crate::tracer;

/// First solid surface found along a traced ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    /// Point where the ray entered the solid block.
    pub position: DVec3,
    /// Outward normal of the face that was hit; one axis is ±1.
    pub normal: DVec3,
    /// The block that stopped the ray.
    pub block: BlockPos,
}

/// Block and chunk lookups answered by the world's storage layer.
#[cfg_attr(test, mockall::automock)]
pub trait SpatialQuery {
    /// Whether the chunk column is loaded and valid.
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool;

    /// Block at `pos`, or `None` when its chunk is not loaded.
    ///
    /// Positions outside the vertical world range answer `Some(Air)` when
    /// the column is loaded.
    fn block_at(&self, pos: BlockPos) -> Option<BlockType>;

    /// Direction the fluid at `pos` flows in, if any.
    fn flow_direction(&self, pos: BlockPos) -> Option<FlowDirection>;

    /// Casts a ray of at most `max_distance` blocks from `start` along
    /// `direction` and reports the first solid block it enters.
    fn trace(&self, start: DVec3, direction: DVec3, max_distance: f64) -> Option<TraceHit> {
        tracer::trace(self, start, direction, max_distance)
    }
}

/// A chunk column as seen by a ticking entity.
///
/// Lookups are unbounded: a block in a neighbouring column is answered
/// through the same query as long as that column is loaded.
#[derive(Clone, Copy)]
pub struct Chunk<'w> {
    query: &'w dyn SpatialQuery,
    coord: ChunkCoord,
}

impl<'w> Chunk<'w> {
    /// Wraps the column at `coord`.
    #[must_use]
    pub const fn new(query: &'w dyn SpatialQuery, coord: ChunkCoord) -> Self {
        Self { query, coord }
    }

    /// The column containing a world-space position.
    #[must_use]
    pub fn containing(query: &'w dyn SpatialQuery, position: DVec3) -> Self {
        Self::new(query, ChunkCoord::of_position(position))
    }

    /// Coordinate of the column.
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Whether the column is loaded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.query.is_chunk_loaded(self.coord)
    }

    /// The loaded column that contains the block column `(block_x, block_z)`.
    #[must_use]
    pub fn neighbor_chunk(&self, block_x: i32, block_z: i32) -> Option<Self> {
        let coord = ChunkCoord::of_block(block_x, block_z);
        self.query
            .is_chunk_loaded(coord)
            .then_some(Self::new(self.query, coord))
    }

    /// Block at `pos`, or `None` when its column is not loaded.
    #[must_use]
    pub fn block_at(&self, pos: BlockPos) -> Option<BlockType> {
        self.query.block_at(pos)
    }

    /// Fluid flow at `pos`.
    #[must_use]
    pub fn flow_direction(&self, pos: BlockPos) -> Option<FlowDirection> {
        self.query.flow_direction(pos)
    }

    /// Traces a ray through the world; see [`SpatialQuery::trace`].
    #[must_use]
    pub fn trace(&self, start: DVec3, direction: DVec3, max_distance: f64) -> Option<TraceHit> {
        self.query.trace(start, direction, max_distance)
    }
}

impl std::fmt::Debug for Chunk<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk").field("coord", &self.coord).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    #[test]
    fn neighbor_chunk_requires_loaded_column() {
        let mut query = MockSpatialQuery::new();
        query
            .expect_is_chunk_loaded()
            .with(eq(ChunkCoord::new(1, 0)))
            .return_const(true);
        query
            .expect_is_chunk_loaded()
            .with(eq(ChunkCoord::new(-1, 0)))
            .return_const(false);
        let chunk = Chunk::new(&query, ChunkCoord::new(0, 0));
        assert_eq!(
            chunk.neighbor_chunk(17, 3).map(|c| c.coord()),
            Some(ChunkCoord::new(1, 0))
        );
        assert!(chunk.neighbor_chunk(-1, 3).is_none());
    }
}
