//! Sparse in-memory block store implementing [`SpatialQuery`].
//!
//! Used by the demo binary and tests. Chunks must be loaded explicitly; a
//! loaded chunk answers [`BlockType::Air`] for every block that was never
//! set.

use hashbrown::{HashMap, HashSet};

use crate::block::{BlockPos, BlockType, ChunkCoord, FlowDirection};
use crate::spatial::SpatialQuery;
use crate::CHUNK_WIDTH;

/// Sparse block grid.
#[derive(Debug, Clone, Default)]
pub struct BlockGrid {
    loaded: HashSet<ChunkCoord>,
    blocks: HashMap<BlockPos, BlockType>,
    flows: HashMap<BlockPos, FlowDirection>,
}

impl BlockGrid {
    /// Creates an empty grid with no chunks loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a chunk column as loaded.
    pub fn load_chunk(&mut self, chunk: ChunkCoord) {
        self.loaded.insert(chunk);
    }

    /// Marks a chunk column as unloaded. Its blocks are kept.
    pub fn unload_chunk(&mut self, chunk: ChunkCoord) {
        self.loaded.remove(&chunk);
    }

    /// Sets a block; setting [`BlockType::Air`] clears the entry.
    pub fn set_block(&mut self, pos: impl Into<BlockPos>, block: BlockType) {
        let cell = pos.into();
        if block == BlockType::Air {
            self.blocks.remove(&cell);
        } else {
            self.blocks.insert(cell, block);
        }
    }

    /// Sets or clears the flow direction of a fluid cell.
    pub fn set_flow(&mut self, pos: impl Into<BlockPos>, flow: Option<FlowDirection>) {
        let cell = pos.into();
        match flow {
            Some(direction) => {
                self.flows.insert(cell, direction);
            }
            None => {
                self.flows.remove(&cell);
            }
        }
    }

    /// Fills the horizontal layer `y` of a chunk column with `block`.
    pub fn fill_layer(&mut self, chunk: ChunkCoord, y: i32, block: BlockType) {
        let base_x = chunk.x * CHUNK_WIDTH;
        let base_z = chunk.z * CHUNK_WIDTH;
        for x in base_x..base_x + CHUNK_WIDTH {
            for z in base_z..base_z + CHUNK_WIDTH {
                self.set_block(BlockPos::new(x, y, z), block);
            }
        }
    }
}

impl SpatialQuery for BlockGrid {
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool {
        self.loaded.contains(&chunk)
    }

    fn block_at(&self, pos: BlockPos) -> Option<BlockType> {
        if !self.loaded.contains(&pos.chunk()) {
            return None;
        }
        Some(self.blocks.get(&pos).copied().unwrap_or_default())
    }

    fn flow_direction(&self, pos: BlockPos) -> Option<FlowDirection> {
        if !self.loaded.contains(&pos.chunk()) {
            return None;
        }
        self.flows.get(&pos).copied()
    }
}
