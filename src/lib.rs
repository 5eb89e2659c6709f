#![cfg_attr(docsrs, feature(doc_cfg))]
//! Per-entity simulation core of a voxel-world game server.
//!
//! Each world tick advances entities through the physics integrator and the
//! status effect ticker, resolves damage on demand and decides which state
//! changes observers need to hear about. World storage, the wire encoding
//! and the plugin layer stay outside and are reached through the
//! [`SpatialQuery`], [`WorldEvents`] and [`EntityHooks`] traits.
pub mod block;
pub mod config;
pub mod constants;
pub mod damage;
pub mod entity;
pub mod events;
pub mod grid;
pub mod ids;
pub mod items;
pub mod logging;
pub mod numeric;
pub mod physics;
pub mod protocol;
pub mod replication;
pub mod spatial;
pub mod status;
pub mod tracer;
pub mod vector_math;
pub mod vehicle;
pub mod world_handle;
pub use constants::*;

// Re-export commonly used items
pub use block::{BlockFace, BlockPos, BlockType, ChunkCoord, FlowDirection};
pub use config::{ConfigError, SimConfig};
pub use damage::{AttackerInfo, DamageOutcome, DamageType, TakeDamageInfo};
pub use entity::{
    Attachable, Damageable, Entity, EntityKind, Lifecycle, LootSource, MobState, PlayerState,
    Tickable,
};
pub use events::{
    ClientId, EntityHooks, HookResult, NoHooks, Proceed, SimContext, Vetoed, WorldEvents,
};
pub use grid::BlockGrid;
pub use ids::{next_entity_id, EntityId};
pub use items::{Equipment, Item, ItemStack, MinecartKind};
pub use logging::init as init_logging;
pub use physics::{applied_acceleration, StepOutcome};
pub use protocol::{EntityPacket, KindTag};
pub use replication::broadcast_movement_update;
pub use spatial::{Chunk, SpatialQuery, TraceHit};
pub use vehicle::{PlaceOutcome, PlaceRejection};
pub use world_handle::{AttachError, LifecycleError, SpawnError, WorldHandle};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use voxsim::prelude::*;
    //! ```

    pub use crate::{
        BlockGrid, BlockType, ChunkCoord, Entity, EntityKind, NoHooks, SimConfig, SimContext,
        WorldEvents, WorldHandle,
    };
    pub use glam::DVec3;
}
