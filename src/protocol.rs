//! Entity update messages handed to the world's broadcaster.
//!
//! These describe *what* observers must learn; encoding them into bytes is
//! the network layer's job. Positions are absolute world coordinates, angles
//! are degrees and relative moves are 1/32-block fixed-point deltas.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::ids::EntityId;
use crate::items::MinecartKind;

/// Coarse entity type announced to clients when an entity appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindTag {
    /// A connected player.
    Player,
    /// A mob.
    Mob,
    /// A dropped item.
    Pickup,
    /// A minecart.
    Minecart(MinecartKind),
    /// Anything else.
    Other,
}

/// Entity status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityStatus {
    /// The entity took damage.
    Hurt,
    /// The entity died.
    Dead,
}

/// One-shot entity animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Animation {
    /// Particles of a critical hit around the target.
    CriticalHit,
}

/// Entity flags carried by the metadata packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MetadataFlags {
    /// The entity is burning.
    pub on_fire: bool,
    /// The entity is sneaking.
    pub crouched: bool,
    /// The entity is sprinting.
    pub sprinting: bool,
    /// The entity rides another entity.
    pub riding: bool,
}

/// A single entity update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "packet", rename_all = "snake_case")]
pub enum EntityPacket {
    /// The entity appeared.
    Spawn {
        /// Subject.
        entity: EntityId,
        /// What kind of entity it is.
        kind: KindTag,
        /// Absolute position.
        position: [f64; 3],
        /// Yaw in degrees.
        yaw: f64,
        /// Pitch in degrees.
        pitch: f64,
    },
    /// The entity is gone.
    Destroy {
        /// Subject.
        entity: EntityId,
    },
    /// A status code.
    Status {
        /// Subject.
        entity: EntityId,
        /// What happened.
        status: EntityStatus,
    },
    /// A one-shot animation.
    Animation {
        /// Subject.
        entity: EntityId,
        /// Which animation.
        animation: Animation,
    },
    /// Entity flags changed.
    Metadata {
        /// Subject.
        entity: EntityId,
        /// Current flags.
        flags: MetadataFlags,
    },
    /// New velocity in blocks per second.
    Velocity {
        /// Subject.
        entity: EntityId,
        /// Velocity vector.
        velocity: [f64; 3],
    },
    /// Absolute position and orientation.
    Teleport {
        /// Subject.
        entity: EntityId,
        /// Absolute position.
        position: [f64; 3],
        /// Yaw in degrees.
        yaw: f64,
        /// Pitch in degrees.
        pitch: f64,
    },
    /// Fixed-point position delta.
    RelMove {
        /// Subject.
        entity: EntityId,
        /// Delta in 1/32 blocks.
        delta: [i8; 3],
    },
    /// Fixed-point position delta with orientation.
    RelMoveLook {
        /// Subject.
        entity: EntityId,
        /// Delta in 1/32 blocks.
        delta: [i8; 3],
        /// Yaw in degrees.
        yaw: f64,
        /// Pitch in degrees.
        pitch: f64,
    },
    /// Orientation only.
    Look {
        /// Subject.
        entity: EntityId,
        /// Yaw in degrees.
        yaw: f64,
        /// Pitch in degrees.
        pitch: f64,
    },
    /// Head orientation.
    HeadLook {
        /// Subject.
        entity: EntityId,
        /// Head yaw in degrees.
        head_yaw: f64,
    },
    /// The entity mounted or left a vehicle.
    Attach {
        /// The rider.
        entity: EntityId,
        /// The vehicle, or `None` when dismounting.
        vehicle: Option<EntityId>,
    },
}

impl EntityPacket {
    /// The entity the packet is about.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        match self {
            Self::Spawn { entity, .. }
            | Self::Destroy { entity }
            | Self::Status { entity, .. }
            | Self::Animation { entity, .. }
            | Self::Metadata { entity, .. }
            | Self::Velocity { entity, .. }
            | Self::Teleport { entity, .. }
            | Self::RelMove { entity, .. }
            | Self::RelMoveLook { entity, .. }
            | Self::Look { entity, .. }
            | Self::HeadLook { entity, .. }
            | Self::Attach { entity, .. } => *entity,
        }
    }
}

/// Converts a vector into the array form carried by packets.
#[must_use]
pub const fn wire_vec(v: DVec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}
