//! Riding-related actions: steering a mount and placing minecarts on rails.

use glam::DVec3;
use log::debug;

use crate::block::{BlockFace, BlockPos};
use crate::entity::{Entity, EntityKind};
use crate::events::SimContext;
use crate::ids::EntityId;
use crate::items::Item;
use crate::spatial::SpatialQuery;
use crate::world_handle::{LifecycleError, SpawnError, WorldHandle};

/// Result of using a minecart item on a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// A minecart was spawned.
    Placed {
        /// The new minecart.
        minecart: EntityId,
        /// Whether the user's held item should be decremented.
        consume_item: bool,
    },
    /// Nothing was spawned.
    Rejected(PlaceRejection),
}

/// Why a minecart item did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceRejection {
    /// The click did not land on a block face.
    NoFace,
    /// The item is not a minecart.
    NotAMinecart,
    /// The clicked block is not a rail, or its chunk is not loaded.
    NotRail,
    /// The spawning hook cancelled the minecart.
    Vetoed,
}

impl WorldHandle {
    /// Applies a rider's steering input to the entity it rides.
    ///
    /// The mount's velocity is replaced by the rider's horizontal look
    /// direction scaled by `forward`, plus the perpendicular scaled by
    /// `sideways`, and the mount's movement update goes out at once.
    /// Neutral input leaves the mount alone. Returns `false` when the rider
    /// rides nothing.
    ///
    /// # Errors
    ///
    /// [`LifecycleError`] when the rider or its mount is missing or
    /// destroyed.
    pub fn steer_vehicle(
        &mut self,
        rider: EntityId,
        forward: f64,
        sideways: f64,
        ctx: &mut SimContext<'_>,
    ) -> Result<bool, LifecycleError> {
        let entity = self.get(rider).ok_or(LifecycleError::Unknown(rider))?;
        if entity.is_destroyed() {
            return Err(LifecycleError::Destroyed(rider));
        }
        let Some(mount) = entity.attached_to else {
            return Ok(false);
        };
        if forward == 0.0 && sideways == 0.0 {
            return Ok(true);
        }
        let look = entity.look_vector();
        let vehicle = self
            .get_mut(mount)
            .ok_or(LifecycleError::Unknown(mount))?;
        vehicle.set_velocity(steering_velocity(look, forward, sideways));
        self.broadcast_movement_update(mount, ctx)?;
        Ok(true)
    }

    /// Uses a minecart item on the block at `target`.
    ///
    /// On a rail the matching minecart spawns centred on the block; the
    /// item is consumed unless `user` is a creative-mode player.
    ///
    /// # Errors
    ///
    /// [`LifecycleError`] when `user` is missing or destroyed.
    pub fn use_minecart_item(
        &mut self,
        user: EntityId,
        item: Item,
        target: BlockPos,
        face: Option<BlockFace>,
        world: &dyn SpatialQuery,
        ctx: &mut SimContext<'_>,
    ) -> Result<PlaceOutcome, LifecycleError> {
        let creative = creative_user(self.get(user).ok_or(LifecycleError::Unknown(user))?);
        if face.is_none() {
            return Ok(PlaceOutcome::Rejected(PlaceRejection::NoFace));
        }
        let Item::Minecart(kind) = item else {
            return Ok(PlaceOutcome::Rejected(PlaceRejection::NotAMinecart));
        };
        if !world.block_at(target).is_some_and(|block| block.is_rail()) {
            return Ok(PlaceOutcome::Rejected(PlaceRejection::NotRail));
        }

        let cart = Entity::new(EntityKind::Minecart(kind), target.center());
        match self.spawn(cart, ctx) {
            Ok(minecart) => Ok(PlaceOutcome::Placed {
                minecart,
                consume_item: !creative,
            }),
            Err(SpawnError::Vetoed(id)) => {
                debug!("minecart {id} placed by {user} was vetoed");
                Ok(PlaceOutcome::Rejected(PlaceRejection::Vetoed))
            }
        }
    }
}

fn creative_user(entity: &Entity) -> bool {
    entity
        .kind()
        .as_player()
        .is_some_and(|player| player.creative)
}

/// Horizontal velocity produced by steering input along `look`.
const fn steering_velocity(look: DVec3, forward: f64, sideways: f64) -> DVec3 {
    DVec3::new(
        look.x * forward + look.z * sideways,
        0.0,
        look.z * forward - look.x * sideways,
    )
}
