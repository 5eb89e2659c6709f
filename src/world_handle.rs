//! Owning arena for live entities.
//!
//! The world loop holds one [`WorldHandle`]. It registers entities when they
//! spawn, ticks them in id order, keeps attachment links mutual and hands
//! entities back only once they have been destroyed.

use glam::DVec3;
use hashbrown::HashMap;
use log::{debug, warn};
use thiserror::Error;

use crate::damage::{self, AttackerInfo, DamageOutcome, DamageType};
use crate::entity::{Damageable, Entity, Tickable};
use crate::events::{ClientId, SimContext};
use crate::ids::EntityId;
use crate::protocol::{wire_vec, EntityPacket};
use crate::replication;
use crate::spatial::{Chunk, SpatialQuery};

/// Why an entity could not be spawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    /// The spawning hook cancelled the spawn; the entity stays pending and
    /// is discarded.
    #[error("spawn of entity {0} vetoed by a hook")]
    Vetoed(EntityId),
}

/// Misuse of an entity's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// No entity with this id is registered.
    #[error("entity {0} is not registered")]
    Unknown(EntityId),
    /// The entity must be destroyed before it can be released.
    #[error("entity {0} is still live")]
    StillLive(EntityId),
    /// The entity was already destroyed.
    #[error("entity {0} has been destroyed")]
    Destroyed(EntityId),
}

/// Why an attachment was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AttachError {
    /// An entity cannot ride itself.
    #[error("entity {0} cannot be attached to itself")]
    SelfAttachment(EntityId),
    /// The mount already rides, directly or through others, on the rider.
    #[error("attaching {rider} to {mount} would form a cycle")]
    WouldCycle {
        /// Entity asked to ride.
        rider: EntityId,
        /// Entity asked to carry it.
        mount: EntityId,
    },
    /// Either side is missing or destroyed.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Registry of spawned entities keyed by id.
#[derive(Debug, Default)]
pub struct WorldHandle {
    entities: HashMap<EntityId, Entity>,
}

impl WorldHandle {
    /// Creates an empty arena.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxsim::WorldHandle;
    /// let world = WorldHandle::new();
    /// assert!(world.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered entities, destroyed ones included until reaped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Registered entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable access to a registered entity.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Ids of every registered entity in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.entities.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of live entities in ascending order.
    #[must_use]
    pub fn live_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.is_live())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    fn live(&self, id: EntityId) -> Result<&Entity, LifecycleError> {
        let entity = self.entities.get(&id).ok_or(LifecycleError::Unknown(id))?;
        if entity.is_destroyed() {
            return Err(LifecycleError::Destroyed(id));
        }
        Ok(entity)
    }

    fn live_mut(&mut self, id: EntityId) -> Result<&mut Entity, LifecycleError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(LifecycleError::Unknown(id))?;
        if entity.is_destroyed() {
            return Err(LifecycleError::Destroyed(id));
        }
        Ok(entity)
    }

    // ----- lifecycle -----

    /// Initialises a pending entity and takes ownership of it.
    ///
    /// The spawning hook may cancel; otherwise the entity becomes live, is
    /// announced to every observer and the spawned hook runs.
    ///
    /// # Errors
    ///
    /// [`SpawnError::Vetoed`] when the spawning hook refuses the entity.
    pub fn spawn(
        &mut self,
        mut entity: Entity,
        ctx: &mut SimContext<'_>,
    ) -> Result<EntityId, SpawnError> {
        let id = entity.id();
        if ctx.hooks.spawning(&entity).is_err() {
            debug!("spawn of entity {id} vetoed");
            return Err(SpawnError::Vetoed(id));
        }
        entity.mark_live(ctx.world_age(), ctx.config);
        ctx.broadcast(EntityPacket::Spawn {
            entity: id,
            kind: entity.tag(),
            position: wire_vec(entity.position()),
            yaw: entity.yaw(),
            pitch: entity.pitch(),
        });
        self.entities.insert(id, entity);
        if let Some(registered) = self.entities.get(&id) {
            ctx.hooks.spawned(registered);
        }
        debug!("entity {id} spawned");
        Ok(id)
    }

    /// Destroys an entity, detaching it from its mount and its rider.
    ///
    /// Destroying an already destroyed entity does nothing. The entity stays
    /// registered until [`WorldHandle::remove`] or [`WorldHandle::reap`].
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Unknown`] when no such entity is registered.
    pub fn destroy(
        &mut self,
        id: EntityId,
        broadcast: bool,
        ctx: &mut SimContext<'_>,
    ) -> Result<(), LifecycleError> {
        let entity = self.entities.get(&id).ok_or(LifecycleError::Unknown(id))?;
        if entity.is_destroyed() {
            return Ok(());
        }
        if let Some(rider) = entity.attachee {
            self.unlink(rider, ctx);
        }
        self.unlink(id, ctx);
        if let Some(destroyed) = self.entities.get_mut(&id) {
            destroyed.mark_destroyed();
        }
        if broadcast {
            ctx.broadcast(EntityPacket::Destroy { entity: id });
        }
        debug!("entity {id} destroyed");
        Ok(())
    }

    /// Releases a destroyed entity from the arena.
    ///
    /// # Errors
    ///
    /// [`LifecycleError::Unknown`] for unregistered ids and
    /// [`LifecycleError::StillLive`] when the entity has not been destroyed.
    pub fn remove(&mut self, id: EntityId) -> Result<Entity, LifecycleError> {
        let entity = self.entities.get(&id).ok_or(LifecycleError::Unknown(id))?;
        if entity.is_live() {
            return Err(LifecycleError::StillLive(id));
        }
        self.entities.remove(&id).ok_or(LifecycleError::Unknown(id))
    }

    /// Drops every destroyed entity and returns their ids in ascending order.
    pub fn reap(&mut self) -> Vec<EntityId> {
        let mut reaped: Vec<_> = self
            .entities
            .iter()
            .filter(|(_, entity)| entity.is_destroyed())
            .map(|(id, _)| *id)
            .collect();
        reaped.sort_unstable();
        for id in &reaped {
            self.entities.remove(id);
        }
        reaped
    }

    /// Destroys every live entity without announcing it and empties the
    /// arena. Returns how many entities were released.
    pub fn shutdown(&mut self, ctx: &mut SimContext<'_>) -> usize {
        for id in self.live_ids() {
            if let Err(err) = self.destroy(id, false, ctx) {
                warn!("shutdown: {err}");
            }
        }
        self.reap().len()
    }

    // ----- attachment -----

    /// Makes `rider` ride `mount`.
    ///
    /// Re-attaching to the current mount is a no-op. A rider on another
    /// mount is detached first, and so is any other rider of `mount`.
    ///
    /// # Errors
    ///
    /// [`AttachError::SelfAttachment`] when both ids match,
    /// [`AttachError::WouldCycle`] when `mount` already rides on `rider`,
    /// and [`AttachError::Lifecycle`] when either entity is missing or
    /// destroyed.
    pub fn attach(
        &mut self,
        rider: EntityId,
        mount: EntityId,
        ctx: &mut SimContext<'_>,
    ) -> Result<(), AttachError> {
        if rider == mount {
            return Err(AttachError::SelfAttachment(rider));
        }
        let current = self.live(rider)?.attached_to;
        let previous_rider = self.live(mount)?.attachee;
        if current == Some(mount) {
            return Ok(());
        }
        if self.rides_on(mount, rider) {
            return Err(AttachError::WouldCycle { rider, mount });
        }
        if current.is_some() {
            self.unlink(rider, ctx);
        }
        if let Some(previous) = previous_rider {
            self.unlink(previous, ctx);
        }
        if let Some(entity) = self.entities.get_mut(&rider) {
            entity.attached_to = Some(mount);
        }
        if let Some(entity) = self.entities.get_mut(&mount) {
            entity.attachee = Some(rider);
        }
        ctx.broadcast(EntityPacket::Attach {
            entity: rider,
            vehicle: Some(mount),
        });
        debug!("entity {rider} attached to {mount}");
        Ok(())
    }

    /// Makes `rider` leave its mount. Does nothing when it rides nothing.
    ///
    /// # Errors
    ///
    /// [`LifecycleError`] when the rider is missing or destroyed.
    pub fn detach(
        &mut self,
        rider: EntityId,
        ctx: &mut SimContext<'_>,
    ) -> Result<(), LifecycleError> {
        self.live(rider)?;
        self.unlink(rider, ctx);
        Ok(())
    }

    /// Clears both links of `rider`'s attachment and announces the dismount.
    fn unlink(&mut self, rider: EntityId, ctx: &mut SimContext<'_>) {
        let Some(mount) = self
            .entities
            .get_mut(&rider)
            .and_then(|entity| entity.attached_to.take())
        else {
            return;
        };
        if let Some(entity) = self.entities.get_mut(&mount) {
            if entity.attachee == Some(rider) {
                entity.attachee = None;
            }
        }
        ctx.broadcast(EntityPacket::Attach {
            entity: rider,
            vehicle: None,
        });
        debug!("entity {rider} detached from {mount}");
    }

    /// Whether following `attached_to` links from `from` reaches `target`.
    fn rides_on(&self, from: EntityId, target: EntityId) -> bool {
        let mut current = self.entities.get(&from).and_then(|e| e.attached_to);
        for _ in 0..self.entities.len() {
            match current {
                Some(id) if id == target => return true,
                Some(id) => current = self.entities.get(&id).and_then(|e| e.attached_to),
                None => return false,
            }
        }
        false
    }

    // ----- simulation -----

    /// Advances every live entity by `dt_ms` milliseconds in id order.
    ///
    /// Riders receive their mount's position as it stood when their turn
    /// came.
    pub fn tick(&mut self, dt_ms: f64, world: &dyn SpatialQuery, ctx: &mut SimContext<'_>) {
        for id in self.live_ids() {
            let mount = self
                .entities
                .get(&id)
                .and_then(|entity| entity.attached_to)
                .and_then(|mount| self.entities.get(&mount))
                .map(Entity::position);
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            let chunk = Chunk::containing(world, entity.position());
            entity.tick(dt_ms, &chunk, mount, ctx);
        }
    }

    /// Runs the replication scheduler for every live entity.
    ///
    /// A player's own client is skipped for its updates; it predicts its
    /// own movement.
    pub fn broadcast_movement_updates(&mut self, ctx: &mut SimContext<'_>) {
        for id in self.live_ids() {
            if let Some(entity) = self.entities.get_mut(&id) {
                let exclude = own_client(entity);
                replication::broadcast_movement_update(entity, ctx, exclude);
            }
        }
    }

    /// Runs one entity's replication scheduler.
    ///
    /// # Errors
    ///
    /// [`LifecycleError`] when the entity is missing or destroyed.
    pub fn broadcast_movement_update(
        &mut self,
        id: EntityId,
        ctx: &mut SimContext<'_>,
    ) -> Result<(), LifecycleError> {
        let entity = self.live_mut(id)?;
        let exclude = own_client(entity);
        replication::broadcast_movement_update(entity, ctx, exclude);
        Ok(())
    }

    /// Teleports an entity onto another entity's position.
    ///
    /// # Errors
    ///
    /// [`LifecycleError`] when either entity is missing or destroyed.
    pub fn teleport_to_entity(
        &mut self,
        id: EntityId,
        target: EntityId,
        ctx: &mut SimContext<'_>,
    ) -> Result<(), LifecycleError> {
        let destination = self.live(target)?.position();
        self.teleport_to(id, destination, ctx)
    }

    /// Teleports an entity to `position`.
    ///
    /// # Errors
    ///
    /// [`LifecycleError`] when the entity is missing or destroyed.
    pub fn teleport_to(
        &mut self,
        id: EntityId,
        position: DVec3,
        ctx: &mut SimContext<'_>,
    ) -> Result<(), LifecycleError> {
        self.live_mut(id)?.teleport_to(position, ctx);
        Ok(())
    }

    // ----- combat -----

    /// Damages `target`, attributing the hit to `attacker` when given.
    ///
    /// # Errors
    ///
    /// [`LifecycleError`] when either entity is missing or destroyed.
    pub fn take_damage(
        &mut self,
        target: EntityId,
        kind: DamageType,
        attacker: Option<EntityId>,
        raw_damage: i32,
        knockback_amount: f64,
        ctx: &mut SimContext<'_>,
    ) -> Result<DamageOutcome, LifecycleError> {
        let source = attacker
            .map(|id| self.live(id).map(AttackerInfo::of))
            .transpose()?;
        let entity = self.live_mut(target)?;
        Ok(entity.take_damage(kind, source.as_ref(), raw_damage, knockback_amount, ctx))
    }

    /// Melee hit of `attacker` on `target` with the attacker's held item.
    ///
    /// # Errors
    ///
    /// [`LifecycleError`] when either entity is missing or destroyed.
    pub fn attack(
        &mut self,
        attacker: EntityId,
        target: EntityId,
        ctx: &mut SimContext<'_>,
    ) -> Result<DamageOutcome, LifecycleError> {
        let info = AttackerInfo::of(self.live(attacker)?);
        let entity = self.live_mut(target)?;
        Ok(damage::melee_attack(&info, entity, ctx))
    }
}

fn own_client(entity: &Entity) -> Option<ClientId> {
    entity.kind().as_player().and_then(|player| player.client)
}

impl Drop for WorldHandle {
    fn drop(&mut self) {
        for (id, entity) in &mut self.entities {
            if entity.is_live() {
                warn!("entity {id} still live when the world was dropped");
                entity.mark_destroyed();
            }
        }
    }
}
