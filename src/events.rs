//! Collaborators the simulation core calls out to: the world's broadcaster
//! and the plugin hook layer.
//!
//! Both are passed in per call through [`SimContext`]; the core never holds
//! on to them between ticks.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::damage::TakeDamageInfo;
use crate::entity::Entity;
use crate::ids::EntityId;
use crate::items::ItemStack;
use crate::protocol::EntityPacket;

/// Identifier of a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u32);

/// Outbound side of the world: time, broadcasts and item spawning.
#[cfg_attr(test, mockall::automock)]
pub trait WorldEvents {
    /// Ticks elapsed since the world started.
    fn world_age(&self) -> u64;

    /// Sends `packet` to every observer of the entity except `exclude`.
    fn broadcast(&mut self, packet: EntityPacket, exclude: Option<ClientId>);

    /// Spawns pickup entities for `items` around `position`.
    fn spawn_item_pickups(&mut self, items: &[ItemStack], position: DVec3);
}

/// Marker returned by a hook that lets the operation continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Proceed;

/// Marker returned by a hook that cancels the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("operation vetoed by a hook")]
pub struct Vetoed;

/// Outcome of a cancellable hook.
pub type HookResult = Result<Proceed, Vetoed>;

/// Plugin callbacks around entity lifecycle and damage.
///
/// Every method has a permissive default so implementors only override the
/// events they care about.
#[cfg_attr(test, mockall::automock)]
pub trait EntityHooks {
    /// Called before an entity becomes live; a veto keeps it pending.
    fn spawning(&mut self, _entity: &Entity) -> HookResult {
        Ok(Proceed)
    }

    /// Called once the entity is live and announced.
    fn spawned(&mut self, _entity: &Entity) {}

    /// Called before damage is applied. The hook may rewrite `info`.
    fn take_damage(&mut self, _entity: &Entity, _info: &mut TakeDamageInfo) -> HookResult {
        Ok(Proceed)
    }

    /// Called when health reached zero. A veto, or raising health above
    /// zero, spares the entity.
    fn killing(&mut self, _entity: &mut Entity, _killer: Option<EntityId>) -> HookResult {
        Ok(Proceed)
    }
}

/// Hooks that never intervene.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl EntityHooks for NoHooks {}

/// Everything a simulation call needs from the outside world.
pub struct SimContext<'a> {
    /// Broadcaster and clock.
    pub events: &'a mut dyn WorldEvents,
    /// Plugin hooks.
    pub hooks: &'a mut dyn EntityHooks,
    /// Tunable thresholds.
    pub config: &'a SimConfig,
}

impl<'a> SimContext<'a> {
    /// Bundles the collaborators for one call chain.
    #[must_use]
    pub const fn new(
        events: &'a mut dyn WorldEvents,
        hooks: &'a mut dyn EntityHooks,
        config: &'a SimConfig,
    ) -> Self {
        Self {
            events,
            hooks,
            config,
        }
    }

    /// Current world age.
    #[must_use]
    pub fn world_age(&self) -> u64 {
        self.events.world_age()
    }

    /// Broadcasts to every observer.
    pub fn broadcast(&mut self, packet: EntityPacket) {
        self.events.broadcast(packet, None);
    }
}

impl std::fmt::Debug for SimContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
