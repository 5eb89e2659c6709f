//! Event sink and hooks that remember what the simulation did.

use glam::DVec3;
use voxsim::{
    ClientId, Entity, EntityHooks, EntityId, EntityPacket, HookResult, ItemStack, Proceed,
    SimConfig, SimContext, TakeDamageInfo, Vetoed, WorldEvents,
};

/// [`WorldEvents`] implementation that records every call.
#[derive(Debug, Default)]
pub struct RecordingEvents {
    /// Value reported by `world_age`.
    pub age: u64,
    /// Broadcast packets with their excluded client, oldest first.
    pub sent: Vec<(EntityPacket, Option<ClientId>)>,
    /// Pickup spawn requests.
    pub pickups: Vec<(Vec<ItemStack>, DVec3)>,
}

impl RecordingEvents {
    /// Recorded packets without their exclusions.
    pub fn packets(&self) -> Vec<&EntityPacket> {
        self.sent.iter().map(|(packet, _)| packet).collect()
    }

    /// Removes and returns every recorded packet.
    ///
    /// # Examples
    /// ```
    /// use test_utils::RecordingEvents;
    /// let mut events = RecordingEvents::default();
    /// assert!(events.take().is_empty());
    /// ```
    pub fn take(&mut self) -> Vec<EntityPacket> {
        self.sent.drain(..).map(|(packet, _)| packet).collect()
    }

    /// Number of recorded packets matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&EntityPacket) -> bool) -> usize {
        self.sent.iter().filter(|(packet, _)| predicate(packet)).count()
    }
}

impl WorldEvents for RecordingEvents {
    fn world_age(&self) -> u64 {
        self.age
    }

    fn broadcast(&mut self, packet: EntityPacket, exclude: Option<ClientId>) {
        self.sent.push((packet, exclude));
    }

    fn spawn_item_pickups(&mut self, items: &[ItemStack], position: DVec3) {
        self.pickups.push((items.to_vec(), position));
    }
}

/// Hooks driven by flags set up front, recording what they saw.
#[derive(Debug, Default)]
pub struct ScriptedHooks {
    /// Refuse every spawn.
    pub veto_spawn: bool,
    /// Refuse every damage request.
    pub veto_damage: bool,
    /// Replace the final damage of every request.
    pub override_damage: Option<i32>,
    /// Refuse every kill.
    pub veto_kill: bool,
    /// Health to restore from inside the killing hook.
    pub revive_to: Option<i32>,
    /// Entities announced by the spawned hook.
    pub spawned: Vec<EntityId>,
    /// Killing hook calls as `(victim, killer)`.
    pub kills: Vec<(EntityId, Option<EntityId>)>,
}

impl EntityHooks for ScriptedHooks {
    fn spawning(&mut self, _entity: &Entity) -> HookResult {
        if self.veto_spawn {
            Err(Vetoed)
        } else {
            Ok(Proceed)
        }
    }

    fn spawned(&mut self, entity: &Entity) {
        self.spawned.push(entity.id());
    }

    fn take_damage(&mut self, _entity: &Entity, info: &mut TakeDamageInfo) -> HookResult {
        if self.veto_damage {
            return Err(Vetoed);
        }
        if let Some(damage) = self.override_damage {
            info.final_damage = damage;
        }
        Ok(Proceed)
    }

    fn killing(&mut self, entity: &mut Entity, killer: Option<EntityId>) -> HookResult {
        self.kills.push((entity.id(), killer));
        if let Some(health) = self.revive_to {
            entity.set_health(health);
        }
        if self.veto_kill {
            Err(Vetoed)
        } else {
            Ok(Proceed)
        }
    }
}

/// Owns the collaborators a [`SimContext`] borrows.
#[derive(Debug, Default)]
pub struct Harness {
    /// Recording sink.
    pub events: RecordingEvents,
    /// Scripted hooks.
    pub hooks: ScriptedHooks,
    /// Thresholds in effect.
    pub config: SimConfig,
}

impl Harness {
    /// Harness at world age `age` with default thresholds.
    pub fn at_age(age: u64) -> Self {
        Self {
            events: RecordingEvents {
                age,
                ..RecordingEvents::default()
            },
            ..Self::default()
        }
    }

    /// Borrows the collaborators for one call chain.
    pub fn ctx(&mut self) -> SimContext<'_> {
        SimContext::new(&mut self.events, &mut self.hooks, &self.config)
    }

    /// Advances the recorded world age by one tick.
    pub fn advance(&mut self) {
        self.events.age += 1;
    }
}
