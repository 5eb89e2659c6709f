//! Status effect ticker: burning, void fall, swimming and drowning.
//!
//! Each effect is an independent counter machine stepped once per tick after
//! physics. Damage goes through the regular pipeline so hooks and armor
//! rules apply uniformly.

use log::debug;

use crate::block::{BlockPos, BlockType};
use crate::config::AirConfig;
use crate::damage::DamageType;
use crate::entity::{Damageable, Entity};
use crate::events::SimContext;
use crate::numeric::{ceil_to_i32, floor_to_i32};
use crate::protocol::EntityPacket;
use crate::spatial::Chunk;
use crate::{DROWNING_TICKS, MAX_AIR_LEVEL};

/// Burn bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BurnState {
    /// Ticks until the fire goes out.
    pub ticks_left: u32,
    /// Ticks since the last on-fire damage.
    pub since_burn: u32,
    /// Ticks since the last lava-contact damage.
    pub since_lava: u32,
    /// Ticks since the last fire-contact damage.
    pub since_fire: u32,
}

/// Air reserve and drowning timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AirState {
    /// Remaining air.
    pub level: i32,
    /// Ticks until the next drowning damage once out of air.
    pub timer: i32,
}

impl AirState {
    /// A full reserve for the given thresholds.
    #[must_use]
    pub const fn full(config: &AirConfig) -> Self {
        Self {
            level: config.max_air,
            timer: config.drowning_ticks,
        }
    }
}

impl Default for AirState {
    fn default() -> Self {
        Self {
            level: MAX_AIR_LEVEL,
            timer: DROWNING_TICKS,
        }
    }
}

/// Blocks of interest found in an entity's bounding box.
#[derive(Debug, Clone, Copy, Default)]
struct Surroundings {
    water: bool,
    lava: bool,
    fire: bool,
}

fn scan_surroundings(entity: &Entity, chunk: &Chunk<'_>) -> Surroundings {
    let pos = entity.position();
    let half_width = entity.width() / 2.0;
    let min_x = floor_to_i32(pos.x - half_width);
    let max_x = floor_to_i32(pos.x + half_width);
    let min_z = floor_to_i32(pos.z - half_width);
    let max_z = floor_to_i32(pos.z + half_width);
    let top = crate::CHUNK_HEIGHT - 1;
    let min_y = floor_to_i32(pos.y).clamp(0, top);
    let max_y = ceil_to_i32(pos.y + entity.height()).clamp(0, top);

    let mut found = Surroundings::default();
    for x in min_x..=max_x {
        for z in min_z..=max_z {
            for y in min_y..=max_y {
                // Unloaded neighbours simply contribute nothing.
                let Some(block) = chunk.block_at(BlockPos::new(x, y, z)) else {
                    continue;
                };
                found.water |= block.is_water();
                found.lava |= block.is_lava();
                found.fire |= block == BlockType::Fire;
            }
        }
    }
    found
}

/// Advances the burning machine by one tick.
///
/// Metadata is broadcast exactly once when burning starts and once when it
/// ends, whatever happened in between.
pub fn tick_burning(entity: &mut Entity, chunk: &Chunk<'_>, ctx: &mut SimContext<'_>) {
    let was_burning = entity.is_on_fire();
    let config = ctx.config;
    let burning = &config.burning;

    if entity.burn.ticks_left > 0 {
        entity.burn.since_burn += 1;
        if entity.burn.since_burn >= burning.ticks_per_burn_damage {
            if !entity.is_fireproof() {
                entity.take_damage(DamageType::OnFire, None, burning.burn_damage, 0.0, ctx);
            }
            entity.burn.since_burn = 0;
        }
        entity.burn.ticks_left -= 1;
    }

    let around = scan_surroundings(entity, chunk);
    if around.water {
        // Silent reset; the edge check below sends the notification.
        entity.burn = BurnState::default();
    }

    if around.lava {
        entity.burn.ticks_left = burning.burn_ticks;
        entity.burn.since_lava += 1;
        if entity.burn.since_lava >= burning.ticks_per_lava_damage {
            if !entity.is_fireproof() {
                entity.take_damage(DamageType::LavaContact, None, burning.lava_damage, 0.0, ctx);
            }
            entity.burn.since_lava = 0;
        }
    } else {
        entity.burn.since_lava = 0;
    }

    if around.fire {
        entity.burn.ticks_left = burning.burn_ticks;
        entity.burn.since_fire += 1;
        if entity.burn.since_fire >= burning.ticks_per_fire_damage {
            if !entity.is_fireproof() {
                entity.take_damage(DamageType::FireContact, None, burning.fire_damage, 0.0, ctx);
            }
            entity.burn.since_fire = 0;
        }
    } else {
        entity.burn.since_fire = 0;
    }

    notify_burn_edge(entity, was_burning, ctx);
}

fn notify_burn_edge(entity: &Entity, was_burning: bool, ctx: &mut SimContext<'_>) {
    if entity.is_on_fire() != was_burning {
        debug!(
            "entity {} {} burning",
            entity.id(),
            if was_burning { "stopped" } else { "started" }
        );
        ctx.broadcast(EntityPacket::Metadata {
            entity: entity.id(),
            flags: entity.metadata_flags(),
        });
    }
}

/// Advances the void machine by one tick.
///
/// Below the boundary the counter climbs and every `ticks_per_damage` ticks
/// the entity takes void damage; at or above the boundary the counter resets.
pub fn tick_void(entity: &mut Entity, ctx: &mut SimContext<'_>) {
    let config = ctx.config;
    let void = &config.void;
    if entity.position().y >= void.boundary {
        entity.void_ticks = 0;
        return;
    }
    entity.void_ticks += 1;
    if entity.void_ticks >= void.ticks_per_damage {
        entity.take_damage(DamageType::InVoid, None, void.damage, 0.0, ctx);
        entity.void_ticks = 0;
    }
}

/// Recomputes the swimming and submerged flags from the blocks at the
/// entity's feet and head.
pub fn update_swim_state(entity: &mut Entity, chunk: &Chunk<'_>) {
    let pos = entity.position();
    let feet_y = floor_to_i32(pos.y + 0.1);
    entity.swimming = false;
    entity.submerged = false;
    if feet_y < 0 || feet_y >= crate::CHUNK_HEIGHT - 1 {
        return;
    }
    let feet = BlockPos::new(floor_to_i32(pos.x), feet_y, floor_to_i32(pos.z));
    let (Some(at_feet), Some(at_head)) = (chunk.block_at(feet), chunk.block_at(feet.offset(0, 1, 0)))
    else {
        debug!("entity {} swim state unknown: column not loaded", entity.id());
        return;
    };
    entity.swimming = at_feet.is_water();
    entity.submerged = at_head.is_water();
}

/// Advances the air machine by one tick.
///
/// Submerged entities float upwards and first use up their air reserve;
/// once it is empty the drowning timer runs down and each expiry deals
/// drowning damage. Surfacing refills both.
pub fn tick_air(entity: &mut Entity, ctx: &mut SimContext<'_>) {
    let config = ctx.config;
    let air = &config.air;
    if !entity.is_submerged() {
        entity.air = AirState::full(air);
        return;
    }

    let v = entity.velocity();
    entity.set_velocity(glam::DVec3::new(v.x, crate::SUBMERGED_FLOAT_SPEED, v.z));

    if entity.air.level > 0 {
        entity.air.level -= 1;
    } else if entity.air.timer > 0 {
        entity.air.timer -= 1;
    } else {
        entity.take_damage(DamageType::Drowning, None, air.drowning_damage, 0.0, ctx);
        entity.air.timer = air.drowning_ticks;
    }
}

impl Entity {
    /// Sets the entity on fire for at least `ticks` ticks.
    ///
    /// An already burning entity keeps the longer of the two durations.
    pub fn start_burning(&mut self, ticks: u32, ctx: &mut SimContext<'_>) {
        let was_burning = self.is_on_fire();
        self.burn.ticks_left = self.burn.ticks_left.max(ticks);
        notify_burn_edge(self, was_burning, ctx);
    }

    /// Puts out the fire and resets every burn counter.
    pub fn stop_burning(&mut self, ctx: &mut SimContext<'_>) {
        let was_burning = self.is_on_fire();
        self.burn = BurnState::default();
        notify_burn_edge(self, was_burning, ctx);
    }
}
