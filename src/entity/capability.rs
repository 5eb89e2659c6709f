//! Capability traits implemented by [`Entity`].
//!
//! Behaviour that differs by kind is dispatched on [`EntityKind`] inside the
//! implementations; the traits name the seams the world driver and combat
//! callers program against.

use glam::DVec3;
use log::debug;

use super::{Entity, EntityKind};
use crate::damage::{self, AttackerInfo, DamageOutcome, DamageType, TakeDamageInfo};
use crate::events::SimContext;
use crate::ids::EntityId;
use crate::items::ItemStack;
use crate::numeric::floor_to_i32;
use crate::physics::{self, StepOutcome};
use crate::spatial::Chunk;
use crate::status;
use crate::ATTACH_SNAP_DISTANCE;

/// Something advanced once per world tick.
pub trait Tickable {
    /// Advances by `dt_ms` milliseconds.
    ///
    /// `chunk` is the column the entity was in at the start of the tick and
    /// `mount` the position of the entity it rides, if any.
    fn tick(
        &mut self,
        dt_ms: f64,
        chunk: &Chunk<'_>,
        mount: Option<DVec3>,
        ctx: &mut SimContext<'_>,
    ) -> Option<StepOutcome>;
}

/// Something that can be hurt and killed.
pub trait Damageable {
    /// Runs the full pipeline: armor reduction, knockback, then resolution.
    fn take_damage(
        &mut self,
        kind: DamageType,
        attacker: Option<&AttackerInfo>,
        raw_damage: i32,
        knockback_amount: f64,
        ctx: &mut SimContext<'_>,
    ) -> DamageOutcome;

    /// Resolves an already prepared damage record.
    fn do_take_damage(&mut self, info: TakeDamageInfo, ctx: &mut SimContext<'_>) -> DamageOutcome;
}

/// Something that can ride or be ridden.
pub trait Attachable {
    /// The entity this one rides.
    fn attached_to(&self) -> Option<EntityId>;

    /// The entity riding this one.
    fn attachee(&self) -> Option<EntityId>;

    /// Whether this entity rides something.
    fn is_attached(&self) -> bool {
        self.attached_to().is_some()
    }
}

/// Something that leaves items behind when it dies.
pub trait LootSource {
    /// Stacks to spawn as pickups on death.
    fn drops(&self) -> Vec<ItemStack>;
}

impl Tickable for Entity {
    fn tick(
        &mut self,
        dt_ms: f64,
        chunk: &Chunk<'_>,
        mount: Option<DVec3>,
        ctx: &mut SimContext<'_>,
    ) -> Option<StepOutcome> {
        if self.attached_to.is_some() {
            if let Some(anchor) = mount {
                if self.position.distance(anchor) > ATTACH_SNAP_DISTANCE {
                    self.set_position(anchor);
                }
            }
            return None;
        }
        if !chunk.is_valid() {
            return None;
        }
        let Some(column) = chunk.neighbor_chunk(
            floor_to_i32(self.position.x),
            floor_to_i32(self.position.z),
        ) else {
            debug!("entity {} skipped: neighbour column not loaded", self.id);
            return None;
        };

        let outcome = physics::step(self, dt_ms, &column);

        // Status effects are evaluated where the entity ended up.
        let landed = column
            .neighbor_chunk(floor_to_i32(self.position.x), floor_to_i32(self.position.z))
            .unwrap_or(column);
        status::tick_burning(self, &landed, ctx);
        status::tick_void(self, ctx);
        if self.kind.is_living() {
            status::update_swim_state(self, &landed);
            status::tick_air(self, ctx);
        }
        Some(outcome)
    }
}

impl Damageable for Entity {
    fn take_damage(
        &mut self,
        kind: DamageType,
        attacker: Option<&AttackerInfo>,
        raw_damage: i32,
        knockback_amount: f64,
        ctx: &mut SimContext<'_>,
    ) -> DamageOutcome {
        let info = damage::prepare(self, kind, attacker, raw_damage, knockback_amount, ctx.config);
        self.do_take_damage(info, ctx)
    }

    fn do_take_damage(&mut self, info: TakeDamageInfo, ctx: &mut SimContext<'_>) -> DamageOutcome {
        damage::resolve(self, info, ctx)
    }
}

impl Attachable for Entity {
    fn attached_to(&self) -> Option<EntityId> {
        self.attached_to
    }

    fn attachee(&self) -> Option<EntityId> {
        self.attachee
    }
}

impl LootSource for Entity {
    fn drops(&self) -> Vec<ItemStack> {
        match &self.kind {
            EntityKind::Player(_) => self.equipment.stacks(),
            EntityKind::Mob(mob) => mob.loot.clone(),
            EntityKind::Minecart(kind) => vec![EntityKind::minecart_item(*kind)],
            EntityKind::Pickup(_) | EntityKind::Other => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ArmorMaterial, Equipment, Item, MinecartKind};
    use crate::MobState;
    use rstest::rstest;

    #[rstest]
    fn players_drop_their_equipment() {
        let player = Entity::new(EntityKind::player(), DVec3::ZERO)
            .with_equipment(Equipment::full_armor(ArmorMaterial::Gold));
        assert_eq!(player.drops().len(), 4);
    }

    #[rstest]
    fn mobs_drop_their_loot() {
        let loot = vec![ItemStack::new(Item::Other(288), 2)];
        let mob = Entity::new(EntityKind::Mob(MobState { loot: loot.clone() }), DVec3::ZERO);
        assert_eq!(mob.drops(), loot);
    }

    #[rstest]
    fn minecarts_drop_themselves() {
        let cart = Entity::new(EntityKind::Minecart(MinecartKind::Furnace), DVec3::ZERO);
        assert_eq!(
            cart.drops(),
            vec![ItemStack::single(Item::Minecart(MinecartKind::Furnace))]
        );
    }

    #[rstest]
    fn unattached_by_default() {
        let entity = Entity::new(EntityKind::Other, DVec3::ZERO);
        assert!(!entity.is_attached());
        assert!(entity.attachee().is_none());
        assert!(entity.drops().is_empty());
    }
}
