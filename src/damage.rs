//! Damage pipeline.
//!
//! A damage request is first turned into a [`TakeDamageInfo`] (armor
//! reduction and knockback), then resolved against the target: hooks,
//! critical hits, health, knockback impulse, and finally the kill sequence
//! with loot drops.

use glam::DVec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{DamageConfig, SimConfig};
use crate::entity::{Damageable, Entity, LootSource};
use crate::events::SimContext;
use crate::ids::EntityId;
use crate::items::ItemStack;
use crate::protocol::{Animation, EntityPacket, EntityStatus};
use crate::{
    CRITICAL_HIT_BONUS, KNOCKBACK_IMPULSE_SCALE, KNOCKBACK_LIFT, SPRINT_KNOCKBACK, WALK_KNOCKBACK,
};

/// Why an entity is taking damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    /// Melee hit by another entity.
    Attack,
    /// Projectile hit.
    RangedAttack,
    /// Burning.
    OnFire,
    /// Standing in fire.
    FireContact,
    /// Standing in lava.
    LavaContact,
    /// Touching a cactus.
    CactusContact,
    /// Blast.
    Explosion,
    /// Stuck inside a block.
    Suffocating,
    /// Out of air under water.
    Drowning,
    /// Out of food.
    Starving,
    /// Fell below the world.
    InVoid,
    /// Poison effect.
    Poisoning,
    /// Splash or drink of harming.
    PotionOfHarming,
    /// Fall damage.
    Falling,
    /// Lightning strike.
    Lightning,
    /// Caused directly by a plugin.
    Plugin,
}

impl DamageType {
    /// Whether worn armor reduces damage of this type.
    #[must_use]
    pub const fn armor_protected(self, config: &DamageConfig) -> bool {
        match self {
            Self::Drowning => config.drowning_armor_protected,
            Self::OnFire
            | Self::Suffocating
            | Self::Starving
            | Self::InVoid
            | Self::Poisoning
            | Self::PotionOfHarming
            | Self::Falling
            | Self::Lightning
            | Self::Plugin => false,
            Self::Attack
            | Self::RangedAttack
            | Self::FireContact
            | Self::LavaContact
            | Self::CactusContact
            | Self::Explosion => true,
        }
    }
}

/// What the pipeline needs to know about an attacker, captured before the
/// target is borrowed mutably.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackerInfo {
    /// The attacker.
    pub id: EntityId,
    /// Only players land critical hits.
    pub is_player: bool,
    /// Airborne players land critical hits.
    pub on_ground: bool,
    /// Sprinting attackers knock harder.
    pub sprinting: bool,
    /// Direction the attacker looks in.
    pub look: DVec3,
    /// Item in the attacker's hand.
    pub held: Option<ItemStack>,
}

impl AttackerInfo {
    /// Snapshot of `attacker`.
    #[must_use]
    pub fn of(attacker: &Entity) -> Self {
        Self {
            id: attacker.id(),
            is_player: attacker.is_player(),
            on_ground: attacker.is_on_ground(),
            sprinting: attacker.kind().as_player().is_some_and(|p| p.sprinting),
            look: attacker.look_vector(),
            held: attacker.equipment().held,
        }
    }

    /// Raw melee damage of the held item.
    #[must_use]
    pub fn melee_damage(&self) -> i32 {
        self.held.map_or(1, |stack| stack.item.melee_damage())
    }
}

/// One damage resolution in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct TakeDamageInfo {
    /// Why.
    pub kind: DamageType,
    /// Who, if anyone.
    pub attacker: Option<AttackerInfo>,
    /// Damage before armor.
    pub raw_damage: i32,
    /// Damage after armor; what is subtracted from health.
    pub final_damage: i32,
    /// Knockback heading; applied doubled to living targets.
    pub knockback: DVec3,
}

/// How a damage resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// A hook cancelled it.
    Vetoed,
    /// The target was already dead.
    AlreadyDead,
    /// Health dropped but stayed above zero.
    Hurt {
        /// Health removed.
        dealt: i32,
    },
    /// Health reached zero and the entity died.
    Killed {
        /// Health removed.
        dealt: i32,
    },
    /// Health reached zero but the killing hook spared the entity.
    Spared {
        /// Health removed.
        dealt: i32,
    },
}

/// Damage absorbed by `target`'s armor.
///
/// Each armor point absorbs 4 % of the raw damage, rounded down.
///
/// # Examples
/// ```
/// use voxsim::damage::{armor_cover, DamageType};
/// use voxsim::items::{ArmorMaterial, Equipment};
/// use voxsim::{Entity, EntityKind, SimConfig};
///
/// let knight = Entity::new(EntityKind::mob(), glam::DVec3::ZERO)
///     .with_equipment(Equipment::full_armor(ArmorMaterial::Diamond));
/// let config = SimConfig::default();
/// assert_eq!(armor_cover(&knight, DamageType::Attack, 10, &config.damage), 8);
/// assert_eq!(armor_cover(&knight, DamageType::OnFire, 10, &config.damage), 0);
/// ```
#[must_use]
pub fn armor_cover(target: &Entity, kind: DamageType, raw_damage: i32, config: &DamageConfig) -> i32 {
    if !kind.armor_protected(config) {
        return 0;
    }
    let points = target.equipment().armor_points();
    raw_damage.saturating_mul(points * 4) / 100
}

/// Knockback heading of a hit, scaled by `amount`.
///
/// Without an attacker the hit only lifts the target.
#[must_use]
pub fn knockback_vector(attacker: Option<&AttackerInfo>, amount: f64) -> DVec3 {
    let mut heading = attacker.map_or(DVec3::ZERO, |source| {
        let multiplier = if source.sprinting {
            SPRINT_KNOCKBACK
        } else {
            WALK_KNOCKBACK
        };
        source.look * multiplier
    });
    heading.y = KNOCKBACK_LIFT;
    heading * amount
}

/// Builds the damage record for a request against `target`.
#[must_use]
pub fn prepare(
    target: &Entity,
    kind: DamageType,
    attacker: Option<&AttackerInfo>,
    raw_damage: i32,
    knockback_amount: f64,
    config: &SimConfig,
) -> TakeDamageInfo {
    let final_damage = raw_damage - armor_cover(target, kind, raw_damage, &config.damage);
    let knockback = knockback_vector(attacker, knockback_amount);
    TakeDamageInfo {
        kind,
        attacker: attacker.copied(),
        raw_damage,
        final_damage,
        knockback,
    }
}

/// Applies a prepared damage record to `target`.
pub fn resolve(
    target: &mut Entity,
    mut info: TakeDamageInfo,
    ctx: &mut SimContext<'_>,
) -> DamageOutcome {
    if ctx.hooks.take_damage(target, &mut info).is_err() {
        debug!("damage to entity {} vetoed by hook", target.id());
        return DamageOutcome::Vetoed;
    }
    if target.is_dead() {
        return DamageOutcome::AlreadyDead;
    }

    if let Some(source) = &info.attacker {
        if source.is_player && !source.on_ground {
            info.final_damage += CRITICAL_HIT_BONUS;
            ctx.broadcast(EntityPacket::Animation {
                entity: target.id(),
                animation: Animation::CriticalHit,
            });
        }
    }

    let dealt = info.final_damage.max(0);
    target.set_health(target.health() - dealt);

    if target.kind().is_living() && info.knockback != DVec3::ZERO {
        target.add_velocity(info.knockback * KNOCKBACK_IMPULSE_SCALE);
    }

    ctx.broadcast(EntityPacket::Status {
        entity: target.id(),
        status: EntityStatus::Hurt,
    });

    if target.health() > 0 {
        return DamageOutcome::Hurt { dealt };
    }
    if kill(target, info.attacker.map(|a| a.id), ctx) {
        DamageOutcome::Killed { dealt }
    } else {
        DamageOutcome::Spared { dealt }
    }
}

/// Runs the kill sequence. Returns `false` when the killing hook spared the
/// entity.
fn kill(target: &mut Entity, killer: Option<EntityId>, ctx: &mut SimContext<'_>) -> bool {
    target.set_health(0);
    let verdict = ctx.hooks.killing(target, killer);
    if verdict.is_err() || target.health() > 0 {
        // A veto that leaves health at zero restores one point; a hook that
        // healed the entity keeps its value.
        if target.health() == 0 {
            target.set_health(1);
        }
        debug!("entity {} spared by killing hook", target.id());
        return false;
    }

    let drops = target.drops();
    if !drops.is_empty() {
        ctx.events.spawn_item_pickups(&drops, target.position());
    }
    ctx.broadcast(EntityPacket::Status {
        entity: target.id(),
        status: EntityStatus::Dead,
    });
    true
}

/// Melee hit of `attacker` on `target` with the attacker's held item.
pub fn melee_attack(
    attacker: &AttackerInfo,
    target: &mut Entity,
    ctx: &mut SimContext<'_>,
) -> DamageOutcome {
    target.take_damage(
        DamageType::Attack,
        Some(attacker),
        attacker.melee_damage(),
        1.0,
        ctx,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::events::{MockEntityHooks, MockWorldEvents, NoHooks, Proceed, Vetoed};
    use crate::items::{ArmorMaterial, Equipment, Item, ToolKind, ToolMaterial};
    use crate::MobState;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn events() -> MockWorldEvents {
        let mut events = MockWorldEvents::new();
        events.expect_world_age().return_const(0_u64);
        events.expect_broadcast().return_const(());
        events.expect_spawn_item_pickups().return_const(());
        events
    }

    fn attacker(is_player: bool, on_ground: bool, sprinting: bool) -> AttackerInfo {
        AttackerInfo {
            id: EntityId(9999),
            is_player,
            on_ground,
            sprinting,
            look: DVec3::Z,
            held: None,
        }
    }

    #[rstest]
    #[case(DamageType::OnFire, false)]
    #[case(DamageType::InVoid, false)]
    #[case(DamageType::Falling, false)]
    #[case(DamageType::Plugin, false)]
    #[case(DamageType::Drowning, false)]
    #[case(DamageType::Attack, true)]
    #[case(DamageType::LavaContact, true)]
    fn armor_protection_by_type(#[case] kind: DamageType, #[case] protected: bool) {
        assert_eq!(kind.armor_protected(&DamageConfig::default()), protected);
    }

    #[test]
    fn drowning_protection_is_configurable() {
        let config = DamageConfig {
            drowning_armor_protected: true,
        };
        assert!(DamageType::Drowning.armor_protected(&config));
    }

    #[rstest]
    #[case(ArmorMaterial::Diamond, 10, 8)]
    #[case(ArmorMaterial::Diamond, 7, 5)]
    #[case(ArmorMaterial::Leather, 10, 2)]
    fn cover_uses_integer_percentages(
        #[case] material: ArmorMaterial,
        #[case] raw: i32,
        #[case] cover: i32,
    ) {
        let target = Entity::new(EntityKind::mob(), DVec3::ZERO)
            .with_equipment(Equipment::full_armor(material));
        assert_eq!(
            armor_cover(&target, DamageType::Attack, raw, &DamageConfig::default()),
            cover
        );
    }

    #[rstest]
    #[case(false, 8.0)]
    #[case(true, 10.0)]
    fn knockback_depends_on_sprint(#[case] sprinting: bool, #[case] forward: f64) {
        let kb = knockback_vector(Some(&attacker(false, true, sprinting)), 1.5);
        assert_relative_eq!(kb.z, forward * 1.5);
        assert_relative_eq!(kb.y, KNOCKBACK_LIFT * 1.5);
        assert_relative_eq!(kb.x, 0.0);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.5, 3.0)]
    fn unattributed_knockback_only_lifts(#[case] amount: f64, #[case] lift: f64) {
        let kb = knockback_vector(None, amount);
        assert_relative_eq!(kb.x, 0.0);
        assert_relative_eq!(kb.y, lift);
        assert_relative_eq!(kb.z, 0.0);
    }

    #[rstest]
    fn unattributed_hit_lifts_living_target(mut events: MockWorldEvents) {
        let mut target = Entity::new(EntityKind::mob(), DVec3::ZERO);
        let config = SimConfig::default();
        let mut hooks = NoHooks;
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let info = prepare(&target, DamageType::Plugin, None, 2, 1.0, &config);
        assert_eq!(info.knockback, DVec3::new(0.0, KNOCKBACK_LIFT, 0.0));
        resolve(&mut target, info, &mut ctx);
        assert_relative_eq!(target.velocity().y, KNOCKBACK_LIFT * KNOCKBACK_IMPULSE_SCALE);
        assert_relative_eq!(target.velocity().x, 0.0);
    }

    #[rstest]
    fn airborne_player_lands_critical_hit(mut events: MockWorldEvents) {
        let mut target = Entity::new(EntityKind::mob(), DVec3::ZERO);
        let config = SimConfig::default();
        let mut hooks = NoHooks;
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let outcome = melee_attack(&attacker(true, false, false), &mut target, &mut ctx);
        assert_eq!(outcome, DamageOutcome::Hurt { dealt: 3 });
        assert_eq!(target.health(), 17);
        assert_relative_eq!(target.velocity().z, 16.0);
        assert_relative_eq!(target.velocity().y, 4.0);
    }

    #[rstest]
    fn grounded_mob_hit_has_no_bonus(mut events: MockWorldEvents) {
        let mut target = Entity::new(EntityKind::Other, DVec3::ZERO);
        target.set_max_health(10);
        target.set_health(10);
        let config = SimConfig::default();
        let mut hooks = NoHooks;
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let mut info = attacker(false, false, false);
        info.held = Some(ItemStack::single(Item::Tool {
            kind: ToolKind::Sword,
            material: ToolMaterial::Stone,
        }));
        let outcome = melee_attack(&info, &mut target, &mut ctx);
        assert_eq!(outcome, DamageOutcome::Hurt { dealt: 5 });
        // Non-living targets take no knockback.
        assert_eq!(target.velocity(), DVec3::ZERO);
    }

    #[rstest]
    fn take_damage_hook_veto_leaves_target_untouched() {
        let mut events = MockWorldEvents::new();
        events.expect_broadcast().never();
        let mut hooks = MockEntityHooks::new();
        hooks.expect_take_damage().returning(|_, _| Err(Vetoed));
        let config = SimConfig::default();
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let mut target = Entity::new(EntityKind::mob(), DVec3::ZERO);
        let outcome = target.take_damage(DamageType::Plugin, None, 5, 0.0, &mut ctx);
        assert_eq!(outcome, DamageOutcome::Vetoed);
        assert_eq!(target.health(), 20);
    }

    #[rstest]
    fn hook_may_rewrite_damage(mut events: MockWorldEvents) {
        let mut hooks = MockEntityHooks::new();
        hooks.expect_take_damage().returning(|_, info| {
            info.final_damage = 1;
            Ok(Proceed)
        });
        let config = SimConfig::default();
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let mut target = Entity::new(EntityKind::mob(), DVec3::ZERO);
        target.take_damage(DamageType::Plugin, None, 15, 0.0, &mut ctx);
        assert_eq!(target.health(), 19);
    }

    #[rstest]
    fn dead_entities_cannot_be_damaged_again(mut events: MockWorldEvents) {
        let config = SimConfig::default();
        let mut hooks = NoHooks;
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let mut target = Entity::new(EntityKind::mob(), DVec3::ZERO);
        target.set_health(0);
        let outcome = target.take_damage(DamageType::Plugin, None, 5, 0.0, &mut ctx);
        assert_eq!(outcome, DamageOutcome::AlreadyDead);
        assert_eq!(target.health(), 0);
    }

    #[rstest]
    fn lethal_damage_drops_loot_and_reports_death() {
        let loot = vec![ItemStack::new(Item::Other(367), 3)];
        let mut target =
            Entity::new(EntityKind::Mob(MobState { loot: loot.clone() }), DVec3::new(1.0, 2.0, 3.0));
        let mut events = MockWorldEvents::new();
        events
            .expect_spawn_item_pickups()
            .withf(move |items, pos| items == loot.as_slice() && *pos == DVec3::new(1.0, 2.0, 3.0))
            .times(1)
            .return_const(());
        events.expect_broadcast().times(2).return_const(());
        let config = SimConfig::default();
        let mut hooks = NoHooks;
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let outcome = target.take_damage(DamageType::Plugin, None, 50, 0.0, &mut ctx);
        assert_eq!(outcome, DamageOutcome::Killed { dealt: 50 });
        assert_eq!(target.health(), 0);
    }

    #[rstest]
    fn killing_hook_veto_spares_entity(mut events: MockWorldEvents) {
        let mut hooks = MockEntityHooks::new();
        hooks.expect_take_damage().returning(|_, _| Ok(Proceed));
        hooks.expect_killing().returning(|_, _| Err(Vetoed));
        let config = SimConfig::default();
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let mut target = Entity::new(EntityKind::mob(), DVec3::ZERO);
        let outcome = target.take_damage(DamageType::Plugin, None, 20, 0.0, &mut ctx);
        assert_eq!(outcome, DamageOutcome::Spared { dealt: 20 });
        assert_eq!(target.health(), 1);
    }

    #[rstest]
    fn killing_hook_may_heal(mut events: MockWorldEvents) {
        let mut hooks = MockEntityHooks::new();
        hooks.expect_take_damage().returning(|_, _| Ok(Proceed));
        hooks.expect_killing().returning(|entity, _| {
            entity.set_health(5);
            Ok(Proceed)
        });
        let config = SimConfig::default();
        let mut ctx = SimContext::new(&mut events, &mut hooks, &config);
        let mut target = Entity::new(EntityKind::mob(), DVec3::ZERO);
        let outcome = target.take_damage(DamageType::Plugin, None, 30, 0.0, &mut ctx);
        assert_eq!(outcome, DamageOutcome::Spared { dealt: 30 });
        assert_eq!(target.health(), 5);
    }
}
