//! Damage pipeline through the arena: armor, hooks, death and drops.

use glam::DVec3;
use rstest::{fixture, rstest};
use test_utils::{mob_at, player_at, Harness};
use voxsim::items::{ArmorMaterial, ToolKind, ToolMaterial};
use voxsim::protocol::{Animation, EntityStatus};
use voxsim::{
    DamageOutcome, DamageType, Entity, EntityId, EntityKind, EntityPacket, Equipment, Item,
    ItemStack, MobState, WorldHandle,
};

struct Arena {
    world: WorldHandle,
    harness: Harness,
}

impl Arena {
    fn spawn(&mut self, entity: Entity) -> EntityId {
        let mut ctx = self.harness.ctx();
        self.world.spawn(entity, &mut ctx).expect("spawn")
    }

    fn hit(&mut self, target: EntityId, kind: DamageType, raw: i32) -> DamageOutcome {
        let mut ctx = self.harness.ctx();
        self.world
            .take_damage(target, kind, None, raw, 0.0, &mut ctx)
            .expect("target registered")
    }

    fn health(&self, id: EntityId) -> i32 {
        self.world.get(id).expect("registered").health()
    }
}

#[fixture]
fn arena() -> Arena {
    Arena {
        world: WorldHandle::new(),
        harness: Harness::default(),
    }
}

fn knight() -> Entity {
    mob_at(DVec3::new(0.0, 64.0, 0.0)).with_equipment(Equipment::full_armor(ArmorMaterial::Diamond))
}

#[rstest]
#[case(DamageType::Attack, 10, 8)]
#[case(DamageType::Explosion, 10, 8)]
#[case(DamageType::OnFire, 10, 0)]
#[case(DamageType::InVoid, 10, 0)]
#[case(DamageType::Drowning, 10, 0)]
fn diamond_armor_covers_protected_damage(
    mut arena: Arena,
    #[case] kind: DamageType,
    #[case] raw: i32,
    #[case] cover: i32,
) {
    let id = arena.spawn(knight());
    let outcome = arena.hit(id, kind, raw);
    assert_eq!(outcome, DamageOutcome::Hurt { dealt: raw - cover });
    assert_eq!(arena.health(id), 20 - (raw - cover));
}

#[rstest]
fn drowning_protection_is_configurable(mut arena: Arena) {
    arena.harness.config.damage.drowning_armor_protected = true;
    let id = arena.spawn(knight());
    assert_eq!(
        arena.hit(id, DamageType::Drowning, 10),
        DamageOutcome::Hurt { dealt: 2 }
    );
}

#[rstest]
fn health_never_drops_below_zero(mut arena: Arena) {
    let id = arena.spawn(mob_at(DVec3::ZERO));
    assert_eq!(
        arena.hit(id, DamageType::Lightning, 500),
        DamageOutcome::Killed { dealt: 500 }
    );
    assert_eq!(arena.health(id), 0);
}

#[rstest]
fn the_dead_are_not_damaged_again(mut arena: Arena) {
    let id = arena.spawn(mob_at(DVec3::ZERO));
    arena.hit(id, DamageType::Plugin, 20);
    let before = arena.harness.events.sent.len();
    assert_eq!(arena.hit(id, DamageType::Plugin, 5), DamageOutcome::AlreadyDead);
    assert_eq!(arena.harness.events.sent.len(), before);
}

#[rstest]
fn death_drops_loot_and_announces(mut arena: Arena) {
    let loot = vec![ItemStack::new(Item::Other(367), 2)];
    let mob = Entity::new(
        EntityKind::Mob(MobState { loot: loot.clone() }),
        DVec3::new(1.0, 64.0, 1.0),
    );
    let id = arena.spawn(mob);
    arena.harness.events.take();

    arena.hit(id, DamageType::Attack, 25);

    assert_eq!(arena.harness.events.pickups, vec![(loot, DVec3::new(1.0, 64.0, 1.0))]);
    assert_eq!(arena.harness.hooks.kills, vec![(id, None)]);
    assert_eq!(
        arena.harness.events.take(),
        vec![
            EntityPacket::Status {
                entity: id,
                status: EntityStatus::Hurt,
            },
            EntityPacket::Status {
                entity: id,
                status: EntityStatus::Dead,
            },
        ]
    );
}

#[rstest]
fn vetoed_damage_changes_nothing(mut arena: Arena) {
    let id = arena.spawn(mob_at(DVec3::ZERO));
    arena.harness.hooks.veto_damage = true;
    assert_eq!(arena.hit(id, DamageType::Attack, 5), DamageOutcome::Vetoed);
    assert_eq!(arena.health(id), 20);
}

#[rstest]
fn hooks_may_rewrite_final_damage(mut arena: Arena) {
    let id = arena.spawn(mob_at(DVec3::ZERO));
    arena.harness.hooks.override_damage = Some(3);
    assert_eq!(arena.hit(id, DamageType::Attack, 15), DamageOutcome::Hurt { dealt: 3 });
    assert_eq!(arena.health(id), 17);
}

#[rstest]
#[case(true, None)]
#[case(false, Some(4))]
fn killing_hook_can_spare(mut arena: Arena, #[case] veto: bool, #[case] revive: Option<i32>) {
    let id = arena.spawn(mob_at(DVec3::ZERO));
    arena.harness.hooks.veto_kill = veto;
    arena.harness.hooks.revive_to = revive;
    assert_eq!(
        arena.hit(id, DamageType::Attack, 30),
        DamageOutcome::Spared { dealt: 30 }
    );
    assert_eq!(arena.health(id), revive.unwrap_or(1));
    assert!(arena.harness.events.pickups.is_empty());
    assert_eq!(
        arena.harness.events.count(|p| matches!(
            p,
            EntityPacket::Status {
                status: EntityStatus::Dead,
                ..
            }
        )),
        0
    );
}

#[rstest]
fn airborne_player_lands_a_critical_hit(mut arena: Arena) {
    let sword = Equipment {
        held: Some(ItemStack::single(Item::Tool {
            kind: ToolKind::Sword,
            material: ToolMaterial::Diamond,
        })),
        ..Equipment::default()
    };
    let attacker = arena.spawn(player_at(DVec3::new(0.0, 66.0, 0.0)).with_equipment(sword));
    let target = arena.spawn(mob_at(DVec3::new(1.0, 64.0, 0.0)));
    arena.harness.events.take();

    let mut ctx = arena.harness.ctx();
    let outcome = arena
        .world
        .attack(attacker, target, &mut ctx)
        .expect("both registered");

    assert_eq!(outcome, DamageOutcome::Hurt { dealt: 9 });
    assert!(arena.harness.events.packets().contains(&&EntityPacket::Animation {
        entity: target,
        animation: Animation::CriticalHit,
    }));
    let knocked = arena.world.get(target).expect("registered").velocity();
    assert!(knocked.y > 0.0, "knockback lifts the target");
}
