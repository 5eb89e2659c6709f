//! Status effects ticked through the arena: burning, void and drowning.

use glam::DVec3;
use rstest::{fixture, rstest};
use test_utils::{flat_world, mob_at, Harness, FLOOR_Y};
use voxsim::{BlockGrid, BlockType, EntityId, EntityPacket, WorldHandle};

const TICK_MS: f64 = 50.0;

struct Scene {
    world: WorldHandle,
    grid: BlockGrid,
    harness: Harness,
}

impl Scene {
    fn spawn_mob(&mut self, position: DVec3) -> EntityId {
        let mut ctx = self.harness.ctx();
        self.world
            .spawn(mob_at(position), &mut ctx)
            .expect("spawn")
    }

    fn tick(&mut self, times: usize) {
        for _ in 0..times {
            self.harness.advance();
            let mut ctx = self.harness.ctx();
            self.world.tick(TICK_MS, &self.grid, &mut ctx);
        }
    }

    fn ignite(&mut self, id: EntityId, ticks: u32) {
        let mut ctx = self.harness.ctx();
        self.world
            .get_mut(id)
            .expect("registered")
            .start_burning(ticks, &mut ctx);
    }

    fn fill(&mut self, min: (i32, i32, i32), max: (i32, i32, i32), block: BlockType) {
        for x in min.0..=max.0 {
            for y in min.1..=max.1 {
                for z in min.2..=max.2 {
                    self.grid.set_block((x, y, z), block);
                }
            }
        }
    }

    fn metadata_packets(&self) -> Vec<bool> {
        self.harness
            .events
            .packets()
            .into_iter()
            .filter_map(|packet| match packet {
                EntityPacket::Metadata { flags, .. } => Some(flags.on_fire),
                _ => None,
            })
            .collect()
    }
}

#[fixture]
fn scene() -> Scene {
    Scene {
        world: WorldHandle::new(),
        grid: flat_world(),
        harness: Harness::default(),
    }
}

fn on_floor() -> DVec3 {
    DVec3::new(8.5, f64::from(FLOOR_Y + 1), 8.5)
}

#[rstest]
fn burning_out_notifies_once(mut scene: Scene) {
    let id = scene.spawn_mob(on_floor());
    scene.ignite(id, 30);
    scene.tick(45);

    assert_eq!(scene.metadata_packets(), vec![true, false]);
    let mob = scene.world.get(id).expect("registered");
    assert!(!mob.is_on_fire());
    assert_eq!(mob.health(), 19, "one burn damage after twenty ticks");
}

#[rstest]
fn water_puts_the_fire_out_with_one_notification(mut scene: Scene) {
    let feet = FLOOR_Y + 1;
    scene.fill((7, feet, 7), (9, feet + 1, 9), BlockType::StationaryWater);
    let id = scene.spawn_mob(on_floor());
    scene.ignite(id, 200);
    scene.tick(10);

    assert_eq!(scene.metadata_packets(), vec![true, false]);
    assert!(!scene.world.get(id).expect("registered").is_on_fire());
}

#[rstest]
fn standing_in_fire_keeps_the_entity_burning(mut scene: Scene) {
    let feet = FLOOR_Y + 1;
    scene.grid.set_block((8, feet, 8), BlockType::Fire);
    let id = scene.spawn_mob(on_floor());
    scene.tick(10);

    let mob = scene.world.get(id).expect("registered");
    assert!(mob.is_on_fire());
    assert_eq!(mob.ticks_left_burning(), 200);
    assert_eq!(mob.health(), 19, "one fire contact damage after ten ticks");
    assert_eq!(scene.metadata_packets(), vec![true]);
}

#[rstest]
#[case(19, 20)]
#[case(20, 18)]
#[case(39, 18)]
#[case(40, 16)]
fn void_damage_every_twenty_ticks(mut scene: Scene, #[case] ticks: usize, #[case] health: i32) {
    let id = {
        let mob = mob_at(DVec3::new(8.5, -100.0, 8.5)).with_gravity(0.0);
        let mut ctx = scene.harness.ctx();
        scene.world.spawn(mob, &mut ctx).expect("spawn")
    };
    scene.tick(ticks);
    assert_eq!(scene.world.get(id).expect("registered").health(), health);
}

#[rstest]
fn submerged_entities_float_and_use_air(mut scene: Scene) {
    let feet = FLOOR_Y + 1;
    scene.fill((7, feet, 7), (9, feet + 6, 9), BlockType::StationaryWater);
    let id = scene.spawn_mob(DVec3::new(8.5, f64::from(feet + 1), 8.5));
    scene.tick(1);

    let mob = scene.world.get(id).expect("registered");
    assert!(mob.is_submerged());
    assert!(mob.is_swimming());
    assert_eq!(mob.air_level(), 299);
    assert!((mob.velocity().y - 1.0).abs() < 1e-9);
}

#[rstest]
fn drowning_starts_after_air_and_timer_run_out(mut scene: Scene) {
    scene.harness.config.air.max_air = 0;
    scene.harness.config.air.drowning_ticks = 2;
    let feet = FLOOR_Y + 1;
    scene.fill((7, feet, 7), (9, feet + 8, 9), BlockType::StationaryWater);
    let id = scene.spawn_mob(DVec3::new(8.5, f64::from(feet + 1), 8.5));

    scene.tick(2);
    assert_eq!(scene.world.get(id).expect("registered").health(), 20);
    scene.tick(1);
    let mob = scene.world.get(id).expect("registered");
    assert_eq!(mob.health(), 19);
    assert_eq!(mob.air_timer(), 2);
}
