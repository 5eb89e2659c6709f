//! Behaviour-driven tests using rust-rspec.
//!
//! These tests drop an entity onto the flat test world and check that it
//! settles on the floor.

use glam::DVec3;
use std::fmt;
use std::sync::{Arc, Mutex};
use test_utils::{flat_world, mob_at, Harness, FLOOR_Y};
use voxsim::{BlockGrid, EntityId, WorldHandle, HIT_VERTICAL_OFFSET};

const TICK_MS: f64 = 50.0;

struct Inner {
    world: WorldHandle,
    grid: BlockGrid,
    harness: Harness,
    entity: Option<EntityId>,
}

#[derive(Clone)]
struct LandingWorld {
    inner: Arc<Mutex<Inner>>,
}

impl fmt::Debug for LandingWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().expect("world lock");
        f.debug_struct("LandingWorld")
            .field("entity", &inner.entity)
            .finish()
    }
}

impl Default for LandingWorld {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                world: WorldHandle::new(),
                grid: flat_world(),
                harness: Harness::default(),
                entity: None,
            })),
        }
    }
}

impl LandingWorld {
    fn setup(&mut self) {
        let mut guard = self.inner.lock().expect("world lock");
        let inner = &mut *guard;
        let mut ctx = inner.harness.ctx();
        inner.world.shutdown(&mut ctx);
        let mob = mob_at(DVec3::new(8.5, f64::from(FLOOR_Y) + 3.0, 8.5));
        let id = inner.world.spawn(mob, &mut ctx).expect("spawn mob");
        inner.entity = Some(id);
    }

    fn tick(&mut self, times: usize) {
        let mut guard = self.inner.lock().expect("world lock");
        let inner = &mut *guard;
        for _ in 0..times {
            inner.harness.advance();
            let mut ctx = inner.harness.ctx();
            inner.world.tick(TICK_MS, &inner.grid, &mut ctx);
        }
    }

    fn assert_resting(&self) {
        let inner = self.inner.lock().expect("world lock");
        let id = inner.entity.expect("entity not spawned");
        let entity = inner.world.get(id).expect("entity registered");
        assert!(entity.is_on_ground(), "entity should be on the ground");
        assert!(
            entity.velocity().y.abs() < 1e-9,
            "expected no vertical speed, got {}",
            entity.velocity().y
        );
        let expected = f64::from(FLOOR_Y + 1) + HIT_VERTICAL_OFFSET;
        assert!(
            (entity.position().y - expected).abs() < 1e-6,
            "expected y {expected}, got {}",
            entity.position().y
        );
    }

    fn assert_falling(&self) {
        let inner = self.inner.lock().expect("world lock");
        let id = inner.entity.expect("entity not spawned");
        let entity = inner.world.get(id).expect("entity registered");
        assert!(!entity.is_on_ground());
        assert!(entity.velocity().y < 0.0);
        assert!(entity.position().y < f64::from(FLOOR_Y) + 3.0);
    }
}

#[test]
fn dropped_entity_settles_on_the_floor() {
    rspec::run(&rspec::given(
        "a flat world with a mob three blocks above the floor",
        LandingWorld::default(),
        |ctx| {
            ctx.before_each(|world| world.setup());
            ctx.when("the world ticks once", |ctx| {
                ctx.before_each(|world| world.tick(1));
                ctx.then("the mob is falling", |world| {
                    world.assert_falling();
                });
            });
            ctx.when("the world ticks for three seconds", |ctx| {
                ctx.before_each(|world| world.tick(60));
                ctx.then("the mob rests on the floor", |world| {
                    world.assert_resting();
                });
            });
        },
    ));
}
