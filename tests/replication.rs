//! Movement replication driven through the arena.

use glam::DVec3;
use rstest::rstest;
use test_utils::{flat_world, mob_at, Harness};
use voxsim::{ClientId, Entity, EntityKind, EntityPacket, PlayerState, WorldHandle};

#[rstest]
fn players_do_not_receive_their_own_movement() {
    let mut harness = Harness::default();
    let mut world = WorldHandle::new();
    let avatar = Entity::new(
        EntityKind::Player(PlayerState {
            client: Some(ClientId(7)),
            ..PlayerState::default()
        }),
        DVec3::new(0.0, 64.0, 0.0),
    );
    let player = world.spawn(avatar, &mut harness.ctx()).expect("spawn player");
    let mob = world
        .spawn(mob_at(DVec3::new(4.0, 64.0, 0.0)), &mut harness.ctx())
        .expect("spawn mob");
    for id in [player, mob] {
        world
            .get_mut(id)
            .expect("registered")
            .add_position(DVec3::new(5.0 / 32.0, 0.0, 0.0));
    }
    harness.events.sent.clear();
    harness.events.age = 2;

    world.broadcast_movement_updates(&mut harness.ctx());

    assert_eq!(
        harness.events.sent,
        vec![
            (
                EntityPacket::RelMove {
                    entity: player,
                    delta: [5, 0, 0],
                },
                Some(ClientId(7)),
            ),
            (
                EntityPacket::RelMove {
                    entity: mob,
                    delta: [5, 0, 0],
                },
                None,
            ),
        ]
    );
}

#[rstest]
fn falling_entity_reports_velocity_then_moves() {
    let grid = flat_world();
    let mut harness = Harness::default();
    let mut world = WorldHandle::new();
    let id = world
        .spawn(mob_at(DVec3::new(8.5, 80.0, 8.5)), &mut harness.ctx())
        .expect("spawn");
    harness.events.take();

    for _ in 0..4 {
        harness.advance();
        let mut ctx = harness.ctx();
        world.tick(50.0, &grid, &mut ctx);
        world.broadcast_movement_updates(&mut ctx);
    }

    let sent = harness.events.take();
    assert!(sent
        .iter()
        .any(|p| matches!(p, EntityPacket::Velocity { entity, .. } if *entity == id)));
    assert!(sent
        .iter()
        .any(|p| matches!(p, EntityPacket::RelMove { entity, delta: [0, dy, 0] } if *entity == id && *dy < 0)));
}

#[rstest]
fn landing_announces_the_stop() {
    let grid = flat_world();
    let mut harness = Harness::default();
    let mut world = WorldHandle::new();
    let id = world
        .spawn(mob_at(DVec3::new(8.5, 66.0, 8.5)), &mut harness.ctx())
        .expect("spawn");
    harness.events.take();

    for _ in 0..60 {
        harness.advance();
        let mut ctx = harness.ctx();
        world.tick(50.0, &grid, &mut ctx);
        world.broadcast_movement_updates(&mut ctx);
    }

    let mob = world.get(id).expect("registered");
    assert!(mob.is_on_ground());
    assert_eq!(mob.velocity(), DVec3::ZERO);
    let last = harness
        .events
        .take()
        .into_iter()
        .filter_map(|p| match p {
            EntityPacket::Velocity { entity, velocity } if entity == id => Some(velocity),
            _ => None,
        })
        .last();
    assert_eq!(last, Some([0.0, 0.0, 0.0]));
}

#[rstest]
fn teleporting_onto_another_entity() {
    let mut harness = Harness::at_age(30);
    let mut world = WorldHandle::new();
    let traveller = world
        .spawn(mob_at(DVec3::ZERO), &mut harness.ctx())
        .expect("spawn");
    let beacon = world
        .spawn(mob_at(DVec3::new(100.0, 70.0, -40.0)), &mut harness.ctx())
        .expect("spawn");
    harness.events.take();

    world
        .teleport_to_entity(traveller, beacon, &mut harness.ctx())
        .expect("both live");

    let moved = world.get(traveller).expect("registered");
    assert_eq!(moved.position(), DVec3::new(100.0, 70.0, -40.0));
    assert!(!moved.replication().dirty_position);
    let sent = harness.events.take();
    assert!(matches!(
        sent.as_slice(),
        [EntityPacket::Teleport { entity, position, .. }]
            if *entity == traveller && *position == [100.0, 70.0, -40.0]
    ));
}
