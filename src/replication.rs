//! Replication scheduler.
//!
//! Decides which movement packets an entity owes its observers. Physics and
//! setters only raise dirty flags; the functions here are the only place
//! that clears them and moves the "last sent" snapshots forward.

use glam::DVec3;

use crate::entity::Entity;
use crate::events::{ClientId, SimContext};
use crate::numeric::{fit_i8, to_fixed_point};
use crate::protocol::{wire_vec, EntityPacket};
use crate::STATIONARY_SPEED_SQ;

/// What was last sent for an entity and what has changed since.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationState {
    /// Position changed since the last position packet.
    pub dirty_position: bool,
    /// Yaw, pitch or roll changed since the last orientation packet.
    pub dirty_orientation: bool,
    /// Head yaw changed since the last head packet.
    pub dirty_head_yaw: bool,
    /// Velocity changed since the last velocity packet.
    pub dirty_velocity: bool,
    /// Position observers currently believe the entity is at.
    pub last_position: DVec3,
    /// World age of the last absolute position packet.
    pub last_teleport: u64,
    /// World age of the last relative move packet.
    pub last_rel_move: u64,
    /// World age of the last velocity packet.
    pub last_velocity: u64,
}

impl ReplicationState {
    /// Fresh state for an entity observers see at `position`.
    #[must_use]
    pub const fn new(position: DVec3) -> Self {
        Self {
            dirty_position: false,
            dirty_orientation: false,
            dirty_head_yaw: false,
            dirty_velocity: false,
            last_position: position,
            last_teleport: 0,
            last_rel_move: 0,
            last_velocity: 0,
        }
    }

    pub(crate) const fn stamp_spawn(&mut self, world_age: u64) {
        self.last_teleport = world_age;
        self.last_rel_move = world_age;
        self.last_velocity = world_age;
    }
}

/// Fixed-point drift between two positions, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drift {
    x: i64,
    y: i64,
    z: i64,
}

impl Drift {
    fn between(current: DVec3, last: DVec3) -> Self {
        Self {
            x: to_fixed_point(current.x) - to_fixed_point(last.x),
            y: to_fixed_point(current.y) - to_fixed_point(last.y),
            z: to_fixed_point(current.z) - to_fixed_point(last.z),
        }
    }

    /// The drift as a relative-move payload, if every axis fits a byte.
    fn packed(self) -> Option<[i8; 3]> {
        Some([fit_i8(self.x)?, fit_i8(self.y)?, fit_i8(self.z)?])
    }

    fn largest(self) -> i64 {
        self.x.abs().max(self.y.abs()).max(self.z.abs())
    }
}

/// Broadcasts whatever movement updates `entity` is due, skipping `exclude`.
///
/// Velocity is considered every call; position and orientation only on
/// even world ages.
pub fn broadcast_movement_update(
    entity: &mut Entity,
    ctx: &mut SimContext<'_>,
    exclude: Option<ClientId>,
) {
    let age = ctx.world_age();
    let cadence = &ctx.config.replication;
    let (teleport_interval, rel_move_interval, rel_move_threshold, velocity_interval) = (
        cadence.teleport_interval,
        cadence.rel_move_interval,
        cadence.rel_move_threshold,
        cadence.velocity_interval,
    );
    let id = entity.id();
    let position = entity.position();
    let velocity = entity.velocity();
    let (yaw, pitch, head_yaw) = (entity.yaw(), entity.pitch(), entity.head_yaw());
    let rep = &mut entity.replication;

    if (velocity.length_squared() > STATIONARY_SPEED_SQ || rep.dirty_velocity)
        && age.saturating_sub(rep.last_velocity) >= velocity_interval
    {
        ctx.events.broadcast(
            EntityPacket::Velocity {
                entity: id,
                velocity: wire_vec(velocity),
            },
            exclude,
        );
        rep.dirty_velocity = false;
        rep.last_velocity = age;
    }

    if age % 2 != 0 {
        return;
    }

    let drift = Drift::between(position, rep.last_position);
    let packed = drift.packed();
    let teleport_due = age.saturating_sub(rep.last_teleport) >= teleport_interval;

    match packed {
        Some(delta) if !teleport_due => {
            let move_due = drift.largest() >= rel_move_threshold
                || age.saturating_sub(rep.last_rel_move) >= rel_move_interval;
            if rep.dirty_position && move_due {
                let packet = if rep.dirty_orientation {
                    rep.dirty_orientation = false;
                    EntityPacket::RelMoveLook {
                        entity: id,
                        delta,
                        yaw,
                        pitch,
                    }
                } else {
                    EntityPacket::RelMove { entity: id, delta }
                };
                ctx.events.broadcast(packet, exclude);
                rep.last_position = position;
                rep.dirty_position = false;
                rep.last_rel_move = age;
            } else if rep.dirty_orientation {
                ctx.events.broadcast(
                    EntityPacket::Look {
                        entity: id,
                        yaw,
                        pitch,
                    },
                    exclude,
                );
                rep.dirty_orientation = false;
            }
        }
        _ => {
            ctx.events.broadcast(
                EntityPacket::Teleport {
                    entity: id,
                    position: wire_vec(position),
                    yaw,
                    pitch,
                },
                exclude,
            );
            rep.last_teleport = age;
            rep.last_rel_move = age;
            rep.last_position = position;
            rep.dirty_position = false;
            rep.dirty_orientation = false;
        }
    }

    if rep.dirty_head_yaw {
        ctx.events.broadcast(EntityPacket::HeadLook { entity: id, head_yaw }, exclude);
        rep.dirty_head_yaw = false;
    }
}

impl Entity {
    /// Moves the entity and tells observers right away with an absolute
    /// position packet.
    pub fn teleport_to(&mut self, position: DVec3, ctx: &mut SimContext<'_>) {
        self.set_position(position);
        let age = ctx.world_age();
        ctx.broadcast(EntityPacket::Teleport {
            entity: self.id(),
            position: wire_vec(position),
            yaw: self.yaw(),
            pitch: self.pitch(),
        });
        let rep = &mut self.replication;
        rep.last_position = position;
        rep.last_teleport = age;
        rep.last_rel_move = age;
        rep.dirty_position = false;
        rep.dirty_orientation = false;
    }
}
