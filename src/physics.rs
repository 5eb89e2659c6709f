//! Physics integrator.
//!
//! Advances one entity's position and velocity by one tick: push-out from
//! solid blocks, gravity by medium, ground friction, water flow and a traced
//! collision response. The step works on a scratch copy of the kinematic
//! state and commits it only once the destination column is known to be
//! loaded, so a failed lookup never leaves the entity half-updated.

use glam::DVec3;
use log::debug;

use crate::block::{BlockPos, BlockType, FlowDirection};
use crate::entity::Entity;
use crate::numeric::floor_to_i32;
use crate::spatial::Chunk;
use crate::{
    CHUNK_HEIGHT, COBWEB_HORIZONTAL_DAMPING, COBWEB_VERTICAL_DAMPING, DEFAULT_MASS,
    GROUND_FRICTION, HIT_LATERAL_OFFSET, HIT_VERTICAL_OFFSET, MAX_SPEED, PUSH_OUT_LIFT,
    SPEED_SNAP_THRESHOLD, STATIONARY_SPEED_SQ, TRACE_DISTANCE, WATER_FLOW_DECAY,
    WATER_FLOW_SPEED, WATER_GRAVITY_DIVISOR,
};

/// Smallest acceptable mass to avoid numerically unstable accelerations.
const MIN_MASS: f64 = 1e-12;

/// Cells tried, in order, when pushing an entity out of a solid block.
const PUSH_OUT_ORDER: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// How a physics step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The new state was written back.
    Committed,
    /// The destination column is not loaded; the entity is unchanged.
    Discarded,
    /// A block lookup failed mid-step; the entity is unchanged.
    Aborted,
}

/// Computes acceleration from a force vector and optional mass.
///
/// Returns `None` if `mass` is non-positive or effectively zero (see
/// [`MIN_MASS`]). When `mass` is `None` the [`DEFAULT_MASS`] constant is
/// used.
///
/// # Examples
///
/// ```
/// use glam::DVec3;
/// use voxsim::physics::applied_acceleration;
/// let a = applied_acceleration(DVec3::new(7.0, -14.0, 21.0), Some(7.0)).unwrap();
/// assert!((a - DVec3::new(1.0, -2.0, 3.0)).length() < 1e-9);
/// ```
#[must_use]
pub fn applied_acceleration(force: DVec3, mass: Option<f64>) -> Option<DVec3> {
    match mass {
        Some(m) if m > MIN_MASS => Some(force / m),
        Some(_) => None,
        None => Some(force / DEFAULT_MASS),
    }
}

/// Clamps every component into `[-MAX_SPEED, MAX_SPEED]`.
#[must_use]
pub fn clamp_velocity(velocity: DVec3) -> DVec3 {
    velocity.clamp(DVec3::splat(-MAX_SPEED), DVec3::splat(MAX_SPEED))
}

fn snap_small(value: f64) -> f64 {
    if value.abs() < SPEED_SNAP_THRESHOLD {
        0.0
    } else {
        value
    }
}

/// Scratch copy of everything a step may change.
#[derive(Debug, Clone, Copy)]
struct Kinematics {
    position: DVec3,
    velocity: DVec3,
    on_ground: bool,
    water_speed: DVec3,
}

impl Kinematics {
    const fn capture(entity: &Entity) -> Self {
        Self {
            position: entity.position,
            velocity: entity.velocity,
            on_ground: entity.on_ground,
            water_speed: entity.water_speed,
        }
    }

    fn set_velocity(&mut self, velocity: DVec3) {
        self.velocity = clamp_velocity(velocity);
    }
}

/// Advances `entity` by `dt_ms` milliseconds inside `chunk`, the loaded
/// column the entity occupies.
pub fn step(entity: &mut Entity, dt_ms: f64, chunk: &Chunk<'_>) -> StepOutcome {
    let dt = dt_ms / 1000.0;
    let mut next = Kinematics::capture(entity);
    let feet = BlockPos::containing(next.position);

    if !(0..CHUNK_HEIGHT).contains(&feet.y) {
        // Above or below the world there is nothing to collide with.
        next.position += next.velocity * dt;
        return commit(entity, next, chunk);
    }

    let Some(block_in) = chunk.block_at(feet) else {
        return abort(entity, "occupied block");
    };

    if block_in.is_solid() {
        match push_out(chunk, feet) {
            Some(offset) => next.position += offset,
            None => return abort(entity, "push-out neighbour"),
        }
        next.on_ground = true;
    } else if next.on_ground {
        let Some(below) = chunk.block_at(feet.offset(0, -1, 0)) else {
            return abort(entity, "block below");
        };
        if !below.is_solid() {
            next.on_ground = false;
        }
    }

    if next.on_ground {
        if next.velocity.length_squared() > STATIONARY_SPEED_SQ {
            let damping = GROUND_FRICTION / (1.0 + dt);
            let v = next.velocity;
            next.set_velocity(DVec3::new(
                snap_small(v.x * damping),
                v.y,
                snap_small(v.z * damping),
            ));
        }
    } else {
        apply_gravity(&mut next, entity.gravity(), block_in, dt);
    }

    if block_in == BlockType::Cobweb {
        let v = next.velocity;
        next.set_velocity(DVec3::new(
            v.x * COBWEB_HORIZONTAL_DAMPING,
            v.y,
            v.z * COBWEB_HORIZONTAL_DAMPING,
        ));
    }

    apply_water_flow(&mut next, chunk.flow_direction(feet));

    if next.velocity != DVec3::ZERO {
        resolve_collision(&mut next, chunk, dt);
    }

    commit(entity, next, chunk)
}

fn apply_gravity(next: &mut Kinematics, gravity: f64, block_in: BlockType, dt: f64) {
    let v = next.velocity;
    if block_in == BlockType::Cobweb {
        next.set_velocity(DVec3::new(v.x, v.y * COBWEB_VERTICAL_DAMPING, v.z));
    } else if block_in.is_water() {
        next.set_velocity(v + DVec3::new(0.0, gravity * dt / WATER_GRAVITY_DIVISOR, 0.0));
    } else {
        next.set_velocity(v + DVec3::new(0.0, gravity * dt, 0.0));
    }
}

fn apply_water_flow(next: &mut Kinematics, flow: Option<FlowDirection>) {
    next.water_speed *= WATER_FLOW_DECAY;
    match flow {
        Some(FlowDirection::XPlus) => next.water_speed.x = WATER_FLOW_SPEED,
        Some(FlowDirection::XMinus) => next.water_speed.x = -WATER_FLOW_SPEED,
        Some(FlowDirection::ZPlus) => next.water_speed.z = WATER_FLOW_SPEED,
        Some(FlowDirection::ZMinus) => next.water_speed.z = -WATER_FLOW_SPEED,
        None => {}
    }
    if flow.is_some() {
        next.on_ground = false;
    }
    next.water_speed.x = snap_small(next.water_speed.x);
    next.water_speed.z = snap_small(next.water_speed.z);
    next.set_velocity(next.velocity + next.water_speed);
}

/// Offset that moves an entity out of the solid block at `feet`, or `None`
/// when a neighbour lookup failed.
fn push_out(chunk: &Chunk<'_>, feet: BlockPos) -> Option<DVec3> {
    for (dx, dz) in PUSH_OUT_ORDER {
        let neighbour = chunk.block_at(feet.offset(dx, 0, dz))?;
        if !neighbour.is_solid() {
            return Some(DVec3::new(f64::from(dx), 0.0, f64::from(dz)));
        }
    }
    Some(DVec3::new(0.0, PUSH_OUT_LIFT, 0.0))
}

fn resolve_collision(next: &mut Kinematics, chunk: &Chunk<'_>, dt: f64) {
    let travel = next.velocity * dt;
    let Some(hit) = chunk
        .trace(next.position, next.velocity, TRACE_DISTANCE)
        .filter(|found| found.position.distance_squared(next.position) <= travel.length_squared())
    else {
        next.position += travel;
        return;
    };

    let mut v = next.velocity;
    if hit.normal.x != 0.0 {
        v.x = 0.0;
    }
    if hit.normal.y != 0.0 {
        v.y = 0.0;
        if hit.normal.y > 0.0 {
            next.on_ground = true;
        }
    }
    if hit.normal.z != 0.0 {
        v.z = 0.0;
    }
    next.set_velocity(v);
    next.position = hit.position
        + hit.normal * DVec3::new(HIT_LATERAL_OFFSET, HIT_VERTICAL_OFFSET, HIT_LATERAL_OFFSET);
}

fn commit(entity: &mut Entity, next: Kinematics, chunk: &Chunk<'_>) -> StepOutcome {
    let destination = chunk.neighbor_chunk(
        floor_to_i32(next.position.x),
        floor_to_i32(next.position.z),
    );
    if destination.is_none() {
        debug!(
            "entity {} step discarded: destination column not loaded",
            entity.id()
        );
        return StepOutcome::Discarded;
    }
    if next.position != entity.position {
        entity.set_position(next.position);
    }
    if next.velocity != entity.velocity {
        entity.velocity = next.velocity;
        entity.replication.dirty_velocity = true;
    }
    entity.on_ground = next.on_ground;
    entity.water_speed = next.water_speed;
    StepOutcome::Committed
}

fn abort(entity: &Entity, what: &str) -> StepOutcome {
    debug!("entity {} step aborted: {what} not loaded", entity.id());
    StepOutcome::Aborted
}
