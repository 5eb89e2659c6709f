//! Simulation constants shared across the integrator, the status ticker and
//! the replication scheduler.
//!
//! Values that servers commonly tune are mirrored by [`crate::SimConfig`],
//! which uses these as its defaults.

/// Horizontal size of a chunk column in blocks.
pub const CHUNK_WIDTH: i32 = 16;
/// Vertical extent of the world in blocks. Valid feet cells are `0..CHUNK_HEIGHT`.
pub const CHUNK_HEIGHT: i32 = 256;

/// Default downward acceleration in blocks per second squared.
pub const DEFAULT_GRAVITY: f64 = -9.81;
/// Default entity mass. Also the floor applied to non-positive masses.
pub const DEFAULT_MASS: f64 = 0.001;
/// Hard bound on each velocity component.
pub const MAX_SPEED: f64 = 78.0;
/// Squared speed below which an entity counts as stationary.
pub const STATIONARY_SPEED_SQ: f64 = 0.0004;
/// Horizontal damping factor applied while on the ground.
pub const GROUND_FRICTION: f64 = 0.7;
/// Horizontal speed components smaller than this snap to zero.
pub const SPEED_SNAP_THRESHOLD: f64 = 0.05;
/// Gravity divisor while the entity occupies water.
pub const WATER_GRAVITY_DIVISOR: f64 = 3.0;
/// Vertical velocity multiplier inside cobweb.
pub const COBWEB_VERTICAL_DAMPING: f64 = 0.05;
/// Horizontal velocity multiplier inside cobweb.
pub const COBWEB_HORIZONTAL_DAMPING: f64 = 0.25;
/// Speed imparted by a flowing water cell.
pub const WATER_FLOW_SPEED: f64 = 0.2;
/// Per-tick decay of the residual water-flow velocity.
pub const WATER_FLOW_DECAY: f64 = 0.9;
/// Distance, in blocks, that the collision tracer looks ahead.
pub const TRACE_DISTANCE: f64 = 2.0;
/// Offset from a hit point along a horizontal surface normal.
pub const HIT_LATERAL_OFFSET: f64 = 0.3;
/// Offset from a hit point along a vertical surface normal. Larger values
/// make resting entities vibrate.
pub const HIT_VERTICAL_OFFSET: f64 = 0.05;
/// Upward displacement used when an entity is boxed in by solid blocks.
pub const PUSH_OUT_LIFT: f64 = 0.5;
/// Riders farther than this from their mount are snapped onto it.
pub const ATTACH_SNAP_DISTANCE: f64 = 0.5;

/// Ticks an entity keeps burning after leaving fire or lava.
pub const BURN_TICKS: u32 = 200;
/// Ticks between two on-fire damage applications.
pub const BURN_TICKS_PER_DAMAGE: u32 = 20;
/// Damage dealt by each on-fire application.
pub const BURN_DAMAGE: i32 = 1;
/// Ticks between two fire-contact damage applications.
pub const FIRE_TICKS_PER_DAMAGE: u32 = 10;
/// Damage dealt by each fire-contact application.
pub const FIRE_DAMAGE: i32 = 1;
/// Ticks between two lava-contact damage applications.
pub const LAVA_TICKS_PER_DAMAGE: u32 = 10;
/// Damage dealt by each lava-contact application.
pub const LAVA_DAMAGE: i32 = 5;

/// Entities whose vertical position is below this take void damage.
pub const VOID_BOUNDARY: f64 = -46.0;
/// Ticks spent below the void boundary between two void damage applications.
pub const VOID_TICKS_PER_DAMAGE: u32 = 20;
/// Damage dealt by each void application.
pub const VOID_DAMAGE: i32 = 2;

/// Air reserve of an entity that just surfaced.
pub const MAX_AIR_LEVEL: i32 = 300;
/// Ticks between two drowning damage applications once out of air.
pub const DROWNING_TICKS: i32 = 10;
/// Damage dealt by each drowning application.
pub const DROWNING_DAMAGE: i32 = 1;
/// Upward speed applied to submerged entities.
pub const SUBMERGED_FLOAT_SPEED: f64 = 1.0;

/// Bonus damage of a critical (airborne) player hit.
pub const CRITICAL_HIT_BONUS: i32 = 2;
/// Knockback heading multiplier for a sprinting attacker.
pub const SPRINT_KNOCKBACK: f64 = 10.0;
/// Knockback heading multiplier for a walking attacker.
pub const WALK_KNOCKBACK: f64 = 8.0;
/// Fixed vertical component of the knockback heading.
pub const KNOCKBACK_LIFT: f64 = 2.0;
/// Multiplier applied when a knockback vector becomes a velocity impulse.
pub const KNOCKBACK_IMPULSE_SCALE: f64 = 2.0;

/// Fixed-point scale of relative-move packets (1/32 block).
pub const FIXED_POINT_SCALE: f64 = 32.0;
/// Ticks between forced absolute position updates.
pub const TELEPORT_INTERVAL_TICKS: u64 = 400;
/// Ticks after which a dirty position is sent even without enough drift.
pub const REL_MOVE_INTERVAL_TICKS: u64 = 60;
/// Fixed-point drift that triggers a relative move.
pub const REL_MOVE_THRESHOLD: i64 = 4;
/// Minimum ticks between two velocity packets.
pub const VELOCITY_INTERVAL_TICKS: u64 = 2;
