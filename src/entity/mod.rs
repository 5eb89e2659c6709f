//! The entity record: kinematics, vitals, status timers, replication
//! bookkeeping and attachment links of one simulated actor.
//!
//! Entities are owned by a [`crate::WorldHandle`]. Construction only
//! allocates an identifier; an entity becomes live when the arena spawns it
//! and must be destroyed through the arena before it is dropped.

mod capability;
mod kind;

use glam::DVec3;
use log::error;

use crate::config::SimConfig;
use crate::ids::{next_entity_id, EntityId};
use crate::items::Equipment;
use crate::physics::{applied_acceleration, clamp_velocity};
use crate::protocol::{KindTag, MetadataFlags};
use crate::replication::ReplicationState;
use crate::status::{AirState, BurnState};
use crate::vector_math::{
    look_vector, normalize_angle_degrees, pitch_from_direction, yaw_from_direction,
};
use crate::{DEFAULT_GRAVITY, DEFAULT_MASS};

pub use capability::{Attachable, Damageable, LootSource, Tickable};
pub use kind::{EntityKind, MobState, PlayerState};

/// Where an entity is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Constructed but not yet announced to the world.
    #[default]
    Pending,
    /// Registered and ticking.
    Live,
    /// Marked for removal; no longer ticks.
    Destroyed,
}

/// One simulated actor.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    pub(crate) lifecycle: Lifecycle,

    pub(crate) position: DVec3,
    yaw: f64,
    pitch: f64,
    roll: f64,
    head_yaw: f64,
    pub(crate) velocity: DVec3,
    width: f64,
    height: f64,
    mass: f64,
    gravity: f64,

    health: i32,
    max_health: i32,
    fireproof: bool,

    pub(crate) burn: BurnState,
    pub(crate) void_ticks: u32,
    pub(crate) air: AirState,
    pub(crate) swimming: bool,
    pub(crate) submerged: bool,
    pub(crate) on_ground: bool,
    pub(crate) water_speed: DVec3,

    pub(crate) replication: ReplicationState,

    pub(crate) attached_to: Option<EntityId>,
    pub(crate) attachee: Option<EntityId>,

    equipment: Equipment,
}

impl Entity {
    /// Creates a pending entity at `position` with zero velocity.
    #[must_use]
    pub fn new(kind: EntityKind, position: DVec3) -> Self {
        let (width, height) = kind.default_size();
        let max_health = kind.default_max_health();
        Self {
            id: next_entity_id(),
            kind,
            lifecycle: Lifecycle::Pending,
            position,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            head_yaw: 0.0,
            velocity: DVec3::ZERO,
            width,
            height,
            mass: DEFAULT_MASS,
            gravity: DEFAULT_GRAVITY,
            health: max_health,
            max_health,
            fireproof: false,
            burn: BurnState::default(),
            void_ticks: 0,
            air: AirState::default(),
            swimming: false,
            submerged: false,
            on_ground: false,
            water_speed: DVec3::ZERO,
            replication: ReplicationState::new(position),
            attached_to: None,
            attachee: None,
            equipment: Equipment::default(),
        }
    }

    /// Overrides the bounding box.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self
    }

    /// Overrides the mass; see [`Entity::set_mass`].
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.set_mass(mass);
        self
    }

    /// Overrides the per-entity gravity.
    #[must_use]
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    /// Overrides maximum health and fills health up to it.
    #[must_use]
    pub fn with_max_health(mut self, max_health: i32) -> Self {
        self.max_health = max_health.max(1);
        self.health = self.max_health;
        self
    }

    /// Sets the worn armor and held item.
    #[must_use]
    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self
    }

    /// Sets the initial orientation.
    #[must_use]
    pub fn with_rotation(mut self, yaw: f64, pitch: f64) -> Self {
        self.yaw = normalize_angle_degrees(yaw);
        self.pitch = normalize_angle_degrees(pitch);
        self.head_yaw = self.yaw;
        self
    }

    /// Makes the entity immune to burning damage.
    #[must_use]
    pub fn with_fireproof(mut self, fireproof: bool) -> Self {
        self.fireproof = fireproof;
        self
    }

    /// Process-unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// What the entity is.
    #[must_use]
    pub const fn kind(&self) -> &EntityKind {
        &self.kind
    }

    /// Mutable kind-specific state.
    pub const fn kind_mut(&mut self) -> &mut EntityKind {
        &mut self.kind
    }

    /// Tag announced to clients.
    #[must_use]
    pub const fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    /// Whether this entity is a player.
    #[must_use]
    pub const fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    /// Whether this entity is a mob.
    #[must_use]
    pub const fn is_mob(&self) -> bool {
        matches!(self.kind, EntityKind::Mob(_))
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Whether the entity is registered and ticking.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Live
    }

    /// Whether the entity has been destroyed.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    pub(crate) fn mark_live(&mut self, world_age: u64, config: &SimConfig) {
        self.lifecycle = Lifecycle::Live;
        self.air = AirState::full(&config.air);
        self.replication = ReplicationState::new(self.position);
        self.replication.stamp_spawn(world_age);
    }

    pub(crate) const fn mark_destroyed(&mut self) {
        self.lifecycle = Lifecycle::Destroyed;
    }

    // ----- kinematics -----

    /// World-space position of the entity's feet.
    #[must_use]
    pub const fn position(&self) -> DVec3 {
        self.position
    }

    /// Moves the entity and flags the position for replication.
    pub const fn set_position(&mut self, position: DVec3) {
        self.position = position;
        self.replication.dirty_position = true;
    }

    /// Moves the entity by `delta`.
    pub fn add_position(&mut self, delta: DVec3) {
        self.set_position(self.position + delta);
    }

    /// Velocity in blocks per second.
    #[must_use]
    pub const fn velocity(&self) -> DVec3 {
        self.velocity
    }

    /// Replaces the velocity, clamped to the speed bound, and flags it for
    /// replication.
    pub fn set_velocity(&mut self, velocity: DVec3) {
        self.velocity = clamp_velocity(velocity);
        self.replication.dirty_velocity = true;
    }

    /// Adds `delta` to the velocity.
    pub fn add_velocity(&mut self, delta: DVec3) {
        self.set_velocity(self.velocity + delta);
    }

    /// Applies a force for one tick: `F = m·a` with the entity's mass.
    pub fn apply_force(&mut self, force: DVec3) {
        if let Some(acceleration) = applied_acceleration(force, Some(self.mass)) {
            self.add_velocity(acceleration);
        }
    }

    /// Yaw in degrees, within `(-180, 180]`.
    #[must_use]
    pub const fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Pitch in degrees; positive looks up.
    #[must_use]
    pub const fn pitch(&self) -> f64 {
        self.pitch
    }

    /// Roll in degrees.
    #[must_use]
    pub const fn roll(&self) -> f64 {
        self.roll
    }

    /// Head yaw in degrees.
    #[must_use]
    pub const fn head_yaw(&self) -> f64 {
        self.head_yaw
    }

    /// Sets yaw and pitch, wrapping both, and flags the orientation.
    pub fn set_rotation(&mut self, yaw: f64, pitch: f64) {
        self.yaw = normalize_angle_degrees(yaw);
        self.pitch = normalize_angle_degrees(pitch);
        self.replication.dirty_orientation = true;
    }

    /// Sets the roll and flags the orientation.
    pub fn set_roll(&mut self, roll: f64) {
        self.roll = normalize_angle_degrees(roll);
        self.replication.dirty_orientation = true;
    }

    /// Sets the head yaw and flags it.
    pub fn set_head_yaw(&mut self, head_yaw: f64) {
        self.head_yaw = normalize_angle_degrees(head_yaw);
        self.replication.dirty_head_yaw = true;
    }

    /// Turns the entity to face along its velocity.
    ///
    /// A near-zero velocity gives yaw and pitch of zero.
    pub fn set_rotation_from_velocity(&mut self) {
        let velocity = self.velocity;
        self.set_rotation(yaw_from_direction(velocity), pitch_from_direction(velocity));
    }

    /// Unit vector the entity is looking along.
    #[must_use]
    pub fn look_vector(&self) -> DVec3 {
        look_vector(self.yaw, self.pitch)
    }

    /// Bounding box width.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Bounding box height.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Mass; always positive.
    #[must_use]
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// Sets the mass. Non-positive or non-finite values fall back to
    /// [`DEFAULT_MASS`].
    pub fn set_mass(&mut self, mass: f64) {
        if mass > 0.0 && mass.is_finite() {
            self.mass = mass;
        } else {
            log::warn!("entity {} given invalid mass {mass}; using default", self.id);
            self.mass = DEFAULT_MASS;
        }
    }

    /// Downward acceleration applied while airborne.
    #[must_use]
    pub const fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Sets the per-entity gravity.
    pub const fn set_gravity(&mut self, gravity: f64) {
        self.gravity = gravity;
    }

    /// Whether the entity rests on a solid block.
    #[must_use]
    pub const fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    /// Whether the entity's feet are in water.
    #[must_use]
    pub const fn is_swimming(&self) -> bool {
        self.swimming
    }

    /// Whether the entity's head is under water.
    #[must_use]
    pub const fn is_submerged(&self) -> bool {
        self.submerged
    }

    /// Residual velocity imparted by flowing water.
    #[must_use]
    pub const fn water_speed(&self) -> DVec3 {
        self.water_speed
    }

    // ----- vitals -----

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Sets health, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    /// Sets maximum health (at least 1) and clamps current health to it.
    pub fn set_max_health(&mut self, max_health: i32) {
        self.max_health = max_health.max(1);
        self.health = self.health.min(self.max_health);
    }

    /// Restores up to `amount` health.
    pub fn heal(&mut self, amount: i32) {
        self.set_health(self.health.saturating_add(amount.max(0)));
    }

    /// Whether health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health <= 0
    }

    /// Whether burning damage is ignored.
    #[must_use]
    pub const fn is_fireproof(&self) -> bool {
        self.fireproof
    }

    /// Ticks until the fire goes out.
    #[must_use]
    pub const fn ticks_left_burning(&self) -> u32 {
        self.burn.ticks_left
    }

    /// Whether the entity is burning.
    #[must_use]
    pub const fn is_on_fire(&self) -> bool {
        self.burn.ticks_left > 0
    }

    /// Remaining air reserve.
    #[must_use]
    pub const fn air_level(&self) -> i32 {
        self.air.level
    }

    /// Ticks left before the next drowning damage once out of air.
    #[must_use]
    pub const fn air_timer(&self) -> i32 {
        self.air.timer
    }

    /// Consecutive ticks spent below the void boundary.
    #[must_use]
    pub const fn ticks_in_void(&self) -> u32 {
        self.void_ticks
    }

    /// Worn armor and held item.
    #[must_use]
    pub const fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    /// Mutable equipment.
    pub const fn equipment_mut(&mut self) -> &mut Equipment {
        &mut self.equipment
    }

    /// Replication bookkeeping.
    #[must_use]
    pub const fn replication(&self) -> &ReplicationState {
        &self.replication
    }

    /// Flags sent in metadata packets.
    #[must_use]
    pub fn metadata_flags(&self) -> MetadataFlags {
        let player = self.kind.as_player();
        MetadataFlags {
            on_fire: self.is_on_fire(),
            crouched: player.is_some_and(|p| p.crouched),
            sprinting: player.is_some_and(|p| p.sprinting),
            riding: self.attached_to.is_some(),
        }
    }
}

impl Drop for Entity {
    fn drop(&mut self) {
        if self.lifecycle != Lifecycle::Live {
            return;
        }
        error!("entity {} dropped while still live", self.id);
        if !std::thread::panicking() {
            debug_assert!(
                self.lifecycle != Lifecycle::Live,
                "entity {} must be destroyed before it is dropped",
                self.id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn mob() -> Entity {
        Entity::new(EntityKind::mob(), DVec3::new(0.5, 64.0, 0.5))
    }

    #[rstest]
    fn new_entities_are_pending_and_at_rest(mob: Entity) {
        assert_eq!(mob.lifecycle(), Lifecycle::Pending);
        assert_eq!(mob.velocity(), DVec3::ZERO);
        assert_eq!(mob.health(), mob.max_health());
    }

    #[rstest]
    fn ids_increase_with_construction(mob: Entity) {
        let later = Entity::new(EntityKind::Other, DVec3::ZERO);
        assert!(later.id() > mob.id());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-3.0)]
    #[case(f64::NAN)]
    fn invalid_mass_falls_back_to_default(mut mob: Entity, #[case] mass: f64) {
        mob.set_mass(mass);
        assert_relative_eq!(mob.mass(), DEFAULT_MASS);
    }

    #[rstest]
    #[case(25, 20)]
    #[case(-4, 0)]
    #[case(7, 7)]
    fn set_health_clamps(mut mob: Entity, #[case] health: i32, #[case] expected: i32) {
        mob.set_health(health);
        assert_eq!(mob.health(), expected);
    }

    #[rstest]
    fn lowering_max_health_clamps_current(mut mob: Entity) {
        mob.set_max_health(8);
        assert_eq!(mob.health(), 8);
        mob.set_max_health(0);
        assert_eq!(mob.max_health(), 1);
        assert_eq!(mob.health(), 1);
    }

    #[rstest]
    fn heal_stops_at_max(mut mob: Entity) {
        mob.set_health(15);
        mob.heal(3);
        assert_eq!(mob.health(), 18);
        mob.heal(100);
        assert_eq!(mob.health(), 20);
        mob.heal(-5);
        assert_eq!(mob.health(), 20);
    }

    #[rstest]
    fn velocity_is_clamped(mut mob: Entity) {
        mob.set_velocity(DVec3::new(500.0, -500.0, 3.0));
        assert_eq!(mob.velocity(), DVec3::new(78.0, -78.0, 3.0));
        assert!(mob.replication().dirty_velocity);
    }

    #[rstest]
    fn apply_force_divides_by_mass(mut mob: Entity) {
        mob.set_mass(2.0);
        mob.apply_force(DVec3::new(4.0, 0.0, -2.0));
        assert_relative_eq!(mob.velocity().x, 2.0);
        assert_relative_eq!(mob.velocity().z, -1.0);
    }

    #[rstest]
    fn rotation_follows_velocity(mut mob: Entity) {
        mob.set_velocity(DVec3::new(1.0, 0.0, 0.0));
        mob.set_rotation_from_velocity();
        assert_relative_eq!(mob.yaw(), 90.0);
        assert_relative_eq!(mob.pitch(), 0.0);
        assert!(mob.replication().dirty_orientation);
    }

    #[rstest]
    fn rotation_from_zero_velocity_is_zero(mut mob: Entity) {
        mob.set_rotation(45.0, 10.0);
        mob.set_rotation_from_velocity();
        assert_eq!(mob.yaw(), 0.0);
        assert_eq!(mob.pitch(), 0.0);
    }

    #[rstest]
    fn angles_are_wrapped(mut mob: Entity) {
        mob.set_rotation(270.0, -190.0);
        mob.set_head_yaw(540.0);
        assert_relative_eq!(mob.yaw(), -90.0);
        assert_relative_eq!(mob.pitch(), 170.0);
        assert_relative_eq!(mob.head_yaw(), 180.0);
    }

    #[test]
    fn player_flags_reach_metadata() {
        let mut player = Entity::new(EntityKind::player(), DVec3::ZERO);
        if let Some(state) = player.kind_mut().as_player_mut() {
            state.sprinting = true;
        }
        let flags = player.metadata_flags();
        assert!(flags.sprinting);
        assert!(!flags.crouched);
        assert!(!flags.on_fire);
    }
}
