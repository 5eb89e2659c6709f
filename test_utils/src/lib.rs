//! Shared fixtures for the integration tests: a recording event sink,
//! scriptable hooks and small worlds to tick entities in.
pub mod events;
pub mod world;

pub use events::{Harness, RecordingEvents, ScriptedHooks};
pub use world::{flat_world, mob_at, player_at, FLOOR_Y};
