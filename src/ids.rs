//! Entity identifiers and the process-wide allocator that hands them out.
//!
//! Entities are constructed from several contexts at once (world generation,
//! pickup spawns, plugin calls) while the world loop ticks, so allocation is
//! the one operation that synchronises across threads. The allocator lives
//! for the whole process and is never reset: identifiers stay unique and
//! strictly increasing from process start.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Identifier of an entity, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Returns the raw identifier.
    #[must_use]
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lock-guarded monotonically increasing counter.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: Mutex<u32>,
}

impl IdAllocator {
    /// Creates an allocator whose first identifier is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: Mutex::new(0),
        }
    }

    /// Allocates the next identifier.
    pub fn allocate(&self) -> EntityId {
        // The counter holds no invariant a panicking holder could break.
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        *last = last.wrapping_add(1);
        debug_assert!(*last != 0, "entity id space exhausted");
        EntityId(*last)
    }
}

static ENTITY_IDS: Lazy<IdAllocator> = Lazy::new(IdAllocator::new);

/// Allocates an identifier from the process-wide allocator.
pub fn next_entity_id() -> EntityId {
    ENTITY_IDS.allocate()
}
