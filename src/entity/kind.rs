//! Closed set of entity kinds and their kind-specific state.

use crate::events::ClientId;
use crate::items::{Item, ItemStack, MinecartKind};
use crate::protocol::KindTag;

/// State only players carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    /// Connection the player is controlled from, if any.
    pub client: Option<ClientId>,
    /// Sprinting boosts knockback dealt by the player.
    pub sprinting: bool,
    /// Sneaking.
    pub crouched: bool,
    /// Creative players keep the items they place.
    pub creative: bool,
}

/// State only mobs carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MobState {
    /// Items dropped when the mob dies.
    pub loot: Vec<ItemStack>,
}

/// What an entity is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// A connected player.
    Player(PlayerState),
    /// A non-player creature.
    Mob(MobState),
    /// A dropped item stack lying in the world.
    Pickup(ItemStack),
    /// A minecart.
    Minecart(MinecartKind),
    /// Anything else the core only moves around.
    Other,
}

impl EntityKind {
    /// A player with default state.
    #[must_use]
    pub fn player() -> Self {
        Self::Player(PlayerState::default())
    }

    /// A mob without loot.
    #[must_use]
    pub fn mob() -> Self {
        Self::Mob(MobState::default())
    }

    /// The tag announced to clients.
    #[must_use]
    pub const fn tag(&self) -> KindTag {
        match self {
            Self::Player(_) => KindTag::Player,
            Self::Mob(_) => KindTag::Mob,
            Self::Pickup(_) => KindTag::Pickup,
            Self::Minecart(kind) => KindTag::Minecart(*kind),
            Self::Other => KindTag::Other,
        }
    }

    /// Players and mobs breathe, swim and take knockback.
    #[must_use]
    pub const fn is_living(&self) -> bool {
        matches!(self, Self::Player(_) | Self::Mob(_))
    }

    /// Player state, if this is a player.
    #[must_use]
    pub const fn as_player(&self) -> Option<&PlayerState> {
        match self {
            Self::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable player state, if this is a player.
    pub fn as_player_mut(&mut self) -> Option<&mut PlayerState> {
        match self {
            Self::Player(state) => Some(state),
            _ => None,
        }
    }

    /// Default bounding box as `(width, height)`.
    #[must_use]
    pub const fn default_size(&self) -> (f64, f64) {
        match self {
            Self::Player(_) => (0.6, 1.8),
            Self::Mob(_) => (0.6, 1.7),
            Self::Pickup(_) => (0.25, 0.25),
            Self::Minecart(_) => (0.98, 0.7),
            Self::Other => (0.5, 0.5),
        }
    }

    /// Default maximum health.
    #[must_use]
    pub const fn default_max_health(&self) -> i32 {
        match self {
            Self::Player(_) | Self::Mob(_) => 20,
            Self::Pickup(_) => 5,
            Self::Minecart(_) => 6,
            Self::Other => 1,
        }
    }

    /// The item a minecart turns back into.
    #[must_use]
    pub const fn minecart_item(kind: MinecartKind) -> ItemStack {
        ItemStack::single(Item::Minecart(kind))
    }
}
