//! Item stacks and the two item tables the simulation core needs: melee
//! damage of held tools and armor points of worn armor.

use serde::{Deserialize, Serialize};

/// Tier of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolMaterial {
    /// Wooden tools.
    Wood,
    /// Golden tools.
    Gold,
    /// Stone tools.
    Stone,
    /// Iron tools.
    Iron,
    /// Diamond tools.
    Diamond,
}

/// Kind of tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Sword.
    Sword,
    /// Axe.
    Axe,
    /// Pickaxe.
    Pickaxe,
    /// Shovel.
    Shovel,
    /// Hoe. Hits like a bare hand.
    Hoe,
}

/// Tier of a piece of armor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorMaterial {
    /// Leather armor.
    Leather,
    /// Golden armor.
    Gold,
    /// Chain mail.
    Chain,
    /// Iron armor.
    Iron,
    /// Diamond armor.
    Diamond,
}

/// Body slot a piece of armor is worn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorSlot {
    /// Head.
    Helmet,
    /// Torso.
    Chestplate,
    /// Legs.
    Leggings,
    /// Feet.
    Boots,
}

/// Variant of a minecart, both as an item and as a placed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MinecartKind {
    /// Rideable minecart.
    #[default]
    Plain,
    /// Minecart carrying a chest.
    Chest,
    /// Self-propelled minecart.
    Furnace,
    /// Minecart carrying TNT.
    Tnt,
    /// Minecart carrying a hopper.
    Hopper,
}

/// An item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    /// A tool or weapon.
    Tool {
        /// What the tool is.
        kind: ToolKind,
        /// What it is made of.
        material: ToolMaterial,
    },
    /// A piece of armor.
    Armor {
        /// Where it is worn.
        slot: ArmorSlot,
        /// What it is made of.
        material: ArmorMaterial,
    },
    /// A minecart item.
    Minecart(MinecartKind),
    /// Any other item, identified by its numeric type.
    Other(u16),
}

impl Item {
    /// Raw melee damage dealt when this item is held.
    ///
    /// # Examples
    /// ```
    /// use voxsim::items::{Item, ToolKind, ToolMaterial};
    /// let sword = Item::Tool { kind: ToolKind::Sword, material: ToolMaterial::Diamond };
    /// assert_eq!(sword.melee_damage(), 7);
    /// assert_eq!(Item::Other(3).melee_damage(), 1);
    /// ```
    #[must_use]
    pub const fn melee_damage(self) -> i32 {
        let Self::Tool { kind, material } = self else {
            return 1;
        };
        let base = match kind {
            ToolKind::Sword => 4,
            ToolKind::Axe => 3,
            ToolKind::Pickaxe => 2,
            ToolKind::Shovel => 1,
            ToolKind::Hoe => return 1,
        };
        // Gold hits like wood; every later tier adds one.
        let bonus = match material {
            ToolMaterial::Wood | ToolMaterial::Gold => 0,
            ToolMaterial::Stone => 1,
            ToolMaterial::Iron => 2,
            ToolMaterial::Diamond => 3,
        };
        base + bonus
    }

    /// Armor points provided when worn in `slot`; zero for anything that is
    /// not armor made for that slot.
    #[must_use]
    pub const fn armor_points(self, slot: ArmorSlot) -> i32 {
        let Self::Armor {
            slot: item_slot,
            material,
        } = self
        else {
            return 0;
        };
        if item_slot as u8 != slot as u8 {
            return 0;
        }
        match slot {
            ArmorSlot::Helmet => match material {
                ArmorMaterial::Leather => 1,
                ArmorMaterial::Gold | ArmorMaterial::Chain | ArmorMaterial::Iron => 2,
                ArmorMaterial::Diamond => 3,
            },
            ArmorSlot::Chestplate => match material {
                ArmorMaterial::Leather => 3,
                ArmorMaterial::Gold | ArmorMaterial::Chain => 5,
                ArmorMaterial::Iron => 6,
                ArmorMaterial::Diamond => 8,
            },
            ArmorSlot::Leggings => match material {
                ArmorMaterial::Leather => 2,
                ArmorMaterial::Gold => 3,
                ArmorMaterial::Chain => 4,
                ArmorMaterial::Iron => 5,
                ArmorMaterial::Diamond => 6,
            },
            ArmorSlot::Boots => match material {
                ArmorMaterial::Leather | ArmorMaterial::Gold | ArmorMaterial::Chain => 1,
                ArmorMaterial::Iron => 2,
                ArmorMaterial::Diamond => 3,
            },
        }
    }
}

/// A stack of identical items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item type.
    pub item: Item,
    /// Number of items in the stack.
    pub count: u8,
}

impl ItemStack {
    /// Creates a stack.
    #[must_use]
    pub const fn new(item: Item, count: u8) -> Self {
        Self { item, count }
    }

    /// A stack holding a single item.
    #[must_use]
    pub const fn single(item: Item) -> Self {
        Self::new(item, 1)
    }
}

/// Armor and held item of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Equipment {
    /// Head slot.
    pub helmet: Option<ItemStack>,
    /// Torso slot.
    pub chestplate: Option<ItemStack>,
    /// Leg slot.
    pub leggings: Option<ItemStack>,
    /// Feet slot.
    pub boots: Option<ItemStack>,
    /// Item in hand.
    pub held: Option<ItemStack>,
}

impl Equipment {
    /// Full set of one armor material with nothing in hand.
    #[must_use]
    pub const fn full_armor(material: ArmorMaterial) -> Self {
        Self {
            helmet: Some(ItemStack::single(Item::Armor {
                slot: ArmorSlot::Helmet,
                material,
            })),
            chestplate: Some(ItemStack::single(Item::Armor {
                slot: ArmorSlot::Chestplate,
                material,
            })),
            leggings: Some(ItemStack::single(Item::Armor {
                slot: ArmorSlot::Leggings,
                material,
            })),
            boots: Some(ItemStack::single(Item::Armor {
                slot: ArmorSlot::Boots,
                material,
            })),
            held: None,
        }
    }

    /// Total armor points of the worn pieces.
    #[must_use]
    pub fn armor_points(&self) -> i32 {
        [
            (self.helmet, ArmorSlot::Helmet),
            (self.chestplate, ArmorSlot::Chestplate),
            (self.leggings, ArmorSlot::Leggings),
            (self.boots, ArmorSlot::Boots),
        ]
        .into_iter()
        .filter_map(|(stack, slot)| stack.map(|s| s.item.armor_points(slot)))
        .sum()
    }

    /// Raw melee damage of whatever is held; bare hands deal 1.
    #[must_use]
    pub fn melee_damage(&self) -> i32 {
        self.held.map_or(1, |stack| stack.item.melee_damage())
    }

    /// Every equipped stack, armor first.
    #[must_use]
    pub fn stacks(&self) -> Vec<ItemStack> {
        [
            self.helmet,
            self.chestplate,
            self.leggings,
            self.boots,
            self.held,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
