//! Dynamic objects lying on the map, supplied by the game layer per frame.

use std::collections::HashMap;

use glam::{Vec2, Vec3};

use crate::world::sprites;

/// Object-id buffer value for "no object here".
pub const NO_OBJECT: u64 = u64::MAX;

/// Set on object ids that belong to mobs rather than items.
pub const MOB_MASK: u64 = 1 << 63;

/// Packs a grid cell into the key used by [`GroundObjects`].
#[inline]
fn cell_key(x: i32, y: i32) -> u64 {
    (x as u32 as u64) | ((y as u32 as u64) << 32)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Mob {
    pub id: u64,
    pub texture: String,
}

impl Mob {
    pub fn new<S: Into<String>>(id: u64, texture: S) -> Self {
        Self {
            id,
            texture: texture.into(),
        }
    }

    /// Id written into the object-id buffer.
    #[inline]
    pub fn tag(&self) -> u64 {
        self.id | MOB_MASK
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub id: u64,
    pub texture: String,
    /// Billboard size in world units.
    pub size: Vec2,
    /// Preferred offset in the cell; `None` lets the item be slot-packed.
    pub anchor: Option<Vec3>,
}

impl Item {
    /// Item whose size and anchor come from the sprite catalog.
    pub fn from_catalog<S: Into<String>>(id: u64, texture: S) -> Self {
        let texture = texture.into();
        let info = sprites::sprite_info(&texture);
        Self {
            id,
            size: info.size,
            anchor: info.anchor,
            texture,
        }
    }

    #[inline]
    pub fn tag(&self) -> u64 {
        self.id
    }
}

/// Mobs and items keyed by packed cell coordinates.
#[derive(Clone, Debug, Default)]
pub struct GroundObjects {
    mobs: HashMap<u64, Vec<Mob>>,
    items: HashMap<u64, Vec<Item>>,
}

impl GroundObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mob(&mut self, x: i32, y: i32, mob: Mob) {
        self.mobs.entry(cell_key(x, y)).or_default().push(mob);
    }

    pub fn add_item(&mut self, x: i32, y: i32, item: Item) {
        self.items.entry(cell_key(x, y)).or_default().push(item);
    }

    pub fn mobs_at(&self, x: i32, y: i32) -> &[Mob] {
        self.mobs
            .get(&cell_key(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn items_at(&self, x: i32, y: i32) -> &[Item] {
        self.items
            .get(&cell_key(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True if an item list exists for the cell, even an empty one.
    pub fn has_item_list(&self, x: i32, y: i32) -> bool {
        self.items.contains_key(&cell_key(x, y))
    }
}
