//! Catalog of item graphics.
//!
//! Small items are 16×16 icons on the `items_1` sheet and get carved into
//! their own textures at start-up. Large world items (signs, switches, …)
//! are separate images that carry a preferred size and anchor in the cell.

use std::collections::HashMap;

use glam::{Vec2, Vec3, vec2};
use once_cell::sync::Lazy;

use crate::world::surface::SurfaceRect;

/// Name of the fallback entry for unknown item graphics.
pub const DEFAULT_SPRITE: &str = "__default";

const SHEET_CELL: usize = 16;
const ICON_SIZE: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteInfo {
    /// Texture the pixels come from.
    pub sheet: &'static str,
    /// Size of the billboard in world units.
    pub size: Vec2,
    /// Preferred offset inside the cell; `None` means slot-packed.
    pub anchor: Option<Vec3>,
    /// Cell on `sheet` when the sprite has to be carved out.
    pub cell: Option<SurfaceRect>,
}

const fn icon(sheet: &'static str, tile_x: usize, tile_y: usize) -> SpriteInfo {
    SpriteInfo {
        sheet,
        size: vec2(ICON_SIZE, ICON_SIZE),
        anchor: None,
        cell: Some(SurfaceRect::new(
            tile_x * SHEET_CELL,
            tile_y * SHEET_CELL,
            SHEET_CELL,
            SHEET_CELL,
        )),
    }
}

const fn world_item(image: &'static str, w: f32, h: f32) -> SpriteInfo {
    SpriteInfo {
        sheet: image,
        size: vec2(w, h),
        anchor: Some(Vec3::ZERO),
        cell: None,
    }
}

const SPRITES: &[(&str, SpriteInfo)] = &[
    (DEFAULT_SPRITE, icon("items_1", 11, 11)),
    ("scroll", icon("items_1", 9, 3)),
    ("gold_key", icon("items_1", 11, 3)),
    ("teleport_ring", icon("items_1", 1, 1)),
    ("dagger", icon("items_1", 0, 7)),
    ("empty_flask", icon("items_1", 11, 5)),
    ("unknown_potion", icon("items_1", 9, 5)),
    ("health_potion", icon("items_1", 11, 4)),
    ("mana_potion", icon("items_1", 12, 4)),
    ("herb_0", icon("items_1", 0, 12)),
    ("herb_1", icon("items_1", 1, 12)),
    ("herb_2", icon("items_1", 2, 12)),
    ("herb_3", icon("items_1", 3, 12)),
    ("herb_4", icon("items_1", 4, 12)),
    ("herb_5", icon("items_1", 5, 12)),
    ("herb_6", icon("items_1", 6, 12)),
    ("herb_7", icon("items_1", 0, 13)),
    ("herb_8", icon("items_1", 1, 13)),
    ("herb_9", icon("items_1", 2, 13)),
    ("herb_10", icon("items_1", 3, 13)),
    ("herb_11", icon("items_1", 4, 13)),
    ("herb_12", icon("items_1", 5, 13)),
    ("herb_13", icon("items_1", 6, 13)),
    ("sign", world_item("sign", 1.0, 1.8)),
    ("lamppost", world_item("lamppost", 0.5, 1.5)),
    ("switch", world_item("switch", 0.5, 1.5)),
    ("switch_on", world_item("switch_on", 0.5, 1.5)),
    ("blocker", world_item("blocker", 5.0, 3.0)),
    ("blocker_open", world_item("blocker_open", 5.0, 3.0)),
];

static BY_NAME: Lazy<HashMap<&'static str, &'static SpriteInfo>> =
    Lazy::new(|| SPRITES.iter().map(|(name, info)| (*name, info)).collect());

/// Every catalog entry, the default one included.
pub fn catalog() -> impl Iterator<Item = (&'static str, &'static SpriteInfo)> {
    SPRITES.iter().map(|(name, info)| (*name, info))
}

/// Look up `name`, falling back to the default icon.
pub fn sprite_info(name: &str) -> &'static SpriteInfo {
    BY_NAME
        .get(name)
        .or_else(|| BY_NAME.get(DEFAULT_SPRITE))
        .copied()
        .unwrap_or(&SPRITES[0].1)
}
