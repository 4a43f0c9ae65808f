//! Billboards for mobs and items lying on a cell.
//!
//! Objects share a cell side by side: each gets a slot along the cell's X
//! axis, starting at the left edge of a budget that is a bit narrower than
//! the tile.

use glam::{Vec3, vec3};

use crate::{
    engine::tiles::Site,
    renderer::RenderError,
    world::{Item, Mob, TextureStore},
};

/// World units per texture pixel for mobs.
const MOB_PIXEL_SIZE: f32 = 0.015;
/// Objects float just above the ground so they win against it.
const GROUND_Y: f32 = -0.01;
const ITEM_MAX_SPACING: f32 = 0.3;

/// Evenly spaced X offsets within a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotRow {
    pub start: f32,
    pub space: f32,
}

impl SlotRow {
    /// Mobs spread over `tile - 2`, or nearly the whole tile when crowded.
    pub fn mobs(count: usize, tile: f32) -> Self {
        let budget = if count > 4 { tile - 0.5 } else { tile - 2.0 };
        Self {
            start: -budget * 0.5,
            space: budget / count.max(1) as f32,
        }
    }

    /// Items huddle together: never more than 0.3 apart.
    pub fn items(count: usize, tile: f32) -> Self {
        let budget = if count > 6 { tile - 1.0 } else { tile - 3.0 };
        Self {
            start: -budget * 0.5,
            space: (budget / count.max(1) as f32).min(ITEM_MAX_SPACING),
        }
    }

    #[inline]
    pub fn offset(&self, n: usize) -> f32 {
        self.start + self.space * n as f32
    }
}

/// One object billboard, ready for the rasterizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObjectQuad<'a> {
    pub bottom_left: Vec3,
    pub top_right: Vec3,
    pub texture: &'a str,
    /// Value for the object-id buffer.
    pub tag: u64,
}

/// Pulls objects on the camera's own cell towards its far edge.
fn depth_offset(site: Site, standing_on: bool) -> Option<f32> {
    standing_on.then(|| site.tile * 0.5 - 0.3)
}

fn quad<'a>(site: Site, offset: Vec3, size: (f32, f32), texture: &'a str, tag: u64) -> ObjectQuad<'a> {
    let (w, h) = size;
    ObjectQuad {
        bottom_left: vec3(site.x - w * 0.5 + offset.x, offset.y, site.z + offset.z),
        top_right: vec3(site.x + w * 0.5 + offset.x, offset.y - h, site.z + offset.z),
        texture,
        tag,
    }
}

/// Mob billboards, sized from their textures, one entry per mob.
///
/// A mob whose texture is not in `store` yields
/// [`RenderError::MissingTexture`] but still holds its slot, so its
/// neighbours do not shift.
pub fn place_mobs<'a>(
    mobs: &'a [Mob],
    site: Site,
    standing_on: bool,
    store: &TextureStore,
) -> Vec<Result<ObjectQuad<'a>, RenderError>> {
    let slots = SlotRow::mobs(mobs.len(), site.tile);
    let z = depth_offset(site, standing_on).unwrap_or(0.0);

    mobs.iter()
        .enumerate()
        .map(|(n, mob)| {
            let tex = store
                .get(&mob.texture)
                .ok_or_else(|| RenderError::MissingTexture(mob.texture.clone()))?;
            let size = (
                tex.width() as f32 * MOB_PIXEL_SIZE,
                tex.height() as f32 * MOB_PIXEL_SIZE,
            );
            let offset = vec3(slots.offset(n), GROUND_Y, z);
            Ok(quad(site, offset, size, &mob.texture, mob.tag()))
        })
        .collect()
}

/// Item billboards. Anchored items ignore their slot; standing on the cell
/// still pulls them to its far edge.
pub fn place_items<'a>(items: &'a [Item], site: Site, standing_on: bool) -> Vec<ObjectQuad<'a>> {
    let slots = SlotRow::items(items.len(), site.tile);
    let pulled = depth_offset(site, standing_on);

    items
        .iter()
        .enumerate()
        .map(|(n, item)| {
            let mut offset = item
                .anchor
                .unwrap_or_else(|| vec3(slots.offset(n), GROUND_Y, 0.0));
            if let Some(z) = pulled {
                offset.z = z;
            }
            quad(site, offset, (item.size.x, item.size.y), &item.texture, item.tag())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{MOB_MASK, Surface};
    use glam::vec2;

    const SITE: Site = Site {
        x: 5.0,
        z: 10.5,
        tile: 5.0,
    };

    fn store() -> TextureStore {
        let mut store = TextureStore::new();
        store.insert("rat", Surface::new(100, 60)).unwrap();
        store
    }

    fn placed<'a>(mobs: &'a [Mob], standing_on: bool) -> Vec<ObjectQuad<'a>> {
        place_mobs(mobs, SITE, standing_on, &store())
            .into_iter()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn two_mobs_get_disjoint_slots() {
        let mobs = [Mob::new(1, "rat"), Mob::new(2, "rat")];
        let quads = placed(&mobs, false);
        assert_eq!(quads.len(), 2);

        let slots = SlotRow::mobs(2, 5.0);
        assert_eq!(slots, SlotRow { start: -1.5, space: 1.5 });

        // 100 px * 0.015 = 1.5 wide, one slot each
        for q in &quads {
            assert!((q.top_right.x - q.bottom_left.x - 1.5).abs() < 1e-5);
            assert!((q.bottom_left.y - GROUND_Y).abs() < 1e-6);
            assert!((q.bottom_left.y - q.top_right.y - 0.9).abs() < 1e-5);
        }
        assert!(quads[0].top_right.x <= quads[1].bottom_left.x + 1e-5);
        assert!(quads[0].bottom_left.x >= SITE.x - 2.5 - 1.5);
        assert_eq!(quads[1].tag, 2 | MOB_MASK);
    }

    #[test]
    fn slots_fit_the_cell_budget() {
        let tile = 5.0;
        for count in 1..=8 {
            let budget = if count > 4 { tile - 0.5 } else { tile - 2.0 };
            let slots = SlotRow::mobs(count, tile);
            assert!(slots.space * count as f32 <= budget + 1e-5, "{count} mobs");
            assert!(slots.start >= -tile * 0.5);
            assert!(slots.offset(count) <= budget * 0.5 + 1e-5);
            for n in 1..count {
                // slot n starts where slot n - 1 ends
                let prev_end = slots.offset(n - 1) + slots.space;
                assert!(slots.offset(n) >= prev_end - 1e-5);
            }
        }

        for count in 1..=10 {
            let budget = if count > 6 { tile - 1.0 } else { tile - 3.0 };
            let slots = SlotRow::items(count, tile);
            assert!(slots.space * count as f32 <= budget + 1e-5, "{count} items");
            assert!(slots.space <= ITEM_MAX_SPACING);
            for n in 1..count {
                assert!(slots.offset(n) > slots.offset(n - 1));
            }
        }
    }

    #[test]
    fn crowded_cells_widen_the_budget() {
        assert_eq!(SlotRow::mobs(5, 5.0).start, -2.25);
        assert_eq!(SlotRow::items(6, 5.0).start, -1.0);
        assert_eq!(SlotRow::items(7, 5.0).start, -2.0);
        assert_eq!(SlotRow::items(2, 5.0).space, 0.3);
    }

    #[test]
    fn mob_without_texture_is_skipped_but_keeps_its_slot() {
        let mobs = [Mob::new(1, "ghost"), Mob::new(2, "rat")];
        let quads = place_mobs(&mobs, SITE, false, &store());
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0], Err(RenderError::MissingTexture("ghost".into())));
        let rat = quads[1].as_ref().unwrap();
        let centre = (rat.bottom_left.x + rat.top_right.x) * 0.5;
        assert!((centre - (SITE.x + 0.0)).abs() < 1e-5);
    }

    #[test]
    fn standing_on_pulls_objects_back() {
        let mobs = [Mob::new(1, "rat")];
        let quads = placed(&mobs, true);
        assert!((quads[0].bottom_left.z - (SITE.z + 2.2)).abs() < 1e-5);

        let sign = Item {
            id: 9,
            texture: "sign".into(),
            size: vec2(1.0, 1.8),
            anchor: Some(vec3(0.5, 0.0, -1.0)),
        };
        let items = [sign];
        let away = place_items(&items, SITE, false);
        assert_eq!(away[0].bottom_left, vec3(5.0, 0.0, 9.5));
        assert_eq!(away[0].tag, 9);

        let on = place_items(&items, SITE, true);
        assert!((on[0].bottom_left.z - (SITE.z + 2.2)).abs() < 1e-5);
        assert_eq!(on[0].bottom_left.x, 5.0);
    }

    #[test]
    fn loose_items_are_slot_packed() {
        let items = [Item::from_catalog(1, "dagger"), Item::from_catalog(2, "scroll")];
        let quads = place_items(&items, SITE, false);
        let centres: Vec<f32> = quads
            .iter()
            .map(|q| (q.bottom_left.x + q.top_right.x) * 0.5 - SITE.x)
            .collect();
        assert!((centres[0] + 1.0).abs() < 1e-5);
        assert!((centres[1] + 0.7).abs() < 1e-5);
        assert!((quads[0].bottom_left.y - GROUND_Y).abs() < 1e-6);
    }
}
