//! Tile handlers: what each kind of cell contributes to each stage.
//!
//! Handlers are pure functions of the stage, the cell's camera-space centre
//! and the tile record. They never touch the rasterizer; the assembler
//! submits whatever they return.

use bitflags::bitflags;
use glam::vec3;
use smallvec::SmallVec;

use crate::{
    engine::Stage,
    renderer::DrawCall,
    world::{TileKind, WorldTile},
};

/// Draw calls of a single cell. Forest cells are the only ones that can
/// spill past the inline capacity.
pub type DrawList = SmallVec<[DrawCall<'static>; 4]>;

/// Camera-space centre of a cell plus the grid's tile size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Site {
    pub x: f32,
    pub z: f32,
    pub tile: f32,
}

pub type TileHandler = fn(Stage, Site, WorldTile) -> DrawList;

/// Indexed by [`TileKind`].
pub const HANDLERS: [TileHandler; TileKind::COUNT] = [
    empty,
    grassland,
    water,
    mountains,
    sand,
    forest,
    rocky_road,
    dirt_road,
    stone_wall,
    wood_floor,
];

bitflags! {
    /// Variant bits of [`TileKind::Mountains`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct MountainVariant: u8 {
        /// Keep the base height, ignore the height bits.
        const LOW = 0x80;
    }
}

bitflags! {
    /// Variant bits of [`TileKind::RockyRoad`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RoadVariant: u8 {
        /// Tunnel: the road gets a ceiling.
        const COVERED = 0x80;
    }
}

/// Stone wall variant that renders as a door.
pub const DOOR_VARIANT: u8 = 0xff;

/// Height of walls and tunnel ceilings (negative is up).
const WALL_TOP: f32 = -3.0;

const GRASS: [&str; 4] = ["3d_grassA", "3d_grassB", "3d_grassC", "3d_grassD"];
const WATER: [&str; 4] = ["3d_waterA", "3d_waterB", "3d_waterC", "3d_waterD"];
const SAND: [&str; 4] = ["3d_sandA", "3d_sandB", "3d_sandC", "3d_sandD"];
const DIRT: [&str; 4] = ["3d_dirtA", "3d_dirtB", "3d_dirtC", "3d_dirtD"];
const ROCKY_ROAD: [&str; 4] = [
    "3d_rocky_roadA",
    "3d_rocky_roadB",
    "3d_rocky_roadC",
    "3d_rocky_roadD",
];
const ROCK_LEFT_FACE: &str = "3d_rockD";
const ROCK_RIGHT_FACE: &str = "3d_rockL";
const ROCK_FRONT: &str = "3d_rock";
const WALL: &str = "3d_wall";
const WALL_DOOR: &str = "3d_wall_door";
const WOOD: &str = "3d_wood";

/// Run the handler for `tile`'s kind. Unknown kinds draw nothing.
pub fn dispatch(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    HANDLERS[tile.kind() as usize](stage, site, tile)
}

/// Every texture name a handler can emit, for start-up checks.
pub fn referenced_textures() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = [GRASS, WATER, SAND, DIRT, ROCKY_ROAD]
        .into_iter()
        .flatten()
        .collect();
    names.extend([
        ROCK_LEFT_FACE,
        ROCK_RIGHT_FACE,
        ROCK_FRONT,
        WALL,
        WALL_DOOR,
        WOOD,
    ]);
    names.extend(TREE_TYPES.iter().map(|t| t.texture));
    names
}

/*──────────────────────── shared geometry ───────────────────────────*/

fn ground(site: Site, y: f32, edge: f32, texture: &'static str) -> DrawCall<'static> {
    DrawCall::tile(site.x, y, site.z, edge * site.tile, texture)
}

fn single(call: DrawCall<'static>) -> DrawList {
    let mut list = DrawList::new();
    list.push(call);
    list
}

/// Front face of a block `height` tall plus the optional left and right
/// side faces.
fn block(site: Site, height: f32, faces: [Option<&'static str>; 2], front: &'static str) -> DrawList {
    let h = site.tile * 0.5;
    let (x0, x1) = (site.x - h, site.x + h);
    let (z0, z1) = (site.z - h, site.z + h);

    let mut list = DrawList::new();
    if let Some(left) = faces[0] {
        list.push(DrawCall::vquad(vec3(x0, height, z0), vec3(x0, 0.0, z1), left));
    }
    if let Some(right) = faces[1] {
        list.push(DrawCall::vquad(vec3(x1, height, z0), vec3(x1, 0.0, z1), right));
    }
    list.push(DrawCall::vquad(vec3(x0, height, z0), vec3(x1, 0.0, z0), front));
    list
}

/*──────────────────────── handlers ──────────────────────────────────*/

fn empty(_: Stage, _: Site, _: WorldTile) -> DrawList {
    DrawList::new()
}

fn grassland(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    if stage != Stage::Ground {
        return DrawList::new();
    }
    single(ground(site, 0.0, 1.25, GRASS[(tile.variant & 3) as usize]))
}

fn water(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    if stage != Stage::Deep {
        return DrawList::new();
    }
    single(ground(site, 0.0, 1.0, WATER[(tile.variant & 3) as usize]))
}

/// Mountain height for a variant: 2 units plus up to 38.1 from the low bits.
pub fn mountain_height(variant: u8) -> f32 {
    let mut height = -2.0;
    if !MountainVariant::from_bits_truncate(variant).contains(MountainVariant::LOW) {
        height -= (variant as f32 / 127.0) * 12.7 * 3.0;
    }
    height
}

fn mountains(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    if stage != Stage::Solid {
        return DrawList::new();
    }
    let left = (site.x > 0.0).then_some(ROCK_LEFT_FACE);
    let right = (site.x < 0.0).then_some(ROCK_RIGHT_FACE);
    block(site, mountain_height(tile.variant), [left, right], ROCK_FRONT)
}

fn sand(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    if stage != Stage::Road {
        return DrawList::new();
    }
    single(ground(site, 0.0, 1.25, SAND[(tile.variant & 3) as usize]))
}

fn forest(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    match stage {
        Stage::Ground => grassland(stage, site, WorldTile::new(TileKind::Grassland, tile.variant >> 3)),
        Stage::Solid => trees(site, tile.variant),
        _ => DrawList::new(),
    }
}

fn rocky_road(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    if stage != Stage::Road {
        return DrawList::new();
    }
    let v = tile.variant;
    let mut list = single(ground(site, 0.0, 1.25, ROCKY_ROAD[(v & 3) as usize]));
    if RoadVariant::from_bits_truncate(v).contains(RoadVariant::COVERED) {
        list.push(ground(
            site,
            WALL_TOP,
            1.25,
            ROCKY_ROAD[(v.wrapping_add(1) & 3) as usize],
        ));
    }
    list
}

fn dirt_road(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    if stage != Stage::Overlay {
        return DrawList::new();
    }
    single(ground(site, 0.0, 1.35, DIRT[(tile.variant & 3) as usize]))
}

fn stone_wall(stage: Stage, site: Site, tile: WorldTile) -> DrawList {
    if stage != Stage::Solid {
        return DrawList::new();
    }
    let texture = if tile.variant == DOOR_VARIANT { WALL_DOOR } else { WALL };
    block(site, WALL_TOP, [Some(texture), Some(texture)], texture)
}

fn wood_floor(stage: Stage, site: Site, _: WorldTile) -> DrawList {
    if stage != Stage::Ground {
        return DrawList::new();
    }
    single(ground(site, 0.0, 1.0, WOOD))
}

/*──────────────────────── forest ────────────────────────────────────*/

struct TreeType {
    w: f32,
    h: f32,
    y_offset: f32,
    texture: &'static str,
}

const fn tree(w: f32, h: f32, texture: &'static str) -> TreeType {
    TreeType {
        w: w * 2.0,
        h: h * 2.0,
        y_offset: 0.1,
        texture,
    }
}

#[rustfmt::skip]
const TREE_TYPES: [TreeType; 16] = [
    tree(2.15, 4.30, "3d_pinetree1"),
    tree(2.31, 4.70, "3d_pinetree2"),
    tree(2.23, 5.93, "3d_pinetree3"),
    tree(1.92, 3.12, "3d_pinetree4"),
    tree(1.92, 3.12, "3d_pinetree5"),

    tree(4.00, 6.00, "3d_tree_leaf_huge"),
    tree(2.53, 3.45, "3d_tree_leaf_large"),
    tree(2.89, 4.00, "3d_tree_leaf_medium"),
    tree(2.50, 4.10, "3d_tree_leaf_medium2"),
    tree(3.75, 5.07, "3d_tree_leaf_verylarge"),

    tree(1.82, 0.80, "3d_bush1"),
    tree(1.43, 0.81, "3d_bush2"),
    tree(1.40, 1.14, "3d_bush3"),

    tree(1.42, 1.70, "3d_deadtree1"),
    tree(1.63, 2.64, "3d_deadtree2"),
    tree(2.12, 3.00, "3d_deadtree3"),
];

/// Pine, leaf, dead and mixed woods; indices into [`TREE_TYPES`].
#[rustfmt::skip]
const TREE_SETS: [[usize; 10]; 4] = [
    [ 0,  1,  2,  3,  4,  0,  1,  2,  3,  4],
    [ 5,  6,  7,  8,  9, 10, 11, 12,  6,  7],
    [13, 14, 15, 13, 14, 15, 13, 14, 15, 13],
    [ 0,  1,  2, 13, 10, 11,  6,  7,  8,  9],
];

/// Eight layouts of five positions, as fractions of the tile.
#[rustfmt::skip]
const TREE_SLOTS: [[(f32, f32); 5]; 8] = [
    [(0.3960, 0.5005), (0.6172, 0.8147), (0.8184, 0.2686), (0.1968, 0.7952), (0.1790, 0.2080)],
    [(0.5286, 0.2043), (0.5618, 0.7385), (0.2434, 0.5247), (0.1775, 0.1780), (0.7988, 0.4739)],
    [(0.6057, 0.5127), (0.2505, 0.5869), (0.2788, 0.2036), (0.7847, 0.1907), (0.7690, 0.8245)],
    [(0.5356, 0.5317), (0.3245, 0.1890), (0.1860, 0.6885), (0.7078, 0.1755), (0.8184, 0.7908)],
    [(0.5156, 0.5735), (0.4287, 0.1865), (0.2285, 0.7920), (0.8042, 0.1848), (0.7964, 0.7839)],
    [(0.5789, 0.4573), (0.2397, 0.2056), (0.2280, 0.7839), (0.7776, 0.8071), (0.7905, 0.1768)],
    [(0.4561, 0.4377), (0.7317, 0.7502), (0.2183, 0.7646), (0.7385, 0.1870), (0.1807, 0.2031)],
    [(0.7832, 0.2500), (0.1943, 0.4800), (0.4683, 0.7346), (0.3958, 0.1863), (0.8054, 0.6384)],
];

/// Forest variant layout: bits 0..3 count, 3..6 slot layout, 6..8 tree set.
fn trees(site: Site, v: u8) -> DrawList {
    // trees on the camera's own row would fill the screen
    if site.z < site.tile / 2.0 {
        return DrawList::new();
    }

    let count = ((v & 7) % 5 + 1) as usize;
    let slots = &TREE_SLOTS[((v >> 3) & 7) as usize];
    let set = &TREE_SETS[((v >> 6) & 3) as usize];
    let offset = (v % 10) as usize;

    slots
        .iter()
        .take(count)
        .enumerate()
        .map(|(n, &(sx, sz))| {
            let tree = &TREE_TYPES[set[(n + offset) % 10]];
            let px = sx * site.tile - site.tile * 0.5 + site.x;
            let pz = sz * site.tile - site.tile * 0.5 + site.z;
            DrawCall::vquad(
                vec3(px - tree.w * 0.5, tree.y_offset, pz),
                vec3(px + tree.w * 0.5, tree.y_offset - tree.h, pz),
                tree.texture,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: Site = Site {
        x: 0.0,
        z: 10.5,
        tile: 5.0,
    };

    fn stages_with_draws(tile: WorldTile, site: Site) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|&s| !dispatch(s, site, tile).is_empty())
            .collect()
    }

    #[test]
    fn each_kind_draws_in_its_stage() {
        use TileKind::*;
        let cases = [
            (Empty, vec![]),
            (Grassland, vec![Stage::Ground]),
            (Water, vec![Stage::Deep]),
            (Mountains, vec![Stage::Solid]),
            (Sand, vec![Stage::Road]),
            (Forest, vec![Stage::Ground, Stage::Solid]),
            (RockyRoad, vec![Stage::Road]),
            (DirtRoad, vec![Stage::Overlay]),
            (StoneWall, vec![Stage::Solid]),
            (WoodFloor, vec![Stage::Ground]),
        ];
        for (kind, stages) in cases {
            assert_eq!(stages_with_draws(WorldTile::new(kind, 0), SITE), stages, "{kind:?}");
        }
    }

    #[test]
    fn unknown_kind_draws_nothing() {
        let tile = WorldTile { kind: 200, variant: 3 };
        assert!(stages_with_draws(tile, SITE).is_empty());
    }

    #[test]
    fn wall_emits_three_faces() {
        let list = dispatch(Stage::Solid, SITE, WorldTile::new(TileKind::StoneWall, 0));
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|c| c.texture() == "3d_wall"));

        let door = dispatch(Stage::Solid, SITE, WorldTile::new(TileKind::StoneWall, DOOR_VARIANT));
        assert!(door.iter().all(|c| c.texture() == "3d_wall_door"));

        // front face spans the near edge of the cell
        let DrawCall::VQuad { bottom_left, top_right, .. } = list[2] else {
            panic!("front face is a vquad");
        };
        assert_eq!(bottom_left, vec3(-2.5, -3.0, 8.0));
        assert_eq!(top_right, vec3(2.5, 0.0, 8.0));
    }

    #[test]
    fn mountain_faces_depend_on_side() {
        let tile = WorldTile::new(TileKind::Mountains, 0x80);
        let names = |x: f32| -> Vec<&str> {
            dispatch(Stage::Solid, Site { x, ..SITE }, tile)
                .iter()
                .map(|c| c.texture())
                .collect()
        };
        assert_eq!(names(5.0), vec!["3d_rockD", "3d_rock"]);
        assert_eq!(names(-5.0), vec!["3d_rockL", "3d_rock"]);
        assert_eq!(names(0.0), vec!["3d_rock"]);
    }

    #[test]
    fn mountain_height_from_variant() {
        assert_eq!(mountain_height(0x80), -2.0);
        assert_eq!(mountain_height(0xff), -2.0);
        assert_eq!(mountain_height(0), -2.0);
        assert!((mountain_height(127) - (-2.0 - 38.1)).abs() < 1e-4);
    }

    #[test]
    fn covered_road_adds_a_ceiling() {
        let open = dispatch(Stage::Road, SITE, WorldTile::new(TileKind::RockyRoad, 1));
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].texture(), "3d_rocky_roadB");

        let covered = dispatch(Stage::Road, SITE, WorldTile::new(TileKind::RockyRoad, 0x81));
        assert_eq!(covered.len(), 2);
        let DrawCall::Tile { centre, .. } = covered[1] else {
            panic!("ceiling is a tile");
        };
        assert_eq!(centre.y, -3.0);
        assert_eq!(covered[1].texture(), "3d_rocky_roadC");
    }

    #[test]
    fn ground_tiles_are_oversized() {
        let DrawCall::Tile { size, .. } = dispatch(Stage::Overlay, SITE, WorldTile::new(TileKind::DirtRoad, 2))[0]
        else {
            panic!("dirt road is a tile");
        };
        assert!((size.x - 6.75).abs() < 1e-5);
        assert_eq!(size.x, size.z);
    }

    #[test]
    fn forest_trees() {
        // count 3, slot layout 1, dead trees
        let v = (2 << 6) | (1 << 3) | 2;
        let list = dispatch(Stage::Solid, SITE, WorldTile::new(TileKind::Forest, v));
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|c| c.texture().starts_with("3d_deadtree")));

        // first tree: set offset v % 10 = 8 -> type 15
        let DrawCall::VQuad { bottom_left, top_right, texture } = list[0] else {
            panic!("trees are vquads");
        };
        assert_eq!(texture, "3d_deadtree3");
        assert!((top_right.x - bottom_left.x - 4.24).abs() < 1e-4);
        assert!((bottom_left.y - 0.1).abs() < 1e-6);
        assert!((bottom_left.z - (0.2043 * 5.0 - 2.5 + 10.5)).abs() < 1e-4);

        // nothing on the camera's row
        let near = Site { z: 0.5, ..SITE };
        assert!(dispatch(Stage::Solid, near, WorldTile::new(TileKind::Forest, v)).is_empty());
    }

    #[test]
    fn forest_floor_uses_upper_bits() {
        let list = dispatch(Stage::Ground, SITE, WorldTile::new(TileKind::Forest, 3 << 3));
        assert_eq!(list[0].texture(), "3d_grassD");
    }

    #[test]
    fn referenced_textures_cover_every_handler() {
        let names = referenced_textures();
        for tile in (0..TileKind::COUNT as u8).flat_map(|k| (0..=255u8).map(move |v| WorldTile { kind: k, variant: v })) {
            for stage in Stage::ALL {
                for call in dispatch(stage, SITE, tile) {
                    assert!(names.contains(&call.texture()), "{}", call.texture());
                }
            }
        }
    }
}
