//! Interactive viewer for a procedurally generated tile world.
//!
//! ```bash
//! RUST_LOG=tilecast=debug cargo run --release --bin view_sw -- --seed 7
//! ```
//!
//! Arrow keys walk and turn, hovering the mouse logs the object under it.

use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use minifb::{Key, KeyRepeat, MouseMode, Scale, Window, WindowOptions};

use tilecast::{
    CameraPose, Direction, FrameAssembler, GroundObjects, RenderConfig, Rgba, Surface,
    TextureStore, TileGrid,
    engine::{SKY_TEXTURE, tiles},
    world::{Item, MOB_MASK, Mob, TileKind, WorldTile},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Grid width in tiles
    #[arg(long, default_value_t = 64)]
    width: usize,

    /// Grid height in tiles
    #[arg(long, default_value_t = 64)]
    height: usize,

    /// Seed for the terrain generator
    #[arg(long, default_value_t = 1)]
    seed: u32,

    /// Start column (defaults to the middle of the grid)
    #[arg(long)]
    x: Option<i32>,

    /// Start row (defaults to the middle of the grid)
    #[arg(long)]
    y: Option<i32>,

    #[arg(long, value_enum, default_value_t = Facing::North)]
    facing: Facing,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Facing {
    North,
    South,
    West,
    East,
}

impl From<Facing> for Direction {
    fn from(f: Facing) -> Self {
        match f {
            Facing::North => Direction::North,
            Facing::South => Direction::South,
            Facing::West => Direction::West,
            Facing::East => Direction::East,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    anyhow::ensure!(opts.width > 0 && opts.height > 0, "grid must not be empty");

    let cfg = RenderConfig::default();
    let grid = generate_world(opts.width, opts.height, opts.seed);
    let objects = scatter_objects(&grid, opts.seed);
    let mut store = build_textures(&cfg).context("building textures")?;

    let missing = store.missing(tiles::referenced_textures());
    if !missing.is_empty() {
        log::warn!("textures without pixels: {missing:?}");
    }

    let mut pose = CameraPose::new(
        opts.x.unwrap_or(opts.width as i32 / 2),
        opts.y.unwrap_or(opts.height as i32 / 2),
        opts.facing.into(),
    );

    let mut fa = FrameAssembler::new(cfg);
    let mut buffer = vec![0u32; cfg.width * cfg.height];

    let mut win = Window::new(
        "tilecast software view",
        cfg.width,
        cfg.height,
        WindowOptions {
            scale: Scale::X2,
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(30);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut last_hover = None;

    while win.is_open() && !win.is_key_down(Key::Escape) {
        /* movement --------------------------------------------------------- */
        if win.is_key_pressed(Key::Up, KeyRepeat::Yes) {
            pose = walk(&grid, pose, 1);
        }
        if win.is_key_pressed(Key::Down, KeyRepeat::Yes) {
            pose = walk(&grid, pose, -1);
        }
        if win.is_key_pressed(Key::Left, KeyRepeat::No) {
            pose.facing = pose.facing.turn_left();
        }
        if win.is_key_pressed(Key::Right, KeyRepeat::No) {
            pose.facing = pose.facing.turn_right();
        }

        /* draw ------------------------------------------------------------- */
        let stats = fa.render_frame(&grid, pose, &objects, &mut store);
        acc_time += stats.elapsed;
        acc_frames += 1;

        fa.present(|frame| {
            for (dst, px) in buffer.iter_mut().zip(frame.pixels()) {
                *dst = px.to_0rgb();
            }
        });
        win.update_with_buffer(&buffer, cfg.width, cfg.height)?;

        /* picking ---------------------------------------------------------- */
        let hover = win
            .get_mouse_pos(MouseMode::Discard)
            .and_then(|(mx, my)| fa.object_at(mx as i32, my as i32));
        if hover != last_hover {
            match hover {
                Some(id) if id & MOB_MASK != 0 => log::info!("mob {}", id & !MOB_MASK),
                Some(id) => log::info!("item {id}"),
                None => {}
            }
            last_hover = hover;
        }

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            log::info!(
                "avg render: {:.2} ms ({:.1} FPS) at ({}, {}) facing {:?}",
                avg_ms,
                1000.0 / avg_ms,
                pose.x,
                pose.y,
                pose.facing
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/// Step unless the target cell is solid or off the grid.
fn walk(grid: &TileGrid, pose: CameraPose, forward: i32) -> CameraPose {
    let next = pose.stepped(forward);
    match grid.tile_at(next.x, next.y).map(WorldTile::kind) {
        Some(TileKind::StoneWall | TileKind::Mountains | TileKind::Water) | None => pose,
        Some(_) => next,
    }
}

/*──────────────────────── world generation ───────────────────────────*/

fn hash(x: i32, y: i32, seed: u32) -> u32 {
    let mut h = (x as u32)
        .wrapping_mul(0x9E37_79B1)
        ^ (y as u32).wrapping_mul(0x85EB_CA77)
        ^ seed.wrapping_mul(0xC2B2_AE3D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h
}

/// Meadows with woods, ponds and hills, a wall around the edge, a dirt road
/// north-south and a rocky road east-west through the middle.
fn generate_world(w: usize, h: usize, seed: u32) -> TileGrid {
    let mut grid = TileGrid::filled(w, h, WorldTile::new(TileKind::Grassland, 0));
    let (mid_x, mid_y) = (w / 2, h / 2);

    for y in 0..h {
        for x in 0..w {
            let r = hash(x as i32, y as i32, seed);
            let variant = (r >> 8) as u8;
            let kind = if x == 0 || y == 0 || x + 1 == w || y + 1 == h {
                TileKind::StoneWall
            } else if x == mid_x {
                TileKind::DirtRoad
            } else if y == mid_y {
                TileKind::RockyRoad
            } else {
                match r % 100 {
                    0..=17 => TileKind::Forest,
                    18..=21 => TileKind::Water,
                    22..=24 => TileKind::Mountains,
                    25..=28 => TileKind::Sand,
                    29 => TileKind::WoodFloor,
                    _ => TileKind::Grassland,
                }
            };
            grid.set(x, y, WorldTile::new(kind, variant));
        }
    }
    grid
}

fn scatter_objects(grid: &TileGrid, seed: u32) -> GroundObjects {
    let mut objects = GroundObjects::new();
    let mut next_id = 1;
    for y in 0..grid.height() as i32 {
        for x in 0..grid.width() as i32 {
            let walkable = grid
                .tile_at(x, y)
                .is_some_and(|t| matches!(t.kind(), TileKind::Grassland | TileKind::DirtRoad));
            if !walkable {
                continue;
            }
            match hash(x, y, seed ^ 0xA5A5) % 40 {
                0 => objects.add_mob(x, y, Mob::new(next_id, "rat")),
                1 => objects.add_item(x, y, Item::from_catalog(next_id, "dagger")),
                2 => objects.add_item(x, y, Item::from_catalog(next_id, "health_potion")),
                3 => objects.add_item(x, y, Item::from_catalog(next_id, "sign")),
                _ => continue,
            }
            next_id += 1;
        }
    }
    objects
}

/*──────────────────────── flat-colour textures ───────────────────────*/

fn name_colour(name: &str) -> Rgba {
    let h = name
        .bytes()
        .fold(0x811C_9DC5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    Rgba::opaque(64 + (h & 0x7f) as u8, 64 + ((h >> 8) & 0x7f) as u8, 64 + ((h >> 16) & 0x7f) as u8)
}

fn checker(w: usize, h: usize, colour: Rgba) -> Surface {
    let dark = Rgba::opaque(colour.r / 2, colour.g / 2, colour.b / 2);
    let mut s = Surface::new(w, h);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            s.set_pixel(x, y, if (x / 8 + y / 8) % 2 == 0 { colour } else { dark });
        }
    }
    s
}

/// Opaque ellipse on a transparent background, for billboards.
fn blob(w: usize, h: usize, colour: Rgba) -> Surface {
    let mut s = Surface::new(w, h);
    let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let dx = (x as f32 + 0.5 - cx) / cx;
            let dy = (y as f32 + 0.5 - cy) / cy;
            if dx * dx + dy * dy <= 1.0 {
                s.set_pixel(x, y, colour);
            }
        }
    }
    s
}

fn sky(w: usize, h: usize) -> Surface {
    let mut s = Surface::new(w, h);
    for y in 0..h {
        let t = y as f32 / h as f32;
        let c = Rgba::opaque((60.0 + 70.0 * t) as u8, (110.0 + 60.0 * t) as u8, 230);
        for x in 0..w {
            s.set_pixel(x as i32, y as i32, c);
        }
    }
    s
}

fn build_textures(cfg: &RenderConfig) -> anyhow::Result<TextureStore> {
    let mut store = TextureStore::new();

    for name in tiles::referenced_textures() {
        let colour = name_colour(name);
        let surface = if name.contains("tree") || name.contains("bush") {
            blob(32, 64, colour)
        } else {
            checker(32, 32, colour)
        };
        store.insert(name, surface)?;
    }

    store.insert(SKY_TEXTURE, sky(cfg.width, cfg.height))?;
    store.insert("rat", blob(60, 40, Rgba::opaque(120, 90, 70)))?;
    store.insert("sign", blob(32, 48, Rgba::opaque(160, 120, 60)))?;

    // 16x16 icon sheet; every cell gets its own colour
    let mut sheet = Surface::new(256, 256);
    for cy in 0..16 {
        for cx in 0..16 {
            let icon = blob(16, 16, name_colour(&format!("{cx},{cy}")));
            sheet.composite(&icon, (cx * 16, cy * 16));
        }
    }
    store.insert("items_1", sheet)?;

    for err in store.carve_sprites() {
        log::warn!("{err}");
    }
    Ok(store)
}
