use std::time::{Duration, Instant};

use glam::IVec2;

use crate::{
    config::RenderConfig,
    engine::{
        GridWalk, Stage,
        objects::{self, ObjectQuad},
        tiles::{self, DOOR_VARIANT, RoadVariant, Site},
    },
    renderer::{DrawCall, RenderError, Renderer, RendererExt, software::{Fog, Rasterizer}},
    world::{CameraPose, GroundObjects, Rgba, Surface, TextureStore, TileGrid, TileKind, WorldTile},
};

/// Name of the full-frame background used above ground.
pub const SKY_TEXTURE: &str = "3d_sky";

const SKY_FOG: Rgba = Rgba::opaque(128, 168, 255);
const SKY_FOG_INTENSITY: f32 = 1.0;
const UNDERGROUND_FOG_INTENSITY: f32 = 5.0;

/// What one [`FrameAssembler::render_frame`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Draw calls handed to the rasterizer.
    pub draws: usize,
    /// Draw calls that failed (missing texture) and were skipped.
    pub failed: usize,
    pub elapsed: Duration,
}

/// Turns the grid around a camera pose into a finished frame.
pub struct FrameAssembler {
    cfg: RenderConfig,
    raster: Rasterizer,
}

impl FrameAssembler {
    pub fn new(cfg: RenderConfig) -> Self {
        Self {
            raster: Rasterizer::new(&cfg),
            cfg,
        }
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    #[inline]
    pub fn rasterizer(&self) -> &Rasterizer {
        &self.raster
    }

    /// The last rendered frame.
    #[inline]
    pub fn frame(&self) -> &Surface {
        self.raster.frame()
    }

    /// Id of the mob or item visible at output pixel `(x, y)`.
    #[inline]
    pub fn object_at(&self, x: i32, y: i32) -> Option<u64> {
        self.raster.object_at(x, y)
    }

    /// Render the view from `pose`.
    ///
    /// Never fails: draws with missing textures are logged, counted in the
    /// returned stats and skipped.
    pub fn render_frame(
        &mut self,
        grid: &TileGrid,
        pose: CameraPose,
        objects: &GroundObjects,
        store: &mut TextureStore,
    ) -> FrameStats {
        let started = Instant::now();
        let mut stats = FrameStats::default();

        self.raster.begin_frame();
        self.setup_atmosphere(pose.y, store);

        let mut current = None;
        for step in GridWalk::new(self.cfg.viewing_distance) {
            if current != Some(step.stage) {
                current = Some(step.stage);
                self.raster.set_ignore_depth(step.stage.ignores_depth());
            }

            let map = pose.to_map(step.i, step.j);
            let site = Site {
                x: step.i as f32 * self.cfg.tile_size,
                z: step.j as f32 * self.cfg.tile_size - self.cfg.player_z,
                tile: self.cfg.tile_size,
            };

            let tile = self.resolve_tile(grid, objects, step.stage, map);
            for call in tiles::dispatch(step.stage, site, tile) {
                self.submit(&call, store, &mut stats);
            }

            if step.stage == Stage::Solid && step.j < self.cfg.object_distance {
                let standing_on = step.i == 0 && step.j == 0;
                self.draw_objects(objects, map, site, standing_on, store, &mut stats);
            }
        }

        stats.elapsed = started.elapsed();
        log::trace!(
            "frame at ({}, {}) {:?}: {} draws, {} failed, {:?}",
            pose.x,
            pose.y,
            pose.facing,
            stats.draws,
            stats.failed,
            stats.elapsed
        );
        stats
    }

    /// Loan the finished frame to `submit`, e.g. for presenting it.
    pub fn present<F>(&mut self, submit: F)
    where
        F: FnOnce(&Surface),
    {
        self.raster.end_frame(submit);
    }

    /// Background and fog: black underground, sky and blue haze above.
    fn setup_atmosphere(&mut self, map_y: i32, store: &TextureStore) {
        if self.cfg.is_underground(map_y) {
            self.raster.frame_mut().fill(Rgba::BLACK);
            self.raster
                .set_fog(Fog::new(Rgba::BLACK, UNDERGROUND_FOG_INTENSITY));
            return;
        }

        self.raster.set_fog(Fog::new(SKY_FOG, SKY_FOG_INTENSITY));
        let copied = match store.get(SKY_TEXTURE) {
            Some(sky) => self
                .raster
                .frame_mut()
                .overwrite_block(sky)
                .map_err(|e| log::warn!("sky texture unusable: {e}")),
            None => {
                log::warn!("missing texture `{SKY_TEXTURE}`");
                Err(())
            }
        };
        if copied.is_err() {
            self.raster.frame_mut().fill(Rgba::BLACK);
        }
    }

    /// Tile at `map` with the out-of-grid default and the variants that
    /// depend on surroundings applied.
    fn resolve_tile(&self, grid: &TileGrid, objects: &GroundObjects, stage: Stage, map: IVec2) -> WorldTile {
        let Some(mut tile) = grid.tile_at(map.x, map.y) else {
            return if stage == Stage::Deep {
                WorldTile::WATER
            } else {
                WorldTile::EMPTY
            };
        };

        match tile.kind() {
            TileKind::RockyRoad => {
                let mut bits = RoadVariant::from_bits_retain(tile.variant);
                bits.set(RoadVariant::COVERED, map.y >= self.cfg.underground_start_y);
                tile.variant = bits.bits();
            }
            TileKind::StoneWall => {
                tile.variant = if objects.has_item_list(map.x, map.y) {
                    DOOR_VARIANT
                } else {
                    0
                };
            }
            _ => {}
        }
        tile
    }

    fn draw_objects(
        &mut self,
        ground: &GroundObjects,
        map: IVec2,
        site: Site,
        standing_on: bool,
        store: &mut TextureStore,
        stats: &mut FrameStats,
    ) {
        let mobs = ground.mobs_at(map.x, map.y);
        let items = ground.items_at(map.x, map.y);
        if mobs.is_empty() && items.is_empty() {
            return;
        }

        let mut quads = objects::place_mobs(mobs, site, standing_on, store);
        quads.extend(objects::place_items(items, site, standing_on).into_iter().map(Ok));

        for quad in quads {
            let ObjectQuad {
                bottom_left,
                top_right,
                texture,
                tag,
            } = match quad {
                Ok(quad) => quad,
                Err(err) => {
                    stats.draws += 1;
                    Self::record_failure(err, stats);
                    continue;
                }
            };
            self.raster.set_tag(Some(tag));
            self.submit(&DrawCall::vquad(bottom_left, top_right, texture), store, stats);
        }
        self.raster.set_tag(None);
    }

    fn submit(&mut self, call: &DrawCall<'_>, store: &mut TextureStore, stats: &mut FrameStats) {
        stats.draws += 1;
        if let Err(err) = self.raster.submit(call, store) {
            Self::record_failure(err, stats);
        }
    }

    fn record_failure(err: RenderError, stats: &mut FrameStats) {
        stats.failed += 1;
        log::warn!("draw skipped: {err}");
    }
}
