//! ---------------------------------------------------------------------------
//! CPU rasterizer for vertical billboards and floor tiles
//!
//! * Writes into an owned [`Surface`] in straight-alpha RGBA.
//! * Keeps a per-pixel depth buffer, so draw order only matters for
//!   blending, and a per-pixel object-id buffer for mouse picking.
//! * Every pixel goes through [`Rasterizer::write_pixel`].
//! ---------------------------------------------------------------------------

mod line;
mod pixel;
mod tile;
mod vquad;

pub use pixel::Fog;

use glam::Vec3;

use crate::{
    config::RenderConfig,
    engine::Projection,
    renderer::{RenderError, Renderer},
    world::{NO_OBJECT, Rgba, Surface, TextureStore},
};

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

pub struct Rasterizer {
    frame: Surface,
    depth: Vec<f32>,
    ids: Vec<u64>,

    /// Fill the depth buffer but do not test against it.
    ignore_depth: bool,
    /// `Some(id)` while object draws tag the id buffer.
    tag: Option<u64>,
    fog: Fog,

    proj: Projection,
    width: i32,
    height: i32,
    scene_offset_y: i32,
    fog_none_distance: f32,
    fog_max_distance: f32,
}

impl Rasterizer {
    pub fn new(cfg: &RenderConfig) -> Self {
        let len = cfg.width * cfg.height;
        Self {
            frame: Surface::new(cfg.width, cfg.height),
            depth: vec![f32::INFINITY; len],
            ids: vec![NO_OBJECT; len],
            ignore_depth: false,
            tag: None,
            fog: Fog::DISABLED,
            proj: Projection::new(cfg),
            width: cfg.width as i32,
            height: cfg.height as i32,
            scene_offset_y: cfg.scene_offset_y,
            fog_none_distance: cfg.fog_none_distance(),
            fog_max_distance: cfg.fog_max_distance(),
        }
    }

    /*──────────────────────── accessors ──────────────────────────────*/

    #[inline]
    pub fn projection(&self) -> &Projection {
        &self.proj
    }

    /// The frame as finished by the last draw.
    #[inline]
    pub fn frame(&self) -> &Surface {
        &self.frame
    }

    /// For background fills before the first draw.
    #[inline]
    pub fn frame_mut(&mut self) -> &mut Surface {
        &mut self.frame
    }

    /// Depth recorded at *scene* pixel `(x, y)` (before the Y offset).
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        self.scene_index(x, y).map(|i| self.depth[i])
    }

    /// Object under *output* pixel `(x, y)`, for mouse picking.
    ///
    /// Applies the same Y offset as the writes, so the result matches what
    /// is visible at that frame position.
    pub fn object_at(&self, x: i32, y: i32) -> Option<u64> {
        self.scene_index(x, y + self.scene_offset_y)
            .map(|i| self.ids[i])
            .filter(|&id| id != NO_OBJECT)
    }

    /*──────────────────────── state ──────────────────────────────────*/

    pub fn set_ignore_depth(&mut self, ignore: bool) {
        self.ignore_depth = ignore;
    }

    /// Tag following writes with `id`; `None` stops tagging.
    pub fn set_tag(&mut self, tag: Option<u64>) {
        self.tag = tag;
    }

    pub fn set_fog(&mut self, fog: Fog) {
        self.fog = fog;
    }

    pub fn fog(&self) -> Fog {
        self.fog
    }

    #[inline]
    fn scene_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some((x + y * self.width) as usize)
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Rasterizer {
    fn begin_frame(&mut self) {
        self.depth.fill(f32::INFINITY);
        self.ids.fill(NO_OBJECT);
        self.ignore_depth = false;
        self.tag = None;
    }

    fn draw_vquad(
        &mut self,
        bottom_left: Vec3,
        top_right: Vec3,
        texture: &str,
        store: &mut TextureStore,
    ) -> Result<(), RenderError> {
        self.vquad(bottom_left, top_right, texture, store)
    }

    fn draw_tile(
        &mut self,
        centre: Vec3,
        size: Vec3,
        texture: &str,
        store: &mut TextureStore,
    ) -> Result<(), RenderError> {
        self.tile(centre, size, texture, store)
    }

    fn draw_line_3d(&mut self, from: Vec3, to: Vec3, colour: Rgba) {
        self.line_3d(from, to, colour);
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&Surface),
    {
        submit(&self.frame);
    }
}


#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use glam::vec3;

    #[test]
    fn begin_frame_resets_buffers() {
        let mut r = raster();
        let mut store = store_with("red", RED);
        r.set_tag(Some(5));
        r.draw_vquad(vec3(-1.0, 0.0, 5.0), vec3(1.0, -2.0, 5.0), "red", &mut store)
            .unwrap();
        assert!(r.depth.iter().any(|d| d.is_finite()));

        r.begin_frame();
        assert!(r.depth.iter().all(|d| *d == f32::INFINITY));
        assert!(r.ids.iter().all(|id| *id == NO_OBJECT));
        assert_eq!(r.tag, None);
    }

    #[test]
    fn vanishing_fog_matches_no_fog() {
        let draw = |fog: Fog| {
            let mut r = raster();
            let mut store = store_with("red", RED);
            r.frame_mut().fill(Rgba::opaque(0, 0, 90));
            r.set_fog(fog);
            r.draw_tile(vec3(0.0, 0.0, 40.0), vec3(30.0, 0.0, 70.0), "red", &mut store)
                .unwrap();
            r.draw_vquad(vec3(-4.0, 0.0, 60.0), vec3(4.0, -6.0, 90.0), "red", &mut store)
                .unwrap();
            r.frame().pixels().to_vec()
        };

        let plain = draw(Fog::DISABLED);
        let faint = draw(Fog::new(Rgba::opaque(255, 255, 255), 1e-6));
        assert!(plain.iter().any(|p| *p == RED));
        assert_eq!(plain, faint);
    }

    #[test]
    fn end_frame_lends_the_frame() {
        let mut r = raster();
        r.frame_mut().fill(RED);
        let mut seen = 0;
        r.end_frame(|fb| seen = fb.pixels().iter().filter(|p| **p == RED).count());
        assert_eq!(seen, 428 * 240);
    }
}
