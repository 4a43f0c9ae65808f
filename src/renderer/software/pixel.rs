use glam::IVec2;

use crate::{renderer::software::Rasterizer, world::Rgba};

/// Distance fog. The colour's alpha is ignored; depth decides the blend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub enabled: bool,
    pub colour: Rgba,
    /// Divides both fog distances: higher means thicker fog.
    pub intensity: f32,
}

impl Fog {
    pub const DISABLED: Fog = Fog {
        enabled: false,
        colour: Rgba::TRANSPARENT,
        intensity: 1.0,
    };

    pub const fn new(colour: Rgba, intensity: f32) -> Self {
        Self {
            enabled: true,
            colour,
            intensity,
        }
    }
}

impl Rasterizer {
    /// Fog colour for `depth`: alpha ramps from 0 at the no-fog distance to
    /// 255 at the full-fog distance.
    pub fn fog_colour_at(&self, depth: f32) -> Rgba {
        let none = self.fog_none_distance / self.fog.intensity;
        let max = self.fog_max_distance / self.fog.intensity;

        let alpha = if depth >= max {
            1.0
        } else if depth <= none {
            0.0
        } else {
            (depth - none) / (max - none)
        };

        let c = self.fog.colour;
        Rgba::new(c.r, c.g, c.b, (alpha.clamp(0.0, 1.0) * 255.0) as u8)
    }

    /// The single choke point for every 3D pixel.
    ///
    /// `p` is in scene coordinates. Depth, object id and the blend source
    /// are all taken at the scene position; the result lands
    /// `scene_offset_y` rows higher in the frame, and rows pushed above the
    /// top are dropped.
    #[inline]
    pub fn write_pixel(&mut self, p: IVec2, depth: f32, colour: Rgba) {
        let Some(idx) = self.scene_index(p.x, p.y) else {
            return;
        };

        if colour.a == 0 {
            return;
        }

        if !self.ignore_depth && depth >= self.depth[idx] {
            return;
        }

        self.depth[idx] = depth;
        if let Some(tag) = self.tag {
            self.ids[idx] = tag;
        }

        let mut colour = colour.over(self.frame.pixels()[idx]);
        if self.fog.enabled {
            colour = self.fog_colour_at(depth).over(colour);
        }

        let out_y = p.y - self.scene_offset_y;
        if out_y < 0 {
            return;
        }
        self.frame.pixels_mut()[(p.x + out_y * self.width) as usize] = colour;
    }
}
