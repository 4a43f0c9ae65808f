//! Static renderer configuration.
//!
//! All numbers default to the values the game client ships with. A front end
//! may tweak distances or the viewport, but the sky texture has to match the
//! viewport width (it is copied row-for-row).

/// Knobs shared by the projection, the rasterizer and the frame walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Destination width in pixels.
    pub width: usize,
    /// Destination height in pixels.
    pub height: usize,
    /// Rows the 3D scene is shifted up by when written to the frame.
    pub scene_offset_y: i32,

    /// Edge length of one grid cell in world units.
    pub tile_size: f32,
    /// Camera distance behind the centre of its own cell.
    pub player_z: f32,
    /// Eye height; negative is up.
    pub eye_level: f32,
    pub perspective_correction: f32,

    /// Rows walked in front of the camera.
    pub viewing_distance: i32,
    /// Rows in which mobs and items are drawn.
    pub object_distance: i32,

    /// First map row that belongs to the underground.
    pub underground_start_y: i32,
    /// Last map row rendered with the underground (black) atmosphere.
    pub underground_end_y: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 428,
            height: 240,
            scene_offset_y: 30,
            tile_size: 5.0,
            player_z: -0.5,
            eye_level: -1.8,
            perspective_correction: 0.25,
            viewing_distance: 25,
            object_distance: 4,
            underground_start_y: 512,
            underground_end_y: 700,
        }
    }
}

impl RenderConfig {
    /// Pixels per flat unit; derived from the viewport width.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.width as f32 / 10.0
    }

    /// Depth below which fog is fully transparent (intensity 1).
    #[inline]
    pub fn fog_none_distance(&self) -> f32 {
        2.0 * self.tile_size
    }

    /// Depth at which fog is fully opaque (intensity 1).
    #[inline]
    pub fn fog_max_distance(&self) -> f32 {
        self.viewing_distance as f32 * 0.80 * self.tile_size
    }

    /// True if map row `y` uses the underground atmosphere.
    pub fn is_underground(&self, y: i32) -> bool {
        (self.underground_start_y..=self.underground_end_y).contains(&y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_client_constants() {
        let cfg = RenderConfig::default();
        assert!((cfg.scale() - 42.8).abs() < 1e-4);
        assert_eq!(cfg.fog_none_distance(), 10.0);
        assert!((cfg.fog_max_distance() - 100.0).abs() < 1e-4);
    }

    #[test]
    fn underground_band_is_inclusive() {
        let cfg = RenderConfig::default();
        assert!(!cfg.is_underground(511));
        assert!(cfg.is_underground(512));
        assert!(cfg.is_underground(700));
        assert!(!cfg.is_underground(701));
    }
}
