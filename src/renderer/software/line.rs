use glam::Vec3;

use crate::{renderer::software::Rasterizer, world::Rgba};

/// World-space distance between two line samples.
const STEP: f32 = 0.01;

impl Rasterizer {
    /// Depth-tested debug line, sampled every [`STEP`] units along its length.
    /// Samples behind the camera are skipped.
    pub fn line_3d(&mut self, from: Vec3, to: Vec3, colour: Rgba) {
        let diff = to - from;
        let length = diff.length();
        if length == 0.0 || !length.is_finite() {
            return;
        }

        let step = diff / length * STEP;
        let samples = (length / STEP) as usize;
        for k in 0..=samples {
            let p = from + step * k as f32;
            if p.z <= 0.0 {
                continue;
            }
            let px = self.proj.project(p);
            self.write_pixel(px, p.z, colour);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use glam::vec3;

    #[test]
    fn line_on_the_floor_is_depth_tested() {
        let mut r = raster();
        r.line_3d(vec3(-1.0, 0.0, 5.0), vec3(1.0, 0.0, 5.0), RED);
        // 1.8 / 1.25 * 42.8 + 94
        let row = 155;
        let drawn = (0..428).filter(|&x| r.depth_at(x, row) == Some(5.0)).count();
        assert!(drawn > 10, "{drawn} pixels on row {row}");

        // a farther line over the same pixels loses
        r.line_3d(vec3(-1.0, 0.0, 5.000_1), vec3(1.0, 0.0, 5.000_1), Rgba::BLACK);
        assert_eq!(r.frame().pixel(214, row - 30), Some(RED));
    }

    #[test]
    fn line_behind_camera_is_skipped() {
        let mut r = raster();
        r.line_3d(vec3(-1.0, 0.0, -5.0), vec3(1.0, 0.0, -1.0), RED);
        r.line_3d(vec3(1.0, 1.0, 1.0), vec3(1.0, 1.0, 1.0), RED);
        assert_eq!(drawn_pixels(&r), 0);
    }
}
