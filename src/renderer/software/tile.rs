use glam::{Vec3, ivec2, vec2, vec3};

use crate::{
    renderer::{RenderError, software::Rasterizer},
    world::TextureStore,
};

impl Rasterizer {
    /// Horizontal textured rectangle centred on `centre`, drawn one scanline
    /// at a time from the far edge towards the viewer.
    ///
    /// ```text
    ///             near
    ///     _____________________
    ///     \    ceiling tile   /
    ///      \_________________/
    ///             far
    ///       _________________
    ///      /   floor tile    \
    ///     /___________________\
    ///             near
    /// ```
    ///
    /// `size.y` is ignored. Tiles with a non-positive extent draw nothing.
    pub fn tile(
        &mut self,
        centre: Vec3,
        size: Vec3,
        texture: &str,
        store: &mut TextureStore,
    ) -> Result<(), RenderError> {
        if !(size.x > 0.0 && size.z > 0.0) {
            return Ok(());
        }

        let y = centre.y;
        let far_z = centre.z + size.z * 0.5;
        let near_z = centre.z - size.z * 0.5;

        if far_z <= 0.0 {
            return Ok(());
        }

        // whole tile above or below the canvas
        let far_row = self.proj.project(vec3(centre.x, y, far_z)).y;
        if far_row < 0 || far_row >= self.height {
            return Ok(());
        }

        let fixed_near_z = self.proj.clamp_near(near_z, y);
        let near_row = self.proj.project(vec3(centre.x, y, fixed_near_z)).y;

        let top_row = far_row.min(near_row).clamp(0, self.height - 1);
        let bottom_row = far_row.max(near_row).clamp(0, self.height - 1);

        let left = centre.x - size.x * 0.5;
        let right = centre.x + size.x * 0.5;

        let tex = store
            .get_mut(texture)
            .ok_or_else(|| RenderError::MissingTexture(texture.to_owned()))?;

        let mut last_z = self.proj.row_to_depth(top_row - 1, y);

        for j in top_row..=bottom_row {
            let z = self.proj.row_to_depth(j, y);
            let prev_z = std::mem::replace(&mut last_z, z);

            // the horizon row itself maps to infinity
            if !(z > 0.0 && z.is_finite()) {
                continue;
            }

            let start = self.proj.project(vec3(left, y, z)).x;
            let end = self.proj.project(vec3(right, y, z)).x;
            if end < 0 || start >= self.width {
                continue;
            }

            // edges saturate for rows right next to the horizon
            let span = (end as i64 - start as i64 + 1) as f32;
            let texel_w = 1.0 / span;
            let texel_h = if prev_z.is_finite() {
                ((z - prev_z) / size.z).abs()
            } else {
                0.0
            };
            let progress_z = (z - near_z) / (far_z - near_z);

            for i in start.max(0)..=end.min(self.width - 1) {
                let idx = (i + j * self.width) as usize;
                if !self.ignore_depth && z >= self.depth[idx] {
                    continue;
                }

                let progress_x = (i as i64 - start as i64) as f32 / span;
                let colour = tex.sample_filtered(vec2(progress_x, progress_z), vec2(texel_w, texel_h));
                self.write_pixel(ivec2(i, j), z, colour);
            }
        }

        Ok(())
    }
}
