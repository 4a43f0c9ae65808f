use glam::{Vec3, ivec2, vec2, vec3};

use crate::{
    renderer::{RenderError, software::Rasterizer},
    world::TextureStore,
};

impl Rasterizer {
    /// Y-aligned textured billboard between `s` (bottom-left) and `e`
    /// (top-right), drawn one screen column at a time.
    ///
    /// Each column gets its own exact depth from
    /// [`Projection::column_to_depth`](crate::engine::Projection::column_to_depth),
    /// so the texture stays perspective-correct along the quad.
    pub fn vquad(
        &mut self,
        s: Vec3,
        e: Vec3,
        texture: &str,
        store: &mut TextureStore,
    ) -> Result<(), RenderError> {
        // "n" is near, "f" is far
        let (near, far) = if s.z < e.z { (s, e) } else { (e, s) };
        let (zn, zf, xn, xf) = (near.z, far.z, near.x, far.x);

        if zf <= 0.0 {
            return Ok(());
        }

        // "t" is top, "b" is bottom
        let yt = s.y.min(e.y);
        let yb = s.y.max(e.y);

        let zd = zf - zn;
        let xd = xf - xn;
        if zd == 0.0 && xd == 0.0 {
            return Ok(());
        }

        let near_xz = vec3(xn, 0.0, zn);
        let far_xz = vec3(xf, 0.0, zf);

        /* pull a near corner that sits behind the camera onto the screen edge */
        let (mut fixed_zn, mut fixed_xn) = (zn, xn);
        if zn <= 0.0 {
            match self.first_visible_depth(near_xz, far_xz) {
                Some(z) => {
                    fixed_zn = z;
                    fixed_xn = (z - zn) / zd * xd + xn;
                }
                None => return Ok(()),
            }
        }

        let edge_near = self.proj.project(vec3(fixed_xn, 0.0, fixed_zn)).x;
        let edge_far = self.proj.project(far_xz).x;

        let edge_left = edge_near.min(edge_far);
        let edge_right = edge_near.max(edge_far);
        // edges saturate near z = 0, so spans are taken in i64
        let hor_diff = edge_right as i64 - edge_left as i64;

        if edge_right < 0 || edge_left >= self.width {
            return Ok(());
        }

        let x_first = edge_left.clamp(0, self.width - 1);
        let x_last = edge_right.clamp(0, self.width - 1);

        let tex = store
            .get_mut(texture)
            .ok_or_else(|| RenderError::MissingTexture(texture.to_owned()))?;

        let texel_w = 1.0 / hor_diff.max(1) as f32;

        for i in x_first..=x_last {
            let z = self.proj.column_to_depth(i as f32, near_xz, far_xz);
            // also rejects NaN from edge-on columns
            if !(z > 0.0) {
                continue;
            }

            let p = if hor_diff == 0 {
                0.0
            } else {
                (i as i64 - edge_left as i64) as f32 / hor_diff as f32
            };

            // rows only depend on y and z
            let edge_top = self.proj.project(vec3(0.0, yt, z)).y;
            let edge_bottom = self.proj.project(vec3(0.0, yb, z)).y;

            if edge_bottom < 0 || edge_top >= self.height {
                continue;
            }

            let y_first = edge_top.clamp(0, self.height - 1);
            let y_last = edge_bottom.clamp(0, self.height - 1);

            let vert_diff = (edge_bottom as i64 - edge_top as i64).max(1);
            let texel_h = 1.0 / vert_diff as f32;

            for j in y_first..=y_last {
                // cheap reject before touching the texture
                let idx = (i + j * self.width) as usize;
                if !self.ignore_depth && z >= self.depth[idx] {
                    continue;
                }

                let r = (j as i64 - edge_top as i64) as f32 / vert_diff as f32;
                let colour = tex.sample_filtered(vec2(p, r), vec2(texel_w, texel_h));
                self.write_pixel(ivec2(i, j), z, colour);
            }
        }

        Ok(())
    }

    /// Smallest depth in `(0, far.z]` where the segment crosses the left or
    /// right screen edge, i.e. where it enters the view.
    ///
    /// `None` when the crossing lies beyond `far` or does not exist: the
    /// quad is off screen.
    fn first_visible_depth(&self, near: Vec3, far: Vec3) -> Option<f32> {
        let edges = [0.0, self.width as f32 - 1.0];
        edges
            .into_iter()
            .map(|col| self.proj.column_to_depth(col, near, far))
            .filter(|&z| z > 0.0 && z >= near.z && z <= far.z)
            .min_by(f32::total_cmp)
    }
}
