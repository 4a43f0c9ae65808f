//! Camera space ↔ screen space.
//!
//! Camera space: `+x` right, `+y` **down** (the ground is at `y = 0`, the eye
//! at `eye_level < 0`), `+z` away from the viewer.

use glam::{IVec2, Vec2, Vec3, vec2};

use crate::config::RenderConfig;

/// Stateless projection derived from a [`RenderConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub perspective: f32,
    pub eye_level: f32,
    /// Screen row of the horizon.
    horizon: f32,
}

impl Projection {
    pub fn new(cfg: &RenderConfig) -> Self {
        let width = cfg.width as f32;
        let height = cfg.height as f32;
        Self {
            width,
            height,
            scale: cfg.scale(),
            perspective: cfg.perspective_correction,
            eye_level: cfg.eye_level,
            horizon: (width - height) / 2.0,
        }
    }

    /// Unrounded screen position of `p`. Meaningless for `p.z <= 0`.
    #[inline]
    pub fn project_exact(&self, p: Vec3) -> Vec2 {
        let z = p.z * self.perspective;
        let flat = vec2(p.x / z, (p.y - self.eye_level) / z);
        vec2(
            flat.x * self.scale + self.width / 2.0,
            flat.y * self.scale + self.horizon,
        )
    }

    /// Screen pixel of `p`, truncated towards zero. Callers guarantee `p.z > 0`.
    #[inline]
    pub fn project(&self, p: Vec3) -> IVec2 {
        self.project_exact(p).as_ivec2()
    }

    /// Depth at which the horizontal plane at height `y` crosses screen `row`.
    #[inline]
    pub fn row_to_depth(&self, row: i32, y: f32) -> f32 {
        ((y - self.eye_level) * self.scale) / (self.perspective * (row as f32 - self.horizon))
    }

    /// Depth at which the XZ segment `near → far` crosses screen `col`.
    ///
    /// Closed form of solving `project(lerp(near, far, t)).x == col` for z.
    #[inline]
    pub fn column_to_depth(&self, col: f32, near: Vec3, far: Vec3) -> f32 {
        let xn = near.x;
        let xd = far.x - near.x;
        let zn = near.z;
        let zd = far.z - near.z;

        let k = self.perspective * (col - 0.5 * self.width);

        (self.scale * (-zn * xd + xn * zd)) / (k * zd - xd * self.scale)
    }

    /// Push `z` out to the first depth that is still on screen for height `y`.
    ///
    /// Planes below the eye leave the screen through the last row, planes
    /// above it through row 0.
    pub fn clamp_near(&self, z: f32, y: f32) -> f32 {
        let boundary = if y >= self.eye_level {
            self.row_to_depth(self.height as i32 - 1, y)
        } else {
            self.row_to_depth(0, y)
        };
        if z >= boundary { z } else { boundary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3;

    fn proj() -> Projection {
        Projection::new(&RenderConfig::default())
    }

    #[test]
    fn centre_column_is_straight_ahead() {
        let p = proj();
        assert_eq!(p.project(vec3(0.0, -1.8, 10.0)), IVec2::new(214, 94));
    }

    #[test]
    fn row_to_depth_inverts_projection() {
        let p = proj();
        for row in [100, 150, 239] {
            for y in [0.0f32, 1.0] {
                let z = p.row_to_depth(row, y);
                assert!(z > 0.0);
                for x in [-7.0f32, 0.0, 3.5] {
                    let back = p.project_exact(vec3(x, y, z)).y;
                    assert!((back - row as f32).abs() < 1e-3, "row {row} y {y}: {back}");
                }
            }
        }
    }

    #[test]
    fn column_to_depth_inverts_projection() {
        let p = proj();
        let near = vec3(-2.5, 0.0, 3.0);
        let far = vec3(2.5, 0.0, 8.0);
        for t in [0.0f32, 0.3, 1.0] {
            let pt = near.lerp(far, t);
            let col = p.project_exact(pt).x;
            let z = p.column_to_depth(col, near, far);
            assert!((z - pt.z).abs() < 1e-3, "t {t}: {z} vs {}", pt.z);
        }
    }

    #[test]
    fn constant_depth_segment_returns_its_depth() {
        let p = proj();
        let near = vec3(-2.5, 0.0, 4.0);
        let far = vec3(2.5, 0.0, 4.0);
        assert!((p.column_to_depth(17.0, near, far) - 4.0).abs() < 1e-4);
    }

    #[test]
    fn clamp_near_keeps_visible_depths() {
        let p = proj();
        let boundary = p.row_to_depth(239, 0.0);
        assert_eq!(p.clamp_near(boundary + 5.0, 0.0), boundary + 5.0);
        assert_eq!(p.clamp_near(-3.0, 0.0), boundary);

        let ceiling = p.row_to_depth(0, -3.0);
        assert!(ceiling > 0.0);
        assert_eq!(p.clamp_near(0.1, -3.0), ceiling);
    }
}
