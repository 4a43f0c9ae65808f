//! Rendering abstraction layer.
//!
//! *The frame walk never touches a pixel buffer directly.*
//! Tile handlers produce [`DrawCall`]s and hand them to a type that
//! implements [`Renderer`].
//!
//! * A helper blanket-impl [`RendererExt`] adds `submit` so call-sites stay
//!   short.
//! * Every draw reports a missing texture as a [`RenderError`]; everything
//!   else (behind the camera, off screen, zero-sized) is silently culled.

use glam::{Vec3, vec3};
use thiserror::Error;

use crate::world::{Rgba, Surface, TextureStore};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The draw referenced a texture name the store does not know.
    #[error("missing texture `{0}`")]
    MissingTexture(String),
}

/// One primitive, in camera space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCall<'a> {
    /// Vertical billboard between its bottom-left and top-right corners.
    VQuad {
        bottom_left: Vec3,
        top_right: Vec3,
        texture: &'a str,
    },
    /// Floor/ceiling tile around `centre`; `size.y` is ignored.
    Tile {
        centre: Vec3,
        size: Vec3,
        texture: &'a str,
    },
}

impl<'a> DrawCall<'a> {
    pub fn vquad(bottom_left: Vec3, top_right: Vec3, texture: &'a str) -> Self {
        DrawCall::VQuad {
            bottom_left,
            top_right,
            texture,
        }
    }

    /// Square ground tile of edge `edge` at height `y`.
    pub fn tile(x: f32, y: f32, z: f32, edge: f32, texture: &'a str) -> Self {
        DrawCall::Tile {
            centre: vec3(x, y, z),
            size: vec3(edge, 0.0, edge),
            texture,
        }
    }

    pub fn texture(&self) -> &'a str {
        match *self {
            DrawCall::VQuad { texture, .. } | DrawCall::Tile { texture, .. } => texture,
        }
    }
}

/// A renderer that owns its destination surface for the whole frame.
///
/// `end_frame` lends the finished surface to a user-supplied closure.
pub trait Renderer {
    /// Reset per-frame buffers (depth, object ids, flags).
    fn begin_frame(&mut self);

    /// Rasterise one vertical billboard.
    fn draw_vquad(
        &mut self,
        bottom_left: Vec3,
        top_right: Vec3,
        texture: &str,
        store: &mut TextureStore,
    ) -> Result<(), RenderError>;

    /// Rasterise one floor/ceiling tile.
    fn draw_tile(
        &mut self,
        centre: Vec3,
        size: Vec3,
        texture: &str,
        store: &mut TextureStore,
    ) -> Result<(), RenderError>;

    /// Rasterise a debug line with depth.
    fn draw_line_3d(&mut self, from: Vec3, to: Vec3, colour: Rgba);

    /// Finish the frame and **loan** the finished surface to `submit`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&Surface);
}

/// Convenience blanket-impl dispatching [`DrawCall`]s.
pub trait RendererExt: Renderer {
    fn submit(&mut self, call: &DrawCall<'_>, store: &mut TextureStore) -> Result<(), RenderError> {
        match *call {
            DrawCall::VQuad {
                bottom_left,
                top_right,
                texture,
            } => self.draw_vquad(bottom_left, top_right, texture, store),
            DrawCall::Tile {
                centre,
                size,
                texture,
            } => self.draw_tile(centre, size, texture, store),
        }
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}

pub mod software;
