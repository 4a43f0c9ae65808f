//! CPU renderer for a tile-grid world.
//!
//! The crate turns an immutable [`world::TileGrid`], a camera pose and a set
//! of named textures into one composited RGBA frame plus a per-pixel
//! object-id map for mouse picking.
//!
//! * [`world`]    – pixels, textures, the grid and per-frame object placement.
//! * [`engine`]   – projection math and the staged frame walk.
//! * [`renderer`] – the software rasterizer (vquads, tiles, depth, fog).

pub mod config;
pub mod engine;
pub mod renderer;
pub mod world;

pub use config::RenderConfig;
pub use engine::{FrameAssembler, FrameStats, Projection, Stage};
pub use renderer::{DrawCall, RenderError, Renderer, RendererExt, software::Rasterizer};
pub use world::{CameraPose, Direction, GroundObjects, Rgba, Surface, TextureStore, TileGrid};
