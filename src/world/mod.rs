mod camera;
mod grid;
mod placement;
pub mod sprites;
mod surface;
mod texture;

pub use camera::{CameraPose, Direction};

pub use grid::{GridError, TileGrid, TileKind, WORLD_H, WORLD_W, WorldTile};

pub use placement::{GroundObjects, Item, MOB_MASK, Mob, NO_OBJECT};

pub use surface::{Rgba, Surface, SurfaceError, SurfaceRect};

pub use texture::{TextureError, TextureStore};
