mod frame;
pub mod objects;
mod projection;
mod stage;
pub mod tiles;

pub use frame::{FrameAssembler, FrameStats, SKY_TEXTURE};

pub use projection::Projection;

pub use stage::{GridWalk, Stage, WalkStep, cone_half_width};
