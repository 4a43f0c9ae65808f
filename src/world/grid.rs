use thiserror::Error;

/// Default world width in tiles.
pub const WORLD_W: usize = 512;
/// Default world height in tiles.
pub const WORLD_H: usize = 768;

/// Terrain type stored in the first byte of a [`WorldTile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TileKind {
    Empty = 0,
    Grassland = 1,
    Water = 2,
    Mountains = 3,
    Sand = 4,
    Forest = 5,
    RockyRoad = 6,
    DirtRoad = 7,
    StoneWall = 8,
    WoodFloor = 9,
}

impl TileKind {
    pub const COUNT: usize = 10;

    /// Unknown bytes decode as [`TileKind::Empty`].
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Grassland,
            2 => Self::Water,
            3 => Self::Mountains,
            4 => Self::Sand,
            5 => Self::Forest,
            6 => Self::RockyRoad,
            7 => Self::DirtRoad,
            8 => Self::StoneWall,
            9 => Self::WoodFloor,
            _ => Self::Empty,
        }
    }
}

/// One 2-byte map cell. `variant` means something different per kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct WorldTile {
    pub kind: u8,
    pub variant: u8,
}

impl WorldTile {
    pub const EMPTY: WorldTile = WorldTile::new(TileKind::Empty, 0);
    pub const WATER: WorldTile = WorldTile::new(TileKind::Water, 0);

    pub const fn new(kind: TileKind, variant: u8) -> Self {
        Self {
            kind: kind as u8,
            variant,
        }
    }

    #[inline]
    pub fn kind(self) -> TileKind {
        TileKind::from_u8(self.kind)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid of {w}x{h} needs {expected} tiles, got {got}")]
    SizeMismatch {
        w: usize,
        h: usize,
        expected: usize,
        got: usize,
    },
}

/// Immutable W×H tile map, row-major.
#[derive(Clone, Debug)]
pub struct TileGrid {
    w: usize,
    h: usize,
    tiles: Vec<WorldTile>,
}

impl TileGrid {
    pub fn new(w: usize, h: usize, tiles: Vec<WorldTile>) -> Result<Self, GridError> {
        if tiles.len() != w * h {
            return Err(GridError::SizeMismatch {
                w,
                h,
                expected: w * h,
                got: tiles.len(),
            });
        }
        Ok(Self { w, h, tiles })
    }

    /// Grid of `w * h` copies of `tile`.
    pub fn filled(w: usize, h: usize, tile: WorldTile) -> Self {
        Self {
            w,
            h,
            tiles: vec![tile; w * h],
        }
    }

    /// Decode packed `(kind, variant)` byte pairs already read from disk.
    pub fn from_bytes(w: usize, h: usize, bytes: &[u8]) -> Result<Self, GridError> {
        if bytes.len() != w * h * 2 {
            return Err(GridError::SizeMismatch {
                w,
                h,
                expected: w * h,
                got: bytes.len() / 2,
            });
        }
        let tiles = bytes
            .chunks_exact(2)
            .map(|p| WorldTile {
                kind: p[0],
                variant: p[1],
            })
            .collect();
        Self::new(w, h, tiles)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.w
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.h
    }

    /// `None` outside the grid; callers substitute their own default.
    #[inline]
    pub fn tile_at(&self, x: i32, y: i32) -> Option<WorldTile> {
        if x < 0 || y < 0 || x as usize >= self.w || y as usize >= self.h {
            return None;
        }
        Some(self.tiles[x as usize + y as usize * self.w])
    }

    /// Builder-side mutation; the renderer only ever reads.
    pub fn set(&mut self, x: usize, y: usize, tile: WorldTile) -> bool {
        if x >= self.w || y >= self.h {
            return false;
        }
        self.tiles[x + y * self.w] = tile;
        true
    }
}
