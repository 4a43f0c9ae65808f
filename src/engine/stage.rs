//! Draw stages and the grid walk that visits every cell of the view cone
//! once per stage.

/// Layer a tile handler contributes to. Stages are drawn in this order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Water, below everything else.
    Deep = 0,
    /// Grass, wood floors and the forest floor.
    Ground = 1,
    /// Sand and rocky roads.
    Road = 2,
    /// Dirt roads on top of the other ground layers.
    Overlay = 3,
    /// Walls, mountains, trees and objects.
    Solid = 4,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Deep,
        Stage::Ground,
        Stage::Road,
        Stage::Overlay,
        Stage::Solid,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Ground layers are painted back to front without a depth test;
    /// only [`Stage::Solid`] relies on the depth buffer.
    #[inline]
    pub fn ignores_depth(self) -> bool {
        self != Stage::Solid
    }

    /// True if rows are visited from the camera outwards.
    #[inline]
    pub fn near_to_far(self) -> bool {
        !self.ignores_depth()
    }
}

/// One visited cell: grid column `i` (0 is straight ahead, negative is
/// left) in row `j` (0 is the camera's own row).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkStep {
    pub stage: Stage,
    pub i: i32,
    pub j: i32,
}

/// Half width of the view cone in row `j`.
#[inline]
pub fn cone_half_width(j: i32) -> i32 {
    ((j as f32 * 3.0 + 3.0) / 2.0) as i32
}

/// Iterator over every stage, row and column of the view cone, in draw
/// order.
///
/// Stages 0..=3 walk rows far→near; the solid stage walks near→far so the
/// depth test rejects as much as possible.
#[derive(Clone, Debug)]
pub struct GridWalk {
    distance: i32,
    stage: usize,
    /// Position of the current row within the stage's row order.
    row: i32,
    i: i32,
}

impl GridWalk {
    /// Walk rows `0..=distance`.
    pub fn new(distance: i32) -> Self {
        let mut walk = Self {
            distance: distance.max(0),
            stage: 0,
            row: 0,
            i: 0,
        };
        walk.i = -cone_half_width(walk.current_j());
        walk
    }

    fn current_j(&self) -> i32 {
        match Stage::ALL.get(self.stage) {
            Some(stage) if stage.near_to_far() => self.row,
            _ => self.distance - self.row,
        }
    }
}

impl Iterator for GridWalk {
    type Item = WalkStep;

    fn next(&mut self) -> Option<WalkStep> {
        let stage = *Stage::ALL.get(self.stage)?;
        let j = self.current_j();
        let step = WalkStep { stage, i: self.i, j };

        // advance: column, then row, then stage
        self.i += 1;
        if self.i > cone_half_width(j) {
            self.row += 1;
            if self.row > self.distance {
                self.row = 0;
                self.stage += 1;
            }
            self.i = -cone_half_width(self.current_j());
        }

        Some(step)
    }
}
