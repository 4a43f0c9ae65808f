use glam::{IVec2, ivec2};

/// One of the four cardinal facings. Map rows grow towards the south.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Map step that moves one row *away* from the viewer, negated.
    ///
    /// The view row `j` maps to `pose - back() * j`.
    #[inline]
    pub fn back(self) -> IVec2 {
        match self {
            Direction::North => ivec2(0, 1),
            Direction::South => ivec2(0, -1),
            Direction::West => ivec2(1, 0),
            Direction::East => ivec2(-1, 0),
        }
    }

    /// Map step that moves one column to the viewer's right.
    #[inline]
    pub fn right(self) -> IVec2 {
        match self {
            Direction::North => ivec2(1, 0),
            Direction::South => ivec2(-1, 0),
            Direction::West => ivec2(0, -1),
            Direction::East => ivec2(0, 1),
        }
    }

    /// Facing after a quarter turn to the left.
    pub fn turn_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    /// Facing after a quarter turn to the right.
    pub fn turn_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }
}

/// Viewer position on the grid, supplied by the game layer every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraPose {
    pub x: i32,
    pub y: i32,
    pub facing: Direction,
}

impl CameraPose {
    pub fn new(x: i32, y: i32, facing: Direction) -> Self {
        Self { x, y, facing }
    }

    /// Absolute map cell for view column `i` (+ right) and view row `j`
    /// (+ away from the viewer).
    #[inline]
    pub fn to_map(&self, i: i32, j: i32) -> IVec2 {
        ivec2(self.x, self.y) + self.facing.right() * i - self.facing.back() * j
    }

    /// Pose one cell ahead of this one.
    pub fn stepped(self, forward: i32) -> Self {
        let p = self.to_map(0, forward);
        Self { x: p.x, y: p.y, ..self }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn north_looks_towards_smaller_y() {
        let pose = CameraPose::new(10, 10, Direction::North);
        assert_eq!(pose.to_map(0, 1), ivec2(10, 9));
        assert_eq!(pose.to_map(1, 0), ivec2(11, 10));
    }

    #[test]
    fn every_facing_is_orthonormal() {
        for d in [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ] {
            assert_eq!(d.back().dot(d.right()), 0);
            assert_eq!(d.back().abs().element_sum(), 1);
            assert_eq!(d.right().abs().element_sum(), 1);
        }
    }

    #[test]
    fn right_is_clockwise_of_forward() {
        for d in [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ] {
            let forward = -d.back();
            assert_eq!(d.turn_right().back() * -1, d.right());
            assert_eq!(d.turn_left().turn_right(), d);
            assert_ne!(forward, d.right());
        }
    }

    #[test]
    fn stepping_moves_forward() {
        let pose = CameraPose::new(3, 3, Direction::East);
        assert_eq!(pose.stepped(1), CameraPose::new(4, 3, Direction::East));
    }
}
