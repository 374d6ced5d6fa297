//! Integer world position.

use std::fmt;

use crate::dir::Dir;

/// A position in world space. Coordinates are integers; `z` is the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Position { x, y, z }
    }

    pub const fn north(self) -> Self {
        Position::new(self.x, self.y - 1, self.z)
    }

    pub const fn south(self) -> Self {
        Position::new(self.x, self.y + 1, self.z)
    }

    pub const fn east(self) -> Self {
        Position::new(self.x + 1, self.y, self.z)
    }

    pub const fn west(self) -> Self {
        Position::new(self.x - 1, self.y, self.z)
    }

    pub const fn northwest(self) -> Self {
        Position::new(self.x - 1, self.y - 1, self.z)
    }

    pub const fn northeast(self) -> Self {
        Position::new(self.x + 1, self.y - 1, self.z)
    }

    pub const fn southwest(self) -> Self {
        Position::new(self.x - 1, self.y + 1, self.z)
    }

    pub const fn southeast(self) -> Self {
        Position::new(self.x + 1, self.y + 1, self.z)
    }

    pub const fn up(self) -> Self {
        Position::new(self.x, self.y, self.z + 1)
    }

    pub const fn down(self) -> Self {
        Position::new(self.x, self.y, self.z - 1)
    }

    /// The position one step in `dir` on the same floor.
    pub fn offset(self, dir: Dir) -> Self {
        let (dx, dy) = dir.vector();
        Position::new(self.x + dx, self.y + dy, self.z)
    }

    /// Planar Manhattan distance to `other`. Floors do not contribute; this
    /// is the A* heuristic and movement is per-floor.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// True when `other` is diagonal to this position: both planar deltas
    /// have magnitude exactly one.
    pub fn is_diagonal(self, other: Position) -> bool {
        ((self.x - other.x).abs() & (self.y - other.y).abs()) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
