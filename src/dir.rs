//! Planar directions used for cell and tile neighbor linking.

/// The eight planar directions. Vertical adjacency is deliberately absent:
/// floors are linked only through explicit stairs or teleports, never through
/// the neighbor graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dir {
    WEST = 0,
    NORTH = 1,
    EAST = 2,
    SOUTH = 3,
    NORTHWEST = 4,
    SOUTHWEST = 5,
    NORTHEAST = 6,
    SOUTHEAST = 7,
}

pub use self::Dir::*;

impl Dir {
    /// All eight planar directions, cardinals first.
    pub fn planar() -> std::iter::Copied<std::slice::Iter<'static, Dir>> {
        [
            WEST, NORTH, EAST, SOUTH, NORTHWEST, SOUTHWEST, NORTHEAST, SOUTHEAST,
        ]
        .iter()
        .copied()
    }

    /// The (dx, dy) step for this direction. North is negative y.
    pub fn vector(self) -> (i32, i32) {
        match self {
            WEST => (-1, 0),
            NORTH => (0, -1),
            EAST => (1, 0),
            SOUTH => (0, 1),
            NORTHWEST => (-1, -1),
            SOUTHWEST => (-1, 1),
            NORTHEAST => (1, -1),
            SOUTHEAST => (1, 1),
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(self, NORTHWEST | SOUTHWEST | NORTHEAST | SOUTHEAST)
    }

    pub fn opposite(self) -> Dir {
        match self {
            WEST => EAST,
            NORTH => SOUTH,
            EAST => WEST,
            SOUTH => NORTH,
            NORTHWEST => SOUTHEAST,
            SOUTHWEST => NORTHEAST,
            NORTHEAST => SOUTHWEST,
            SOUTHEAST => NORTHWEST,
        }
    }
}
