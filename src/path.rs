//! Path result type for pathfinding searches.

use crate::TileId;

/// An ordered sequence of tiles produced by a search, goal-first.
///
/// Parent links are walked from the goal back to the start, so the slice is
/// goal-first and excludes the start tile. Callers consume it by popping from
/// the end: [`Path::pop_step`] yields the immediate next step toward the
/// goal.
///
/// An empty path means no route was found; that is an ordinary outcome
/// (callers fall back to idling or wandering), never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    tiles: Vec<TileId>,
    cost: u32,
}

impl Path {
    pub(crate) fn new(tiles: Vec<TileId>, cost: u32) -> Self {
        Path { tiles, cost }
    }

    pub(crate) fn empty() -> Self {
        Path::default()
    }

    /// Total movement cost of the path.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of steps in the path.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// True when no route was found (or the start already satisfied the
    /// goal condition).
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// True if the path passes through `tile`.
    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.contains(&tile)
    }

    /// The tiles of the path, goal-first.
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    /// The tile the path ends on.
    pub fn goal(&self) -> Option<TileId> {
        self.tiles.first().copied()
    }

    /// The immediate next step without removing it.
    pub fn next_step(&self) -> Option<TileId> {
        self.tiles.last().copied()
    }

    /// Removes and returns the immediate next step.
    pub fn pop_step(&mut self) -> Option<TileId> {
        self.tiles.pop()
    }
}

impl IntoIterator for Path {
    type Item = TileId;
    type IntoIter = std::vec::IntoIter<TileId>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.into_iter()
    }
}
