//! A* pathfinding over the tile neighbor graph.

use crate::heap::{Priority, PriorityQueue};
use crate::lattice::Lattice;
use crate::path::Path;
use crate::tile::Tile;
use crate::TileId;

/// Diagonal steps cost three times the base step, discouraging degenerate
/// diagonal-only paths.
const DIAGONAL_MULTIPLIER: u32 = 3;

/// Goal acceptance mode for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Succeed on any neighbor of the destination. Checked before the
    /// equality test so the search terminates one hop early; used for "get
    /// next to and interact" movement (attacking, using an object).
    Adjacent,
    /// Succeed only on the destination tile itself.
    Exact,
}

/// Per-tile search scratch, reset through the dirty list between searches.
#[derive(Debug, Clone, Copy, Default)]
struct ScratchNode {
    parent: Option<TileId>,
    g: u32,
    h: u32,
    f: u32,
    visited: bool,
    closed: bool,
}

/// Open-set entry, keyed by f = g + h.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: u32,
    tile: TileId,
}

impl Priority for OpenEntry {
    fn priority(&self) -> u64 {
        self.f as u64
    }
}

/// A* search over the tile graph the lattice builds, with a per-agent
/// occupancy rule supplied by the caller.
///
/// Search state lives in an arena indexed by tile id rather than on the
/// tiles themselves, so a search can never alias another search's results.
/// The arena slots named by the dirty list are reset unconditionally at the
/// start of every search; a previous search that was aborted midway
/// therefore cannot leak into the next one.
#[derive(Debug, Default)]
pub struct Pathfinder {
    scratch: Vec<ScratchNode>,
    dirty: Vec<TileId>,
    open: PriorityQueue<OpenEntry>,
}

impl Pathfinder {
    pub fn new() -> Self {
        Pathfinder::default()
    }

    /// Searches for a route from `from` to `to` over the tile graph.
    ///
    /// `occupied` is the requesting agent's occupancy rule, evaluated fresh
    /// for every expanded neighbor; it must be cheap and free of side
    /// effects. A wall blocks everyone, but a closed door may block one
    /// agent kind and not another, which is why the rule comes from the
    /// caller rather than the tile.
    ///
    /// Returns a goal-first [`Path`], empty when the open set exhausts
    /// before the goal condition is met.
    pub fn search<F>(
        &mut self,
        lattice: &Lattice,
        from: TileId,
        to: TileId,
        mode: SearchMode,
        occupied: F,
    ) -> Path
    where
        F: Fn(&Tile) -> bool,
    {
        self.reset_scratch(lattice.tile_count());
        self.open.clear();

        let (Some(start), Some(goal)) = (lattice.tile(from), lattice.tile(to)) else {
            return Path::empty();
        };

        let h = heuristic(start, goal);
        self.scratch[from] = ScratchNode {
            parent: None,
            g: 0,
            h,
            f: h,
            visited: true,
            closed: false,
        };
        self.dirty.push(from);
        self.open.push(OpenEntry { f: h, tile: from });

        while let Some(entry) = self.open.pop() {
            let current = entry.tile;

            let reached = match mode {
                SearchMode::Adjacent => goal.neighbors().contains(&current),
                SearchMode::Exact => current == to,
            };
            if reached {
                return self.reconstruct(current);
            }

            self.scratch[current].closed = true;

            let Some(current_tile) = lattice.tile(current) else {
                continue;
            };
            let current_position = current_tile.position();
            let current_g = self.scratch[current].g;

            for &neighbor in current_tile.neighbors() {
                if self.scratch[neighbor].closed {
                    continue;
                }

                let Some(neighbor_tile) = lattice.tile(neighbor) else {
                    continue;
                };
                if occupied(neighbor_tile) {
                    continue;
                }

                let step = if current_position.is_diagonal(neighbor_tile.position()) {
                    DIAGONAL_MULTIPLIER
                } else {
                    1
                };
                let g = current_g + step * neighbor_tile.step_cost();

                let node = &mut self.scratch[neighbor];
                let first_visit = !node.visited;
                if first_visit || g < node.g {
                    if node.h == 0 {
                        node.h = heuristic(neighbor_tile, goal);
                    }
                    node.visited = true;
                    node.parent = Some(current);
                    node.g = g;
                    node.f = g + node.h;
                    let f = node.f;

                    self.dirty.push(neighbor);

                    if first_visit {
                        self.open.push(OpenEntry { f, tile: neighbor });
                    } else {
                        self.open
                            .rescore_where(|entry| entry.tile == neighbor, |entry| entry.f = f);
                    }
                }
            }
        }

        Path::empty()
    }

    /// Resets the scratch slots the previous search touched. Runs at the
    /// start of a search, so even an aborted predecessor is cleaned up.
    fn reset_scratch(&mut self, tile_count: usize) {
        if self.scratch.len() < tile_count {
            self.scratch.resize(tile_count, ScratchNode::default());
        }

        for id in self.dirty.drain(..) {
            if let Some(node) = self.scratch.get_mut(id) {
                *node = ScratchNode::default();
            }
        }
    }

    /// Walks parent links from `tile` back to the start, yielding the path
    /// goal-first. The start tile itself is excluded.
    fn reconstruct(&self, tile: TileId) -> Path {
        let cost = self.scratch[tile].g;

        let mut tiles = Vec::new();
        let mut current = tile;
        while let Some(parent) = self.scratch[current].parent {
            tiles.push(current);
            current = parent;
        }

        Path::new(tiles, cost)
    }
}

fn heuristic(from: &Tile, to: &Tile) -> u32 {
    from.position().manhattan_distance(to.position())
}
