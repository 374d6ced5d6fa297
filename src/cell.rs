//! Fixed-size spatial cells, the unit of partitioning and broadcast scope.

use smallvec::SmallVec;

use crate::config::CellDims;
use crate::position::Position;
use crate::{AgentId, CellId, FxIndexSet, TileId};

/// The kind of an agent tracked in a cell's membership sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Player,
    Monster,
    Npc,
}

/// A fixed-size 3D block of tiles.
///
/// Each cell tracks which agents currently stand inside it, split by kind,
/// and keeps a neighbor list of at most 9 cells (its 8 planar neighbors plus
/// itself). Broadcast scope and the active-cell query both reduce to walking
/// these neighbor lists instead of scanning the world.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    coord: Position,
    dims: CellDims,
    tiles: Vec<Option<TileId>>,
    players: FxIndexSet<AgentId>,
    monsters: FxIndexSet<AgentId>,
    npcs: FxIndexSet<AgentId>,
    pub(crate) neighbors: SmallVec<[CellId; 9]>,
}

impl Cell {
    pub(crate) fn new(id: CellId, coord: Position, dims: CellDims) -> Self {
        let capacity = (dims.width * dims.height * dims.depth) as usize;

        // The neighbor list always starts with the cell itself.
        let mut neighbors = SmallVec::new();
        neighbors.push(id);

        Cell {
            id,
            coord,
            dims,
            tiles: vec![None; capacity],
            players: FxIndexSet::default(),
            monsters: FxIndexSet::default(),
            npcs: FxIndexSet::default(),
            neighbors,
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    /// The cell's coordinate on the cell grid (not a world position).
    pub fn coord(&self) -> Position {
        self.coord
    }

    /// The up-to-9 neighboring cells, this cell included. Vertical adjacency
    /// is not a neighbor relation; floors are simulated independently.
    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    /// Index of the tile slot holding `position` within this cell.
    ///
    /// The z component participates in the x/y projection: vertically stacked
    /// floors of one cell share horizontal extents under a fixed per-floor
    /// offset. Level geometry depends on this exact mapping.
    pub(crate) fn tile_slot(&self, position: Position) -> usize {
        let width = self.dims.width as i32;
        let height = self.dims.height as i32;
        let depth = self.dims.depth as i32;

        let z = position.z.rem_euclid(depth);
        let x = (position.x - z).rem_euclid(width);
        let y = (position.y - z).rem_euclid(height);

        (x + y * width + z * width * height) as usize
    }

    pub(crate) fn tile_id_at(&self, position: Position) -> Option<TileId> {
        self.tiles[self.tile_slot(position)]
    }

    pub(crate) fn set_tile(&mut self, slot: usize, tile: TileId) {
        self.tiles[slot] = Some(tile);
    }

    /// Iterates over the tiles that exist in this cell.
    pub fn tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles.iter().flatten().copied()
    }

    /// The agents of `kind` currently inside this cell (not its neighbors).
    pub fn agents(&self, kind: AgentKind) -> &FxIndexSet<AgentId> {
        match kind {
            AgentKind::Player => &self.players,
            AgentKind::Monster => &self.monsters,
            AgentKind::Npc => &self.npcs,
        }
    }

    pub(crate) fn insert_agent(&mut self, kind: AgentKind, agent: AgentId) {
        match kind {
            AgentKind::Player => self.players.insert(agent),
            AgentKind::Monster => self.monsters.insert(agent),
            AgentKind::Npc => self.npcs.insert(agent),
        };
    }

    pub(crate) fn remove_agent(&mut self, kind: AgentKind, agent: AgentId) {
        match kind {
            AgentKind::Player => self.players.shift_remove(&agent),
            AgentKind::Monster => self.monsters.shift_remove(&agent),
            AgentKind::Npc => self.npcs.shift_remove(&agent),
        };
    }

    /// Cells in `other`'s neighborhood that are not in this cell's
    /// neighborhood. Moving an agent from `self` to `other`, this is the set
    /// of cells newly entering its broadcast range.
    pub fn complement(&self, other: &Cell) -> FxIndexSet<CellId> {
        other
            .neighbors
            .iter()
            .filter(|cell| !self.neighbors.contains(cell))
            .copied()
            .collect()
    }
}
