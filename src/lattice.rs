//! The cell lattice: every cell in the world, indexed by grid coordinate.

use ndarray::Array3;
use rustc_hash::FxHashMap;
use slab::Slab;
use smallvec::SmallVec;
use tracing::{info, warn};

use crate::cell::{AgentKind, Cell};
use crate::config::WorldSettings;
use crate::dir::Dir;
use crate::position::Position;
use crate::tile::Tile;
use crate::{AgentId, CellId, FxIndexSet, StepCost, TileId};

/// The change in an agent's cell neighborhood after a move: which cells enter
/// its broadcast range and which leave it. Visibility updates send these
/// incrementally instead of resending the whole neighborhood on every step.
#[derive(Debug, Clone)]
pub struct CellDelta {
    /// The cell the agent now occupies.
    pub cell: CellId,
    /// Cells newly inside the agent's neighborhood.
    pub entered: FxIndexSet<CellId>,
    /// Cells no longer inside the agent's neighborhood.
    pub left: FxIndexSet<CellId>,
}

/// Indexes all cells by grid coordinate and resolves world positions to
/// cells and tiles.
///
/// Cells are created lazily as tiles are added during world load and never
/// destroyed afterwards. Once every tile exists, [`Lattice::build`] runs a
/// second pass establishing the cell and tile neighbor links that the
/// active-cell query and the pathfinder depend on.
///
/// Every position lookup outside the lattice bounds resolves to `None`;
/// "nothing here" is an ordinary answer, never an error.
pub struct Lattice {
    settings: WorldSettings,
    cells_x: u32,
    cells_y: u32,
    cells_z: u32,
    index: Array3<Option<CellId>>,
    cells: Slab<Cell>,
    tiles: Slab<Tile>,
    agents: FxHashMap<AgentId, (AgentKind, CellId)>,
    built: bool,
}

impl Lattice {
    /// Creates an empty lattice for the given world configuration.
    pub fn new(settings: &WorldSettings) -> Self {
        let cells_x = settings.width / settings.cell.width;
        let cells_y = settings.height / settings.cell.height;
        let cells_z = settings.depth / settings.cell.depth;

        Lattice {
            settings: *settings,
            cells_x,
            cells_y,
            cells_z,
            index: Array3::from_elem(
                (cells_x as usize, cells_y as usize, cells_z as usize),
                None,
            ),
            cells: Slab::new(),
            tiles: Slab::new(),
            agents: FxHashMap::default(),
            built: false,
        }
    }

    /// Number of cells created so far.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of tiles created so far. Tile ids are always below this count,
    /// which is what sizes the pathfinder's scratch arena.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// The cell-grid coordinate containing `position`.
    ///
    /// The z component is projected onto x/y before dividing: vertically
    /// stacked floors of a cell are offset by one tile per floor. This
    /// replicates the map format's floor-stacking convention exactly; level
    /// geometry depends on it.
    pub fn cell_coord(&self, position: Position) -> Position {
        let cell = self.settings.cell;
        let offset = position.z.rem_euclid(cell.depth as i32);

        let x = (position.x - offset).div_euclid(cell.width as i32);
        let y = (position.y - offset).div_euclid(cell.height as i32);
        let z = position.z.div_euclid(cell.depth as i32);

        Position::new(x, y, z)
    }

    fn coord_in_bounds(&self, coord: Position) -> bool {
        coord.x >= 0
            && (coord.x as u32) < self.cells_x
            && coord.y >= 0
            && (coord.y as u32) < self.cells_y
            && coord.z >= 0
            && (coord.z as u32) < self.cells_z
    }

    fn cell_id_at_coord(&self, coord: Position) -> Option<CellId> {
        if !self.coord_in_bounds(coord) {
            return None;
        }

        self.index[[coord.x as usize, coord.y as usize, coord.z as usize]]
    }

    /// The id of the cell containing `position`, if that region exists.
    pub fn cell_id_at(&self, position: Position) -> Option<CellId> {
        self.cell_id_at_coord(self.cell_coord(position))
    }

    /// The cell containing `position`, if that region exists.
    pub fn cell_at(&self, position: Position) -> Option<&Cell> {
        self.cells.get(self.cell_id_at(position)?)
    }

    /// Looks up a cell by id.
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    /// The id of the tile at `position`, if one exists.
    pub fn tile_id_at(&self, position: Position) -> Option<TileId> {
        self.cell_at(position)?.tile_id_at(position)
    }

    /// The tile at `position`, if one exists.
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        self.tiles.get(self.tile_id_at(position)?)
    }

    /// Mutable access to the tile at `position`.
    pub fn tile_at_mut(&mut self, position: Position) -> Option<&mut Tile> {
        let id = self.tile_id_at(position)?;
        self.tiles.get_mut(id)
    }

    /// Looks up a tile by id.
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    /// Mutable access to a tile by id.
    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id)
    }

    /// Adds a tile during world load, lazily creating its cell the first
    /// time the region is touched. Out-of-bounds positions are dropped with
    /// a warning. Adding a position twice updates the existing tile in place
    /// and returns its id.
    pub fn add_tile(
        &mut self,
        position: Position,
        solid: bool,
        cost: StepCost,
    ) -> Option<TileId> {
        let coord = self.cell_coord(position);
        if !self.coord_in_bounds(coord) {
            warn!(%position, "dropping tile outside the lattice bounds");
            return None;
        }

        let cell_id = match self.index[[coord.x as usize, coord.y as usize, coord.z as usize]] {
            Some(id) => id,
            None => {
                let entry = self.cells.vacant_entry();
                let id = entry.key();
                entry.insert(Cell::new(id, coord, self.settings.cell));
                self.index[[coord.x as usize, coord.y as usize, coord.z as usize]] = Some(id);
                id
            }
        };

        let slot = self.cells[cell_id].tile_slot(position);
        if let Some(existing) = self.cells[cell_id].tile_id_at(position) {
            let tile = &mut self.tiles[existing];
            tile.set_solid(solid);
            tile.set_step_cost(cost);
            return Some(existing);
        }

        let entry = self.tiles.vacant_entry();
        let tile_id = entry.key();
        entry.insert(Tile::new(tile_id, position, solid, cost));
        self.cells[cell_id].set_tile(slot, tile_id);

        Some(tile_id)
    }

    /// Establishes the bidirectional neighbor links for every cell and tile.
    ///
    /// Call once after all tiles have been added. Links to out-of-range or
    /// nonexistent neighbors are skipped, so the relations are symmetric
    /// everywhere except at map edges. Calling again after further
    /// [`Lattice::add_tile`] calls relinks from scratch.
    pub fn build(&mut self) {
        let start = std::time::Instant::now();

        let cell_ids: Vec<CellId> = self.cells.iter().map(|(id, _)| id).collect();
        for id in cell_ids {
            let coord = self.cells[id].coord();

            let mut links: SmallVec<[CellId; 8]> = SmallVec::new();
            for dir in Dir::planar() {
                let (dx, dy) = dir.vector();
                let neighbor = Position::new(coord.x + dx, coord.y + dy, coord.z);
                if let Some(neighbor_id) = self.cell_id_at_coord(neighbor) {
                    links.push(neighbor_id);
                }
            }

            let cell = &mut self.cells[id];
            cell.neighbors.truncate(1); // keep self
            cell.neighbors.extend(links);
        }

        let tile_ids: Vec<TileId> = self.tiles.iter().map(|(id, _)| id).collect();
        for id in tile_ids {
            let position = self.tiles[id].position();

            let mut links: SmallVec<[TileId; 8]> = SmallVec::new();
            for dir in Dir::planar() {
                if let Some(neighbor_id) = self.tile_id_at(position.offset(dir)) {
                    links.push(neighbor_id);
                }
            }

            self.tiles[id].neighbors = links;
        }

        self.built = true;
        info!(
            cells = self.cells.len(),
            tiles = self.tiles.len(),
            elapsed = ?start.elapsed(),
            "linked lattice neighbor references"
        );
    }

    /// True once [`Lattice::build`] has run.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// The set of cells currently within broadcast range of at least one
    /// observer: the union of each observer's cell neighbor list. Only agents
    /// inside this set are evaluated for AI and movement this tick; agents
    /// elsewhere are frozen.
    pub fn active_cells<I>(&self, observers: I) -> FxIndexSet<CellId>
    where
        I: IntoIterator<Item = AgentId>,
    {
        let mut active = FxIndexSet::default();

        for observer in observers {
            let Some(&(_, cell_id)) = self.agents.get(&observer) else {
                continue;
            };
            if let Some(cell) = self.cells.get(cell_id) {
                active.extend(cell.neighbors().iter().copied());
            }
        }

        active
    }

    /// Registers an agent at `position`, adding it to the containing cell's
    /// membership set. Returns `None` if the position resolves to no cell.
    pub fn insert_agent(
        &mut self,
        agent: AgentId,
        kind: AgentKind,
        position: Position,
    ) -> Option<CellId> {
        let cell_id = self.cell_id_at(position)?;

        self.cells[cell_id].insert_agent(kind, agent);
        self.agents.insert(agent, (kind, cell_id));

        Some(cell_id)
    }

    /// Moves a registered agent to `position`, updating cell membership and
    /// returning the enter/leave neighborhood delta. A move within the same
    /// cell yields an empty delta. Returns `None` for unregistered agents or
    /// positions outside the lattice (the agent then stays where it was).
    pub fn move_agent(&mut self, agent: AgentId, position: Position) -> Option<CellDelta> {
        let (kind, old_cell) = *self.agents.get(&agent)?;
        let new_cell = self.cell_id_at(position)?;

        if new_cell == old_cell {
            return Some(CellDelta {
                cell: new_cell,
                entered: FxIndexSet::default(),
                left: FxIndexSet::default(),
            });
        }

        self.cells[old_cell].remove_agent(kind, agent);
        self.cells[new_cell].insert_agent(kind, agent);
        self.agents.insert(agent, (kind, new_cell));

        let entered = self.cells[old_cell].complement(&self.cells[new_cell]);
        let left = self.cells[new_cell].complement(&self.cells[old_cell]);

        Some(CellDelta {
            cell: new_cell,
            entered,
            left,
        })
    }

    /// Unregisters an agent, removing it from its cell's membership set.
    pub fn remove_agent(&mut self, agent: AgentId) -> Option<CellId> {
        let (kind, cell_id) = self.agents.remove(&agent)?;
        self.cells[cell_id].remove_agent(kind, agent);
        Some(cell_id)
    }

    /// The cell a registered agent currently occupies.
    pub fn agent_cell(&self, agent: AgentId) -> Option<CellId> {
        self.agents.get(&agent).map(|&(_, cell)| cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldSettingsBuilder;

    fn settings() -> WorldSettings {
        WorldSettingsBuilder::new(64, 64, 8)
            .cell_size(8, 8, 8)
            .tick_ms(50)
            .build()
    }

    /// A lattice with every ground-floor tile filled in.
    fn flat_lattice() -> Lattice {
        let settings = settings();
        let mut lattice = Lattice::new(&settings);

        for y in 0..64 {
            for x in 0..64 {
                lattice.add_tile(Position::new(x, y, 0), false, 1);
            }
        }

        lattice.build();
        lattice
    }

    #[test]
    fn tile_round_trip() {
        let mut lattice = Lattice::new(&settings());

        let position = Position::new(13, 27, 3);
        let id = lattice.add_tile(position, false, 1).unwrap();

        let tile = lattice.tile_at(position).expect("tile should resolve");
        assert_eq!(tile.id(), id);
        assert_eq!(tile.position(), position);
    }

    #[test]
    fn cell_coord_applies_the_floor_projection() {
        let lattice = Lattice::new(&settings());

        // Ground floor: plain integer division.
        assert_eq!(
            lattice.cell_coord(Position::new(10, 10, 0)),
            Position::new(1, 1, 0)
        );

        // Floor 3 shifts x/y back by 3 before dividing: (10 - 3) / 8 = 0.
        assert_eq!(
            lattice.cell_coord(Position::new(10, 10, 3)),
            Position::new(0, 0, 0)
        );

        // Exactly on the shifted boundary.
        assert_eq!(
            lattice.cell_coord(Position::new(11, 11, 3)),
            Position::new(1, 1, 0)
        );
    }

    #[test]
    fn out_of_bounds_lookups_resolve_to_none() {
        let mut lattice = Lattice::new(&settings());

        assert!(lattice.cell_at(Position::new(-1, 0, 0)).is_none());
        assert!(lattice.tile_at(Position::new(64, 0, 0)).is_none());
        assert!(lattice.add_tile(Position::new(0, 0, 99), false, 1).is_none());
    }

    #[test]
    fn cells_are_created_lazily_and_once() {
        let mut lattice = Lattice::new(&settings());
        assert_eq!(lattice.cell_count(), 0);

        lattice.add_tile(Position::new(1, 1, 0), false, 1);
        lattice.add_tile(Position::new(2, 2, 0), false, 1);
        assert_eq!(lattice.cell_count(), 1, "same region, one cell");

        lattice.add_tile(Position::new(20, 1, 0), false, 1);
        assert_eq!(lattice.cell_count(), 2);
    }

    #[test]
    fn adding_a_tile_twice_updates_in_place() {
        let mut lattice = Lattice::new(&settings());

        let position = Position::new(5, 5, 0);
        let first = lattice.add_tile(position, false, 1).unwrap();
        let second = lattice.add_tile(position, true, 4).unwrap();

        assert_eq!(first, second);
        let tile = lattice.tile(first).unwrap();
        assert!(tile.is_solid());
        assert_eq!(tile.step_cost(), 4);
    }

    #[test]
    fn cell_neighbor_relations_are_symmetric() {
        let lattice = flat_lattice();

        for (id, cell) in lattice.cells.iter() {
            for &neighbor in cell.neighbors() {
                if neighbor == id {
                    continue;
                }
                let other = lattice.cell(neighbor).unwrap();
                assert!(
                    other.neighbors().contains(&id),
                    "cell {id} links {neighbor} but not vice versa"
                );
            }
        }
    }

    #[test]
    fn tile_neighbor_counts_match_the_interior_and_edges() {
        let lattice = flat_lattice();

        let interior = lattice.tile_at(Position::new(10, 10, 0)).unwrap();
        assert_eq!(interior.neighbors().len(), 8);

        let corner = lattice.tile_at(Position::new(0, 0, 0)).unwrap();
        assert_eq!(corner.neighbors().len(), 3);

        let edge = lattice.tile_at(Position::new(10, 0, 0)).unwrap();
        assert_eq!(edge.neighbors().len(), 5);
    }

    #[test]
    fn tile_neighbor_relations_are_symmetric() {
        let lattice = flat_lattice();

        for (id, tile) in lattice.tiles.iter() {
            for &neighbor in tile.neighbors() {
                assert_ne!(neighbor, id, "a tile must not be its own neighbor");
                let other = lattice.tile(neighbor).unwrap();
                assert!(
                    other.neighbors().contains(&id),
                    "tile {id} links {neighbor} but not vice versa"
                );
            }
        }
    }

    #[test]
    fn active_cells_is_the_union_of_observer_neighborhoods() {
        let mut lattice = flat_lattice();

        // Two observers in opposite corners of the map.
        lattice.insert_agent(AgentId(1), AgentKind::Player, Position::new(1, 1, 0));
        lattice.insert_agent(AgentId(2), AgentKind::Player, Position::new(60, 60, 0));

        let active = lattice.active_cells([AgentId(1), AgentId(2)]);

        let mut expected = FxIndexSet::default();
        for position in [Position::new(1, 1, 0), Position::new(60, 60, 0)] {
            let cell = lattice.cell_at(position).unwrap();
            expected.extend(cell.neighbors().iter().copied());
        }

        assert_eq!(active, expected);
        // Corner cells have 3 neighbors plus self; the two sets are disjoint.
        assert_eq!(active.len(), 8);
    }

    #[test]
    fn unregistered_observers_contribute_nothing() {
        let lattice = flat_lattice();
        assert!(lattice.active_cells([AgentId(9)]).is_empty());
    }

    #[test]
    fn moving_an_agent_reports_the_neighborhood_delta() {
        let mut lattice = flat_lattice();

        lattice.insert_agent(AgentId(1), AgentKind::Monster, Position::new(20, 20, 0));
        let old_cell = lattice.agent_cell(AgentId(1)).unwrap();

        // Step one cell to the east: one column of cells enters the 3x3
        // neighborhood, one column leaves it.
        let delta = lattice
            .move_agent(AgentId(1), Position::new(28, 20, 0))
            .unwrap();
        let new_cell = lattice.agent_cell(AgentId(1)).unwrap();

        assert_ne!(old_cell, new_cell);
        assert_eq!(delta.cell, new_cell);
        assert_eq!(delta.entered.len(), 3);
        assert_eq!(delta.left.len(), 3);
        assert!(delta.entered.is_disjoint(&delta.left));

        // Membership sets moved with the agent.
        assert!(lattice
            .cell(new_cell)
            .unwrap()
            .agents(AgentKind::Monster)
            .contains(&AgentId(1)));
        assert!(!lattice
            .cell(old_cell)
            .unwrap()
            .agents(AgentKind::Monster)
            .contains(&AgentId(1)));
    }

    #[test]
    fn same_cell_move_yields_an_empty_delta() {
        let mut lattice = flat_lattice();

        lattice.insert_agent(AgentId(1), AgentKind::Npc, Position::new(20, 20, 0));
        let delta = lattice
            .move_agent(AgentId(1), Position::new(21, 20, 0))
            .unwrap();

        assert!(delta.entered.is_empty());
        assert!(delta.left.is_empty());
    }

    #[test]
    fn removed_agent_leaves_its_cell() {
        let mut lattice = flat_lattice();

        lattice.insert_agent(AgentId(1), AgentKind::Player, Position::new(5, 5, 0));
        let cell = lattice.remove_agent(AgentId(1)).unwrap();

        assert!(lattice
            .cell(cell)
            .unwrap()
            .agents(AgentKind::Player)
            .is_empty());
        assert!(lattice.agent_cell(AgentId(1)).is_none());
        assert!(lattice.remove_agent(AgentId(1)).is_none());
    }
}
