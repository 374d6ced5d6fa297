//! The smallest addressable unit of world space.

use smallvec::SmallVec;

use crate::position::Position;
use crate::{StepCost, TileId};

/// A single tile: static position and occupancy data plus the neighbor links
/// the lattice establishes after world load.
///
/// Tiles carry no search state. Pathfinding scratch lives in a per-search
/// arena keyed by tile id (see [`crate::pathfind::Pathfinder`]), so unrelated
/// searches can never alias each other through the tile.
#[derive(Debug, Clone)]
pub struct Tile {
    id: TileId,
    position: Position,
    solid: bool,
    cost: StepCost,
    pub(crate) neighbors: SmallVec<[TileId; 8]>,
}

impl Tile {
    pub(crate) fn new(id: TileId, position: Position, solid: bool, cost: StepCost) -> Self {
        Tile {
            id,
            position,
            solid,
            cost,
            neighbors: SmallVec::new(),
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// True when the tile blocks every agent regardless of kind. Kind-specific
    /// blocking (closed doors, protection zones) belongs in the occupancy
    /// predicate callers pass to the pathfinder.
    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn set_solid(&mut self, solid: bool) {
        self.solid = solid;
    }

    /// Base cost of stepping onto this tile. Constant per tile; terrain
    /// loading may override it.
    pub fn step_cost(&self) -> StepCost {
        self.cost
    }

    pub fn set_step_cost(&mut self, cost: StepCost) {
        self.cost = cost;
    }

    /// The up-to-8 planar neighbor tiles linked by
    /// [`crate::lattice::Lattice::build`]. Does not include the tile itself.
    pub fn neighbors(&self) -> &[TileId] {
        &self.neighbors
    }
}
