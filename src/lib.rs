//! Simulation core for a tick-based multiplayer world server.
//!
//! Three tightly coupled pieces answer "what happens next, where, and to whom"
//! every fixed-interval frame:
//!
//! * a frame [`scheduler::Scheduler`] that time-orders deferred effects on a
//!   binary [`heap::PriorityQueue`],
//! * a spatial [`lattice::Lattice`] partitioning the world into fixed-size
//!   [`cell::Cell`]s to bound broadcast and "who needs simulating" queries,
//! * a [`pathfind::Pathfinder`] running A* over the tile neighbor graph the
//!   lattice builds, reusing the same priority queue for its open set.
//!
//! Gameplay rules, the wire protocol and persistence live outside this crate
//! and consume these interfaces through [`simulation::Simulation`].

use std::hash::BuildHasherDefault;

use indexmap::IndexSet;
use rustc_hash::FxHasher;

pub mod cell;
pub mod config;
pub mod dir;
pub mod error;
pub mod heap;
pub mod lattice;
pub mod path;
pub mod pathfind;
pub mod position;
pub mod scheduler;
pub mod simulation;
pub mod tile;

pub mod prelude {
    pub use crate::cell::{AgentKind, Cell};
    pub use crate::config::{CellDims, WorldSettings, WorldSettingsBuilder};
    pub use crate::dir::Dir;
    pub use crate::error::ScheduleError;
    pub use crate::heap::{Priority, PriorityQueue};
    pub use crate::lattice::{CellDelta, Lattice};
    pub use crate::path::Path;
    pub use crate::pathfind::{Pathfinder, SearchMode};
    pub use crate::position::Position;
    pub use crate::scheduler::{EventHandle, Frame, Scheduler};
    pub use crate::simulation::{Simulation, World};
    pub use crate::{AgentId, CellId, FxIndexSet, StepCost, TileId};
}

/// Stable id of a tile in the lattice tile arena.
pub type TileId = usize;

/// Stable id of a cell in the lattice cell arena.
pub type CellId = usize;

/// Cost of stepping onto a tile.
pub type StepCost = u32;

/// Insertion-ordered set with the fast Fx hasher. Used for cell membership
/// and active-cell sets so per-tick iteration order is deterministic.
pub type FxIndexSet<T> = IndexSet<T, BuildHasherDefault<FxHasher>>;

/// Opaque id of an externally managed agent (player, monster or npc).
/// The gameplay layer owns the agents; the lattice only tracks which cell
/// each one currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u64);
