//! The top-level simulation context.
//!
//! Everything is explicitly constructed and owned here; there are no global
//! counters or singleton lattices, so multiple independent simulations can
//! coexist (one per test, one per shard).

use crate::config::WorldSettings;
use crate::lattice::Lattice;
use crate::path::Path;
use crate::pathfind::{Pathfinder, SearchMode};
use crate::scheduler::Scheduler;
use crate::tile::Tile;
use crate::{AgentId, CellId, FxIndexSet, TileId};

/// The mutable world state scheduled callbacks run against: the spatial
/// lattice plus the pathfinder that searches it.
pub struct World {
    settings: WorldSettings,
    pub lattice: Lattice,
    pub pathfinder: Pathfinder,
}

impl World {
    pub fn new(settings: WorldSettings) -> Self {
        World {
            settings,
            lattice: Lattice::new(&settings),
            pathfinder: Pathfinder::new(),
        }
    }

    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Searches a route over this world's lattice. See
    /// [`Pathfinder::search`].
    pub fn search<F>(&mut self, from: TileId, to: TileId, mode: SearchMode, occupied: F) -> Path
    where
        F: Fn(&Tile) -> bool,
    {
        self.pathfinder.search(&self.lattice, from, to, mode, occupied)
    }

    /// The cells eligible for per-tick agent work, given the currently
    /// connected observers. See [`Lattice::active_cells`].
    pub fn active_cells<I>(&self, observers: I) -> FxIndexSet<CellId>
    where
        I: IntoIterator<Item = AgentId>,
    {
        self.lattice.active_cells(observers)
    }
}

/// A full simulation instance: the world plus the frame scheduler driving it.
///
/// The top-level loop calls [`Simulation::tick`] once per fixed interval;
/// each tick drains every due event against the world. All "waiting" inside
/// the simulation is expressed by scheduling a future callback, never by
/// blocking.
pub struct Simulation {
    scheduler: Scheduler<World>,
    world: World,
}

impl Simulation {
    /// Wires up a scheduler and an empty world from one configuration.
    pub fn new(settings: WorldSettings) -> Self {
        Simulation {
            scheduler: Scheduler::new(settings.tick_ms),
            world: World::new(settings),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn scheduler(&self) -> &Scheduler<World> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler<World> {
        &mut self.scheduler
    }

    /// Advances the simulation by one frame, firing every due event.
    pub fn tick(&mut self) {
        self.scheduler.tick(&mut self.world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::AgentKind;
    use crate::config::WorldSettingsBuilder;
    use crate::position::Position;

    fn simulation() -> Simulation {
        let settings = WorldSettingsBuilder::new(32, 32, 8).tick_ms(50).build();
        let mut simulation = Simulation::new(settings);

        let world = simulation.world_mut();
        for y in 0..32 {
            for x in 0..32 {
                world.lattice.add_tile(Position::new(x, y, 0), false, 1);
            }
        }
        world.lattice.build();

        simulation
    }

    #[test]
    fn scheduled_events_mutate_the_world() {
        let mut simulation = simulation();

        simulation.scheduler_mut().schedule(2, |world, _| {
            world
                .lattice
                .insert_agent(AgentId(7), AgentKind::Monster, Position::new(4, 4, 0));
        });

        simulation.tick();
        assert!(simulation.world().lattice.agent_cell(AgentId(7)).is_none());

        simulation.tick();
        assert!(simulation.world().lattice.agent_cell(AgentId(7)).is_some());
    }

    #[test]
    fn events_can_search_and_chain() {
        let mut simulation = simulation();

        let from = simulation
            .world()
            .lattice
            .tile_id_at(Position::new(0, 0, 0))
            .unwrap();
        let to = simulation
            .world()
            .lattice
            .tile_id_at(Position::new(5, 0, 0))
            .unwrap();

        simulation.scheduler_mut().schedule(1, move |world, scheduler| {
            let path = world.search(from, to, SearchMode::Exact, |tile| tile.is_solid());
            assert_eq!(path.len(), 5);

            // Follow up next frame, the way movement events chain.
            scheduler.schedule(1, move |world, _| {
                let path = world.search(to, from, SearchMode::Exact, |tile| tile.is_solid());
                assert_eq!(path.len(), 5);
            });
        });

        simulation.tick();
        simulation.tick();
        assert_eq!(simulation.scheduler().pending(), 0);
    }

    #[test]
    fn independent_simulations_share_nothing() {
        let mut a = simulation();
        let b = simulation();

        for _ in 0..10 {
            a.tick();
        }

        assert_eq!(a.scheduler().frame(), 10);
        assert_eq!(b.scheduler().frame(), 0);
    }
}
