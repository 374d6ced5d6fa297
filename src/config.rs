//! Fixed world configuration, read once at construction.

/// Dimensions of a single spatial cell in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDims {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Default for CellDims {
    fn default() -> Self {
        CellDims {
            width: 8,
            height: 8,
            depth: 8,
        }
    }
}

/// World configuration consumed by the simulation core: world extents in
/// tiles, cell dimensions and the tick interval. Build one with
/// [`WorldSettingsBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct WorldSettings {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub cell: CellDims,
    pub tick_ms: u64,
}

/// Builder for [`WorldSettings`].
///
/// Example usage:
/// ```
/// use gridtick::prelude::*;
///
/// let settings = WorldSettingsBuilder::new(128, 128, 8)
///     .cell_size(8, 8, 8)
///     .tick_ms(50)
///     .build();
///
/// let simulation = Simulation::new(settings);
/// ```
#[derive(Debug, Clone)]
pub struct WorldSettingsBuilder {
    width: u32,
    height: u32,
    depth: u32,
    cell: CellDims,
    tick_ms: u64,
}

impl Default for WorldSettingsBuilder {
    fn default() -> Self {
        WorldSettingsBuilder {
            width: 64,
            height: 64,
            depth: 8,
            cell: CellDims::default(),
            tick_ms: 50,
        }
    }
}

impl WorldSettingsBuilder {
    /// Starts a builder for a world of the given extents in tiles.
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        if width == 0 || height == 0 || depth == 0 {
            panic!("World dimensions must be at least 1 tile on every axis");
        }

        WorldSettingsBuilder {
            width,
            height,
            depth,
            ..Default::default()
        }
    }

    /// Dimensions of each spatial cell. World extents must divide evenly into
    /// cells on every axis.
    pub fn cell_size(mut self, width: u32, height: u32, depth: u32) -> Self {
        if width == 0 || height == 0 || depth == 0 {
            panic!("Cell dimensions must be at least 1 tile on every axis");
        }

        self.cell = CellDims {
            width,
            height,
            depth,
        };
        self
    }

    /// The fixed server tick interval in milliseconds.
    pub fn tick_ms(mut self, tick_ms: u64) -> Self {
        if tick_ms == 0 {
            panic!("Tick interval must be at least 1ms");
        }

        self.tick_ms = tick_ms;
        self
    }

    /// Validates the configuration and produces the [`WorldSettings`].
    pub fn build(self) -> WorldSettings {
        if self.width % self.cell.width != 0
            || self.height % self.cell.height != 0
            || self.depth % self.cell.depth != 0
        {
            panic!("World dimensions must be divisible by the cell dimensions");
        }

        WorldSettings {
            width: self.width,
            height: self.height,
            depth: self.depth,
            cell: self.cell,
            tick_ms: self.tick_ms,
        }
    }
}
