//! Core simulation engine for the SweepBots workspace.
//!
//! A bounded, non-toroidal grid is seeded with dirty cells and explored by a
//! population of sweeper agents. Every tick each sweeper acts exactly once in
//! a freshly shuffled activation order: it cleans the cell it stands on, or
//! hops to a uniformly chosen in-bounds Moore neighbor. The run terminates
//! when the grid is clean or the step budget is exhausted.

use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use thiserror::Error;

new_key_type! {
    /// Stable handle for sweepers backed by a generational slot map.
    pub struct AgentId;
}

const ORIGIN: Cell = Cell::new(0, 0);

/// High level simulation clock (ticks processed since construction).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the zero tick.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Grid coordinate; `x` runs along the width, `y` along the height.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    /// Construct a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Errors surfaced by world construction and stepping.
#[derive(Debug, Error, PartialEq)]
pub enum WorldError {
    /// A grid extent was zero at construction.
    #[error("grid dimensions {width}x{height} must both be at least 1")]
    InvalidDimensions { width: u32, height: u32 },
    /// The dirt percentage fell outside the inclusive `[0, 100]` range.
    #[error("dirty percentage {value} is outside the 0-100 range")]
    InvalidPercentage { value: f64 },
    /// A placement or move targeted a coordinate outside the grid.
    #[error("position {cell} is outside the {width}x{height} grid")]
    InvalidPosition { cell: Cell, width: u32, height: u32 },
    /// `step` was invoked after the run already terminated.
    #[error("simulation already finished at tick {tick}")]
    AlreadyFinished { tick: Tick },
}

/// Static configuration for a sweep run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepConfig {
    /// Grid width in cells; `x` coordinates range over `0..width`.
    pub width: u32,
    /// Grid height in cells; `y` coordinates range over `0..height`.
    pub height: u32,
    /// Number of sweepers created at the shared origin cell.
    pub sweeper_count: u32,
    /// Share of cells seeded dirty, in percent within `[0, 100]`.
    pub dirty_percentage: f64,
    /// Maximum number of ticks before forced termination.
    pub step_budget: u64,
    /// Optional RNG seed for reproducible runs.
    pub rng_seed: Option<u64>,
    /// Number of recent tick summaries retained in memory; 0 disables retention.
    pub history_capacity: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            sweeper_count: 4,
            dirty_percentage: 30.0,
            step_budget: 200,
            rng_seed: None,
            history_capacity: 256,
        }
    }
}

impl SweepConfig {
    /// Validates grid extents and the dirt percentage.
    fn validate(&self) -> Result<(), WorldError> {
        if self.width == 0 || self.height == 0 {
            return Err(WorldError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(0.0..=100.0).contains(&self.dirty_percentage) {
            return Err(WorldError::InvalidPercentage {
                value: self.dirty_percentage,
            });
        }
        Ok(())
    }

    /// Returns the configured seed, drawing one from entropy if absent.
    fn resolve_seed(&self) -> u64 {
        self.rng_seed.unwrap_or_else(rand::random)
    }

    /// Total number of cells on the configured grid.
    #[must_use]
    pub const fn total_cells(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Bounded spatial index mapping each cell to the sweepers occupying it.
///
/// The grid is non-toroidal: coordinates never wrap, and neighbor queries
/// drop out-of-bounds candidates instead of clamping them. Multiple sweepers
/// sharing a cell is an allowed, non-error state.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    cells: Vec<Vec<AgentId>>,
}

impl OccupancyGrid {
    /// Construct an empty grid with `width * height` cells.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Vec::new(); (width as usize) * (height as usize)],
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether the coordinate lies within bounds.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Returns the flat index for a cell without bounds checks.
    #[inline]
    fn offset(&self, cell: Cell) -> usize {
        (cell.y as usize) * (self.width as usize) + (cell.x as usize)
    }

    fn out_of_bounds(&self, cell: Cell) -> WorldError {
        WorldError::InvalidPosition {
            cell,
            width: self.width,
            height: self.height,
        }
    }

    /// Handles of the sweepers currently on `cell`, or `None` out of bounds.
    #[must_use]
    pub fn occupants(&self, cell: Cell) -> Option<&[AgentId]> {
        if self.contains(cell) {
            Some(&self.cells[self.offset(cell)])
        } else {
            None
        }
    }

    /// Records `id` as occupying `cell`.
    pub fn place(&mut self, id: AgentId, cell: Cell) -> Result<(), WorldError> {
        if !self.contains(cell) {
            return Err(self.out_of_bounds(cell));
        }
        let idx = self.offset(cell);
        self.cells[idx].push(id);
        Ok(())
    }

    /// Relocates the occupancy record of `id` from `from` to `to`.
    ///
    /// Occupancy is the only state touched; the dirt field is never affected
    /// by movement.
    pub fn relocate(&mut self, id: AgentId, from: Cell, to: Cell) -> Result<(), WorldError> {
        if !self.contains(to) {
            return Err(self.out_of_bounds(to));
        }
        if self.contains(from) {
            let idx = self.offset(from);
            self.cells[idx].retain(|occupant| *occupant != id);
        }
        let idx = self.offset(to);
        self.cells[idx].push(id);
        Ok(())
    }

    /// In-bounds cells within Chebyshev distance `radius` of `cell`, center
    /// excluded, in row-major order.
    #[must_use]
    pub fn neighbors_within(&self, cell: Cell, radius: u32) -> Vec<Cell> {
        let r = i64::from(radius);
        let side = 2 * radius as usize + 1;
        let mut cells = Vec::with_capacity(side * side - 1);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let x = i64::from(cell.x) + dx;
                let y = i64::from(cell.y) + dy;
                if x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height) {
                    cells.push(Cell::new(x as u32, y as u32));
                }
            }
        }
        cells
    }

    /// The up-to-8 in-bounds Moore neighbors of `cell`.
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        self.neighbors_within(cell, 1)
    }
}

/// Registry of the cells still requiring a clean.
///
/// Seeded once at construction; afterwards it only ever shrinks. Members are
/// always within grid bounds because sampling draws from the grid extents.
#[derive(Debug, Clone)]
pub struct DirtField {
    cells: HashSet<Cell>,
    initial_count: usize,
}

impl DirtField {
    /// Seed the field by drawing distinct uniform cells until the target
    /// count `floor(width * height * percentage / 100)` is reached.
    ///
    /// Draws are rejection-sampled: a coordinate already present is redrawn,
    /// so the seeded cells are distinct and uniform without replacement.
    pub fn seed(
        width: u32,
        height: u32,
        percentage: f64,
        rng: &mut SmallRng,
    ) -> Result<Self, WorldError> {
        if !(0.0..=100.0).contains(&percentage) {
            return Err(WorldError::InvalidPercentage { value: percentage });
        }
        let total = u64::from(width) * u64::from(height);
        let target = (total as f64 * percentage / 100.0) as usize;
        let mut cells = HashSet::with_capacity(target);
        while cells.len() < target {
            let cell = Cell::new(rng.random_range(0..width), rng.random_range(0..height));
            cells.insert(cell);
        }
        Ok(Self {
            initial_count: cells.len(),
            cells,
        })
    }

    /// O(1) membership test.
    #[must_use]
    pub fn is_dirty(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Removes `cell`, returning whether it was present.
    ///
    /// Callers are expected to check [`is_dirty`](Self::is_dirty) first; a
    /// `false` return indicates a broken decision rule upstream, not a valid
    /// no-op.
    pub fn clean(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    /// True when no dirty cells remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of dirty cells remaining.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells seeded dirty at construction.
    #[must_use]
    pub const fn initial_count(&self) -> usize {
        self.initial_count
    }

    /// Iterates the remaining dirty cells in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }
}

/// Outcome of a single sweeper turn within a tick.
///
/// Cleaning and moving are mutually exclusive by construction; a blocked
/// turn is the could-not-move case, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The sweeper removed the dirt on its current cell and stayed put.
    Cleaned { cell: Cell },
    /// The sweeper hopped to a uniformly chosen in-bounds neighbor.
    Moved { from: Cell, to: Cell },
    /// No in-bounds neighbor existed (1x1 grid); the sweeper held its cell.
    Blocked,
}

/// A mobile cleaning agent.
#[derive(Debug, Clone)]
pub struct Sweeper {
    id: AgentId,
    ordinal: u32,
    cell: Cell,
    moves: u32,
}

impl Sweeper {
    fn new(id: AgentId, ordinal: u32, cell: Cell) -> Self {
        Self {
            id,
            ordinal,
            cell,
            moves: 0,
        }
    }

    /// Slot map handle of this sweeper.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Sequential identity, unique within the run and assigned in creation order.
    #[must_use]
    pub const fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Current position; kept consistent with the grid's occupancy lists.
    #[must_use]
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Moves taken in the current tick; always 0 or 1, reset at turn end.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    /// Clean-or-walk rule, executed exactly once per tick.
    ///
    /// Cleaning the current cell is the whole turn; otherwise the sweeper
    /// hops to a uniformly chosen in-bounds Moore neighbor. With no in-bounds
    /// neighbor the turn is a reported no-op.
    fn take_turn(
        &mut self,
        grid: &mut OccupancyGrid,
        dirt: &mut DirtField,
        rng: &mut SmallRng,
    ) -> Result<TurnOutcome, WorldError> {
        if dirt.is_dirty(self.cell) {
            let removed = dirt.clean(self.cell);
            debug_assert!(removed, "membership was checked above");
            return Ok(TurnOutcome::Cleaned { cell: self.cell });
        }
        let neighbors = grid.neighbors(self.cell);
        match neighbors.choose(rng) {
            Some(&target) => {
                grid.relocate(self.id, self.cell, target)?;
                let from = self.cell;
                self.cell = target;
                self.moves += 1;
                Ok(TurnOutcome::Moved { from, to: target })
            }
            None => Ok(TurnOutcome::Blocked),
        }
    }
}

/// Record of one cell cleaned during a tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanEvent {
    /// Ordinal of the sweeper that cleaned the cell.
    pub sweeper: u32,
    /// The cell that was cleaned.
    pub cell: Cell,
}

/// Events emitted by one call to [`World::step`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TickEvents {
    pub tick: Tick,
    /// Cells cleaned this tick, in activation order.
    pub cleanings: Vec<CleanEvent>,
    pub moved: u32,
    pub blocked: u32,
    pub finished: bool,
}

/// Aggregate bookkeeping retained per tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: Tick,
    pub cleaned: u32,
    pub moved: u32,
    pub blocked: u32,
    pub dirty_remaining: usize,
    pub total_moves: u64,
}

/// Scheduler owning the grid, the dirt field, and the sweeper population.
///
/// Drives the tick loop: shuffle a fresh activation order, run every
/// sweeper's turn, fold the per-turn move counters into the run total, then
/// evaluate termination. All mutation is synchronous within `step`; the only
/// non-determinism is the seedable generator owned by the world.
pub struct World {
    config: SweepConfig,
    seed: u64,
    tick: Tick,
    running: bool,
    rng: SmallRng,
    grid: OccupancyGrid,
    dirt: DirtField,
    sweepers: SlotMap<AgentId, Sweeper>,
    roster: Vec<AgentId>,
    total_moves: u64,
    history: VecDeque<TickSummary>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("tick", &self.tick)
            .field("running", &self.running)
            .field("sweeper_count", &self.sweepers.len())
            .field("dirty_remaining", &self.dirt.len())
            .finish()
    }
}

impl World {
    /// Build a world from `config`: validate it, seed the dirt field, and
    /// place every sweeper at the shared origin cell.
    ///
    /// Zero sweepers and zero dirt are valid configurations; such runs end
    /// via the step budget or the empty registry respectively.
    pub fn new(config: SweepConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let seed = config.resolve_seed();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut grid = OccupancyGrid::new(config.width, config.height)?;
        let dirt = DirtField::seed(config.width, config.height, config.dirty_percentage, &mut rng)?;

        let mut sweepers = SlotMap::with_key();
        let mut roster = Vec::with_capacity(config.sweeper_count as usize);
        for ordinal in 0..config.sweeper_count {
            let id = sweepers.insert_with_key(|id| Sweeper::new(id, ordinal, ORIGIN));
            grid.place(id, ORIGIN)?;
            roster.push(id);
        }

        let history = VecDeque::with_capacity(config.history_capacity);
        Ok(Self {
            seed,
            tick: Tick::zero(),
            running: true,
            rng,
            grid,
            dirt,
            sweepers,
            roster,
            total_moves: 0,
            history,
            config,
        })
    }

    /// Advance the simulation by exactly one tick.
    ///
    /// Every sweeper acts once, in a uniformly random activation order drawn
    /// for this tick only. Returns [`WorldError::AlreadyFinished`] once a
    /// termination condition has fired; callers are expected to check
    /// [`is_running`](Self::is_running) between ticks.
    pub fn step(&mut self) -> Result<TickEvents, WorldError> {
        if !self.running {
            return Err(WorldError::AlreadyFinished { tick: self.tick });
        }

        // Ephemeral permutation; the roster itself keeps creation order.
        let mut order = self.roster.clone();
        order.shuffle(&mut self.rng);

        let mut cleanings = Vec::new();
        let mut moved = 0u32;
        let mut blocked = 0u32;
        for id in order {
            let Some(sweeper) = self.sweepers.get_mut(id) else {
                continue;
            };
            match sweeper.take_turn(&mut self.grid, &mut self.dirt, &mut self.rng)? {
                TurnOutcome::Cleaned { cell } => cleanings.push(CleanEvent {
                    sweeper: sweeper.ordinal,
                    cell,
                }),
                TurnOutcome::Moved { .. } => moved += 1,
                TurnOutcome::Blocked => blocked += 1,
            }
            self.total_moves += u64::from(sweeper.moves);
            sweeper.moves = 0;
        }

        self.tick = self.tick.next();
        if self.dirt.is_empty() || self.tick.0 >= self.config.step_budget {
            self.running = false;
        }

        self.record(TickSummary {
            tick: self.tick,
            cleaned: cleanings.len() as u32,
            moved,
            blocked,
            dirty_remaining: self.dirt.len(),
            total_moves: self.total_moves,
        });

        Ok(TickEvents {
            tick: self.tick,
            cleanings,
            moved,
            blocked,
            finished: !self.running,
        })
    }

    /// Retain `summary`, evicting the oldest entry once capacity is reached.
    fn record(&mut self, summary: TickSummary) {
        let capacity = self.config.history_capacity;
        if capacity == 0 {
            return;
        }
        if self.history.len() >= capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }

    /// Immutable access to the run configuration.
    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Seed the generator was initialised with (resolved from entropy when
    /// the config carried none), reported so any run can be replayed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks processed so far.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// False once a termination condition has fired.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Cumulative moves across all sweepers and all ticks.
    #[must_use]
    pub const fn total_moves(&self) -> u64 {
        self.total_moves
    }

    /// Number of dirty cells remaining.
    #[must_use]
    pub fn dirty_remaining(&self) -> usize {
        self.dirt.len()
    }

    /// Number of cells seeded dirty at construction.
    #[must_use]
    pub fn initial_dirty(&self) -> usize {
        self.dirt.initial_count()
    }

    /// Total number of grid cells.
    #[must_use]
    pub const fn total_cells(&self) -> u64 {
        self.config.total_cells()
    }

    /// Iterates the remaining dirty cells in arbitrary order.
    pub fn dirty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.dirt.iter()
    }

    /// Read-only access to the occupancy grid.
    #[must_use]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Read-only access to the dirt field.
    #[must_use]
    pub fn dirt(&self) -> &DirtField {
        &self.dirt
    }

    /// Number of sweepers in the run.
    #[must_use]
    pub fn sweeper_count(&self) -> usize {
        self.sweepers.len()
    }

    /// Iterates sweepers in creation (ordinal) order.
    pub fn sweepers(&self) -> impl Iterator<Item = &Sweeper> {
        self.roster.iter().filter_map(|id| self.sweepers.get(*id))
    }

    /// Borrow a sweeper by handle.
    #[must_use]
    pub fn sweeper(&self, id: AgentId) -> Option<&Sweeper> {
        self.sweepers.get(id)
    }

    /// Iterate over retained tick summaries, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TickSummary> {
        self.history.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(config: SweepConfig) -> World {
        World::new(config).expect("world")
    }

    fn config(width: u32, height: u32, sweepers: u32, dirty: f64, budget: u64) -> SweepConfig {
        SweepConfig {
            width,
            height,
            sweeper_count: sweepers,
            dirty_percentage: dirty,
            step_budget: budget,
            rng_seed: Some(0x5EED),
            ..SweepConfig::default()
        }
    }

    #[test]
    fn neighbors_cover_the_full_moore_ring_in_the_interior() {
        let grid = OccupancyGrid::new(5, 5).expect("grid");
        let cells = grid.neighbors(Cell::new(2, 2));
        let expected = vec![
            Cell::new(1, 1),
            Cell::new(2, 1),
            Cell::new(3, 1),
            Cell::new(1, 2),
            Cell::new(3, 2),
            Cell::new(1, 3),
            Cell::new(2, 3),
            Cell::new(3, 3),
        ];
        assert_eq!(cells, expected);
    }

    #[test]
    fn neighbors_clip_at_corners_and_edges() {
        let grid = OccupancyGrid::new(4, 3).expect("grid");
        assert_eq!(grid.neighbors(Cell::new(0, 0)).len(), 3);
        assert_eq!(grid.neighbors(Cell::new(3, 2)).len(), 3);
        assert_eq!(grid.neighbors(Cell::new(1, 0)).len(), 5);
        assert_eq!(grid.neighbors(Cell::new(0, 1)).len(), 5);
        assert!(
            grid.neighbors(Cell::new(0, 0))
                .iter()
                .all(|cell| grid.contains(*cell))
        );
    }

    #[test]
    fn single_cell_grid_has_no_neighbors() {
        let grid = OccupancyGrid::new(1, 1).expect("grid");
        assert!(grid.neighbors(Cell::new(0, 0)).is_empty());
    }

    #[test]
    fn neighbor_radius_extends_the_chebyshev_ball() {
        let grid = OccupancyGrid::new(5, 5).expect("grid");
        assert_eq!(grid.neighbors_within(Cell::new(2, 2), 2).len(), 24);
        assert_eq!(grid.neighbors_within(Cell::new(0, 0), 2).len(), 8);
    }

    #[test]
    fn grid_rejects_zero_dimensions() {
        let err = OccupancyGrid::new(0, 4).expect_err("zero width");
        assert_eq!(err, WorldError::InvalidDimensions { width: 0, height: 4 });
        assert!(OccupancyGrid::new(3, 0).is_err());
    }

    #[test]
    fn place_and_relocate_track_shared_occupancy() {
        let mut world = seeded(config(3, 3, 2, 0.0, 10));
        let origin = Cell::new(0, 0);
        let occupants = world.grid().occupants(origin).expect("in bounds");
        assert_eq!(occupants.len(), 2, "both sweepers start on the origin");

        let ids: Vec<AgentId> = world.sweepers().map(Sweeper::id).collect();
        world
            .grid
            .relocate(ids[0], origin, Cell::new(1, 1))
            .expect("relocate");
        assert_eq!(world.grid().occupants(origin).expect("in bounds").len(), 1);
        assert_eq!(
            world.grid().occupants(Cell::new(1, 1)).expect("in bounds"),
            &[ids[0]]
        );
    }

    #[test]
    fn relocate_rejects_out_of_bounds_targets() {
        let mut grid = OccupancyGrid::new(2, 2).expect("grid");
        let mut sweepers: SlotMap<AgentId, ()> = SlotMap::with_key();
        let id = sweepers.insert(());
        grid.place(id, Cell::new(0, 0)).expect("place");
        let err = grid
            .relocate(id, Cell::new(0, 0), Cell::new(2, 0))
            .expect_err("out of bounds");
        assert_eq!(
            err,
            WorldError::InvalidPosition {
                cell: Cell::new(2, 0),
                width: 2,
                height: 2,
            }
        );
        assert!(grid.occupants(Cell::new(5, 5)).is_none());
    }

    #[test]
    fn seeding_hits_the_floored_percentage_target() {
        let mut rng = SmallRng::seed_from_u64(7);
        let dirt = DirtField::seed(5, 5, 50.0, &mut rng).expect("dirt");
        assert_eq!(dirt.len(), 12, "floor(25 * 0.5) = 12");
        assert_eq!(dirt.initial_count(), 12);

        let mut rng = SmallRng::seed_from_u64(7);
        let dirt = DirtField::seed(3, 3, 50.0, &mut rng).expect("dirt");
        assert_eq!(dirt.len(), 4, "floor(9 * 0.5) = 4");
    }

    #[test]
    fn seeding_extremes_cover_empty_and_full_grids() {
        let mut rng = SmallRng::seed_from_u64(11);
        let empty = DirtField::seed(6, 4, 0.0, &mut rng).expect("empty");
        assert!(empty.is_empty());

        let full = DirtField::seed(4, 4, 100.0, &mut rng).expect("full");
        assert_eq!(full.len(), 16, "rejection sampling reaches a full grid");
        let cells: HashSet<Cell> = full.iter().collect();
        assert_eq!(cells.len(), 16);
        assert!(cells.iter().all(|cell| cell.x < 4 && cell.y < 4));
    }

    #[test]
    fn seeding_rejects_out_of_range_percentages() {
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(DirtField::seed(4, 4, -0.1, &mut rng).is_err());
        assert!(DirtField::seed(4, 4, 100.1, &mut rng).is_err());
        assert!(matches!(
            DirtField::seed(4, 4, f64::NAN, &mut rng),
            Err(WorldError::InvalidPercentage { .. })
        ));
    }

    #[test]
    fn clean_reports_prior_membership() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut dirt = DirtField::seed(1, 1, 100.0, &mut rng).expect("dirt");
        let cell = Cell::new(0, 0);
        assert!(dirt.is_dirty(cell));
        assert!(dirt.clean(cell));
        assert!(!dirt.clean(cell), "second clean finds nothing to remove");
        assert!(dirt.is_empty());
        assert_eq!(dirt.initial_count(), 1, "initial count survives cleaning");
    }

    #[test]
    fn construction_rejects_invalid_configs() {
        let err = World::new(config(0, 5, 1, 10.0, 5)).expect_err("zero width");
        assert_eq!(err, WorldError::InvalidDimensions { width: 0, height: 5 });

        let err = World::new(config(5, 5, 1, 120.0, 5)).expect_err("percentage");
        assert_eq!(err, WorldError::InvalidPercentage { value: 120.0 });
    }

    #[test]
    fn construction_places_all_sweepers_at_the_origin() {
        let world = seeded(config(4, 4, 3, 25.0, 10));
        assert_eq!(world.tick(), Tick::zero());
        assert!(world.is_running());
        assert_eq!(world.total_moves(), 0);
        assert_eq!(world.sweeper_count(), 3);

        let ordinals: Vec<u32> = world.sweepers().map(Sweeper::ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        assert!(world.sweepers().all(|s| s.cell() == Cell::new(0, 0)));
        assert_eq!(
            world
                .grid()
                .occupants(Cell::new(0, 0))
                .expect("in bounds")
                .len(),
            3
        );
    }

    #[test]
    fn zero_sweeper_worlds_are_valid() {
        let mut world = seeded(config(3, 3, 0, 50.0, 2));
        let events = world.step().expect("tick");
        assert!(events.cleanings.is_empty());
        assert_eq!(events.moved, 0);
        assert_eq!(world.dirty_remaining(), 4);
        assert_eq!(world.total_moves(), 0);
    }

    #[test]
    fn cleaning_takes_the_whole_turn() {
        let mut world = seeded(config(2, 2, 1, 100.0, 10));
        assert_eq!(world.initial_dirty(), 4);

        let events = world.step().expect("tick");
        assert_eq!(events.cleanings.len(), 1);
        assert_eq!(events.cleanings[0].cell, Cell::new(0, 0));
        assert_eq!(events.moved, 0, "a cleaning turn never also moves");
        assert_eq!(world.total_moves(), 0);
        assert_eq!(world.dirty_remaining(), 3);
    }

    #[test]
    fn turns_are_blocked_on_a_single_cell_grid() {
        let mut world = seeded(config(1, 1, 1, 0.0, 3));
        let events = world.step().expect("tick");
        assert_eq!(events.blocked, 1);
        assert_eq!(events.moved, 0);
        assert_eq!(world.total_moves(), 0);
    }

    #[test]
    fn move_counters_reset_after_every_tick() {
        let mut world = seeded(config(5, 5, 2, 0.0, 10));
        world.step().expect("tick");
        assert!(world.sweepers().all(|s| s.moves() == 0));
        assert_eq!(world.total_moves(), 2, "both sweepers had room to move");
    }

    #[test]
    fn termination_fires_on_budget_exhaustion() {
        let mut world = seeded(config(3, 3, 1, 50.0, 2));
        let events = world.step().expect("tick 1");
        assert!(!events.finished || world.dirty_remaining() == 0);
        if world.is_running() {
            let events = world.step().expect("tick 2");
            assert!(events.finished);
        }
        assert!(!world.is_running());
        assert_eq!(world.tick(), Tick(2));
    }

    #[test]
    fn zero_step_budget_finishes_after_the_first_tick() {
        let mut world = seeded(config(3, 3, 1, 50.0, 0));
        let events = world.step().expect("first tick is allowed");
        assert!(events.finished);
        assert_eq!(world.tick(), Tick(1));
        assert!(!world.is_running());
    }

    #[test]
    fn stepping_a_finished_world_errors() {
        let mut world = seeded(config(2, 2, 1, 0.0, 1));
        world.step().expect("only tick");
        assert!(!world.is_running());
        let err = world.step().expect_err("already finished");
        assert_eq!(err, WorldError::AlreadyFinished { tick: Tick(1) });
    }

    #[test]
    fn history_is_bounded_and_evicts_the_oldest() {
        let mut config = config(4, 4, 1, 0.0, 5);
        config.dirty_percentage = 100.0;
        config.history_capacity = 2;
        let mut world = seeded(config);
        for _ in 0..4 {
            if world.is_running() {
                world.step().expect("tick");
            }
        }
        let summaries: Vec<TickSummary> = world.history().copied().collect();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].tick, world.tick());
        assert_eq!(summaries[0].tick.next(), summaries[1].tick);
    }

    #[test]
    fn zero_history_capacity_disables_retention() {
        let mut config = config(3, 3, 1, 40.0, 3);
        config.history_capacity = 0;
        let mut world = seeded(config);
        world.step().expect("tick");
        assert_eq!(world.history().count(), 0);
    }

    #[test]
    fn configured_seed_is_reported_verbatim() {
        let world = seeded(config(3, 3, 1, 0.0, 1));
        assert_eq!(world.seed(), 0x5EED);
    }
}
