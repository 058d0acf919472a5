//! Headless run driver and end-of-run reporting.

use std::fmt;

use serde::Serialize;
use sweepbots_core::{SweepConfig, TickEvents, World, WorldError};

/// Final figures for a completed run.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunReport {
    /// Ticks processed before a termination condition fired.
    pub ticks: u64,
    /// Seed the run's generator was initialised with.
    pub seed: u64,
    /// Number of sweepers in the run.
    pub sweepers: usize,
    /// Total number of grid cells.
    pub total_cells: u64,
    /// Cells seeded dirty at construction.
    pub initial_dirty: usize,
    /// Cells clean when the run ended.
    pub clean_cells: u64,
    /// Cells still dirty when the run ended.
    pub dirty_remaining: usize,
    /// Share of clean cells at the end, in percent.
    pub clean_percentage: f64,
    /// Cumulative moves across all sweepers and ticks.
    pub total_moves: u64,
}

impl RunReport {
    /// Snapshot the reportable figures of `world`.
    ///
    /// Valid at any point of a run, though the binary only takes one after
    /// termination.
    #[must_use]
    pub fn from_world(world: &World) -> Self {
        let total_cells = world.total_cells();
        let dirty_remaining = world.dirty_remaining();
        let clean_cells = total_cells - dirty_remaining as u64;
        // total_cells >= 1 is enforced at construction.
        let clean_percentage = clean_cells as f64 / total_cells as f64 * 100.0;
        Self {
            ticks: world.tick().0,
            seed: world.seed(),
            sweepers: world.sweeper_count(),
            total_cells,
            initial_dirty: world.initial_dirty(),
            clean_cells,
            dirty_remaining,
            clean_percentage,
            total_moves: world.total_moves(),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "finished after {} ticks (seed {})", self.ticks, self.seed)?;
        writeln!(
            f,
            "clean cells: {}/{} ({:.2}%)",
            self.clean_cells, self.total_cells, self.clean_percentage
        )?;
        writeln!(f, "dirty remaining: {}", self.dirty_remaining)?;
        write!(f, "total moves: {}", self.total_moves)
    }
}

/// Drive `world` to termination, invoking `on_tick` after every step.
///
/// The callback sees the world state and the tick's events, in order; the
/// binary uses it for per-tick logging.
pub fn run_until_finished<F>(world: &mut World, mut on_tick: F) -> Result<RunReport, WorldError>
where
    F: FnMut(&World, &TickEvents),
{
    while world.is_running() {
        let events = world.step()?;
        on_tick(world, &events);
    }
    Ok(RunReport::from_world(world))
}

/// Build a world from `config` and run it to termination.
pub fn run_simulation(config: SweepConfig) -> Result<RunReport, WorldError> {
    let mut world = World::new(config)?;
    run_until_finished(&mut world, |_, _| {})
}
