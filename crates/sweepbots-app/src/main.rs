//! Command-line entry point for the sweep simulation.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use sweepbots_app::{prompt, run_until_finished};
use sweepbots_core::{SweepConfig, World};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "sweepbots",
    about = "Discrete-tick sweep simulation on a bounded grid",
    version
)]
struct Cli {
    /// Grid width in cells.
    #[arg(long, default_value_t = 20)]
    width: u32,
    /// Grid height in cells.
    #[arg(long, default_value_t = 20)]
    height: u32,
    /// Number of sweepers, all starting at the origin.
    #[arg(long, default_value_t = 4)]
    sweepers: u32,
    /// Share of cells seeded dirty, in percent.
    #[arg(long, default_value_t = 30.0)]
    dirty: f64,
    /// Maximum number of ticks before the run is cut off.
    #[arg(long, default_value_t = 200)]
    steps: u64,
    /// RNG seed; omit for a fresh seed from entropy.
    #[arg(long)]
    seed: Option<u64>,
    /// Prompt for the grid parameters instead of taking them from flags.
    #[arg(long)]
    interactive: bool,
    /// Emit the final report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

/// Logs go to stderr so a `--json` report stays alone on stdout.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn build_config(cli: &Cli) -> Result<SweepConfig> {
    let mut config = if cli.interactive {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr();
        prompt::read_config(&mut input, &mut output)
            .context("interactive parameter entry failed")?
    } else {
        SweepConfig {
            width: cli.width,
            height: cli.height,
            sweeper_count: cli.sweepers,
            dirty_percentage: cli.dirty,
            step_budget: cli.steps,
            ..SweepConfig::default()
        }
    };
    config.rng_seed = cli.seed;
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let mut world = World::new(config).context("failed to build the sweep world")?;
    info!(
        seed = world.seed(),
        width = world.config().width,
        height = world.config().height,
        sweepers = world.sweeper_count(),
        initial_dirty = world.initial_dirty(),
        step_budget = world.config().step_budget,
        "world seeded"
    );

    let report = run_until_finished(&mut world, |world, events| {
        for cleaning in &events.cleanings {
            debug!(
                tick = %events.tick,
                sweeper = cleaning.sweeper,
                cell = %cleaning.cell,
                "cell cleaned"
            );
        }
        debug!(
            tick = %events.tick,
            cleaned = events.cleanings.len(),
            moved = events.moved,
            blocked = events.blocked,
            dirty_remaining = world.dirty_remaining(),
            "tick complete"
        );
    })?;
    info!(
        ticks = report.ticks,
        dirty_remaining = report.dirty_remaining,
        total_moves = report.total_moves,
        "run finished"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
