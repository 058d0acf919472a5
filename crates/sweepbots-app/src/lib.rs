//! Runner utilities shared by the `sweepbots` binary and its tests.

pub mod prompt;
pub mod report;

pub use report::{RunReport, run_simulation, run_until_finished};
