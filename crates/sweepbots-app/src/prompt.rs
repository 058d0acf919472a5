//! Interactive parameter entry for the command-line runner.
//!
//! Prompts are written to an arbitrary sink and answers parsed from an
//! arbitrary reader, so tests can drive the dialogue with in-memory buffers.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use sweepbots_core::SweepConfig;

/// Prompt with `label` until the reader yields a line that parses as `T`.
///
/// Re-prompts on parse failures. An exhausted reader is an error, not a
/// retry, so a closed stdin cannot spin forever.
pub fn read_value<T: FromStr>(
    input: &mut impl BufRead,
    output: &mut impl Write,
    label: &str,
) -> io::Result<T> {
    loop {
        write!(output, "{label}: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input stream closed before a value was provided",
            ));
        }
        let trimmed = line.trim();
        match trimmed.parse() {
            Ok(value) => return Ok(value),
            Err(_) => writeln!(output, "could not read {trimmed:?} as a {label}, try again")?,
        }
    }
}

/// Assemble a [`SweepConfig`] by prompting for each tunable in turn.
///
/// The seed and history capacity stay at their defaults; the caller decides
/// whether to override them afterwards.
pub fn read_config(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<SweepConfig> {
    let width = read_value(input, output, "grid width")?;
    let height = read_value(input, output, "grid height")?;
    let sweeper_count = read_value(input, output, "number of sweepers")?;
    let dirty_percentage = read_value(input, output, "dirty percentage (0-100)")?;
    let step_budget = read_value(input, output, "step budget")?;
    Ok(SweepConfig {
        width,
        height,
        sweeper_count,
        dirty_percentage,
        step_budget,
        ..SweepConfig::default()
    })
}
