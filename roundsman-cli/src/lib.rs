//! Command-line interface for the Roundsman routing engine.
//!
//! `roundsman solve <request.json>` loads a JSON [`SolveRequest`], fetches
//! the travel matrix from OSRM, runs the selected backend and writes the
//! [`Solution`] as JSON or as a per-vehicle summary. Options layer from
//! command-line flags, `ROUNDSMAN_CMDS_SOLVE_*` environment variables and
//! configuration files via `ortho_config`.
//!
//! [`SolveRequest`]: roundsman_core::SolveRequest
//! [`Solution`]: roundsman_core::Solution
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fs;
mod solve;

pub use error::CliError;
use solve::{SolveArgs, run_solve};

const ARG_SOLVE_REQUEST: &str = "request-path";
const ARG_SOLVE_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_SOLVE_OSRM_PROFILE: &str = "osrm-profile";
const ARG_SOLVE_TIME_LIMIT: &str = "time-limit-secs";
const ARG_SOLVE_BACKEND: &str = "backend";
const ARG_SOLVE_OUTPUT: &str = "output";
const ARG_SOLVE_SUMMARY: &str = "summary";
const ENV_SOLVE_REQUEST: &str = "ROUNDSMAN_CMDS_SOLVE_REQUEST_PATH";

/// Run the Roundsman CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration, request
/// loading, solving or output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => run_solve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "roundsman",
    about = "Vehicle routing with time windows over OSRM travel matrices",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Route a fleet from one depot to time-windowed customers.
    Solve(SolveArgs),
}

#[cfg(test)]
mod tests;
