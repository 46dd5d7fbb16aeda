//! Solve command implementation for the Roundsman CLI.

use std::io::{BufReader, Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use roundsman_core::{Solution, SolutionSummary, SolveRequest, Solver};
use roundsman_data::{DEFAULT_OSRM_BASE_URL, DEFAULT_OSRM_PROFILE, OsrmProvider, OsrmProviderConfig};
use serde::{Deserialize, Serialize};

use crate::fs::{create_utf8_file, file_is_file, open_utf8_file, path_is_dir};
use crate::{
    ARG_SOLVE_BACKEND, ARG_SOLVE_OSRM_BASE_URL, ARG_SOLVE_OSRM_PROFILE, ARG_SOLVE_OUTPUT,
    ARG_SOLVE_REQUEST, ARG_SOLVE_SUMMARY, ARG_SOLVE_TIME_LIMIT, CliError, ENV_SOLVE_REQUEST,
};

/// Routing backend used by `solve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Backend {
    /// Native model with guided local search.
    #[default]
    Routing,
    /// `vrp-core` evolutionary search.
    Vrp,
}

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a vehicle routing request with time windows. The \
                 request is a JSON-encoded SolveRequest holding the depot, \
                 the customers and the solver configuration; travel times \
                 come from an OSRM table service.",
    about = "Solve a routing request"
)]
#[ortho_config(prefix = "ROUNDSMAN")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing a SolveRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_SOLVE_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM routing profile (e.g. "driving").
    #[arg(long = ARG_SOLVE_OSRM_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) osrm_profile: Option<String>,
    /// Override the request's search time limit per trial.
    #[arg(long = ARG_SOLVE_TIME_LIMIT, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Routing backend.
    #[arg(long = ARG_SOLVE_BACKEND, value_enum)]
    #[serde(default)]
    pub(crate) backend: Option<Backend>,
    /// Write the JSON solution to this file instead of stdout.
    #[arg(long = ARG_SOLVE_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Print a per-vehicle summary instead of JSON on stdout.
    #[arg(long = ARG_SOLVE_SUMMARY)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) summary: bool,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Base URL for the OSRM table service.
    pub(crate) osrm_base_url: String,
    /// OSRM routing profile.
    pub(crate) osrm_profile: String,
    /// Time limit replacing the request's, when set.
    pub(crate) time_limit_secs: Option<u64>,
    /// Selected backend.
    pub(crate) backend: Backend,
    /// JSON output file; stdout when absent.
    pub(crate) output: Option<Utf8PathBuf>,
    /// Print the human-readable summary on stdout.
    pub(crate) summary: bool,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.request_path, ARG_SOLVE_REQUEST)?;
        if let Some(output) = &self.output {
            Self::require_writable(output)?;
        }
        Ok(())
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn require_writable(path: &Utf8Path) -> Result<(), CliError> {
        match path_is_dir(path) {
            Ok(false) => Ok(()),
            Ok(true) => Err(CliError::OutputPathIsDirectory {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                field: ARG_SOLVE_OUTPUT,
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_SOLVE_REQUEST,
            env: ENV_SOLVE_REQUEST,
        })?;

        Ok(Self {
            request_path,
            osrm_base_url: args
                .osrm_base_url
                .unwrap_or_else(|| DEFAULT_OSRM_BASE_URL.to_owned()),
            osrm_profile: args
                .osrm_profile
                .unwrap_or_else(|| DEFAULT_OSRM_PROFILE.to_owned()),
            time_limit_secs: args.time_limit_secs,
            backend: args.backend.unwrap_or_default(),
            output: args.output,
            summary: args.summary,
        })
    }
}

/// Builds a solver instance for the current solve invocation.
pub(crate) trait SolveSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError>;
}

/// OSRM-backed solver selected by [`SolveConfig::backend`].
pub(crate) struct DefaultSolveSolverBuilder;

impl SolveSolverBuilder for DefaultSolveSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        let provider_config = OsrmProviderConfig::new(config.osrm_base_url.clone())
            .with_profile(config.osrm_profile.clone());
        let provider = OsrmProvider::with_config(provider_config).map_err(|source| {
            CliError::BuildTravelMatrixProvider {
                base_url: config.osrm_base_url.clone(),
                source,
            }
        })?;
        match config.backend {
            Backend::Routing => routing_solver(provider),
            Backend::Vrp => vrp_solver(provider),
        }
    }
}

#[cfg(feature = "solver-routing")]
fn routing_solver(provider: OsrmProvider) -> Result<Box<dyn Solver>, CliError> {
    Ok(Box::new(roundsman_solver_routing::RoutingSolver::new(provider)))
}

#[cfg(not(feature = "solver-routing"))]
fn routing_solver(_provider: OsrmProvider) -> Result<Box<dyn Solver>, CliError> {
    Err(CliError::MissingFeature {
        feature: "solver-routing",
        action: "the routing backend",
    })
}

#[cfg(feature = "solver-vrp")]
fn vrp_solver(provider: OsrmProvider) -> Result<Box<dyn Solver>, CliError> {
    Ok(Box::new(roundsman_solver_vrp::VrpSolver::new(provider)))
}

#[cfg(not(feature = "solver-vrp"))]
fn vrp_solver(_provider: OsrmProvider) -> Result<Box<dyn Solver>, CliError> {
    Err(CliError::MissingFeature {
        feature: "solver-vrp",
        action: "the vrp backend",
    })
}

pub(crate) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &DefaultSolveSolverBuilder, &mut stdout)
}

pub(crate) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolveSolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_solve_config(args)?;
    let solution = execute_solve(&config, builder)?;

    if let Some(path) = &config.output {
        let mut file = create_utf8_file(path).map_err(|source| CliError::CreateOutputFile {
            path: path.clone(),
            source,
        })?;
        write_solution(&mut file, &solution)?;
        log::info!("wrote solution to {path}");
    }
    if config.summary {
        write!(writer, "{}", SolutionSummary::new(&solution)).map_err(CliError::WriteSolveOutput)
    } else if config.output.is_none() {
        write_solution(writer, &solution)
    } else {
        Ok(())
    }
}

fn execute_solve(
    config: &SolveConfig,
    builder: &dyn SolveSolverBuilder,
) -> Result<Solution, CliError> {
    let mut request = load_solve_request(&config.request_path)?;
    if let Some(limit) = config.time_limit_secs {
        request.config.time_limit_secs = limit;
    }
    request
        .config
        .validate()
        .map_err(|source| CliError::InvalidSolveRequest {
            path: config.request_path.clone(),
            source,
        })?;
    log::info!(
        "solving {} customers from {} with the {:?} backend",
        request.customers.len(),
        config.request_path,
        config.backend
    );
    let solver = builder.build(config)?;
    solver
        .solve(&request)
        .map_err(|source| CliError::Solve { source })
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`SolveRequest`] from disk.
pub(crate) fn load_solve_request(path: &Utf8Path) -> Result<SolveRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenSolveRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseSolveRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_solution(writer: &mut dyn Write, solution: &Solution) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(solution).map_err(CliError::SerializeSolution)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteSolveOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteSolveOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
