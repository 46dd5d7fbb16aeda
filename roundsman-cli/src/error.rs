//! Error types emitted by the Roundsman CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use roundsman_core::{ConfigError, SolveError};
use roundsman_data::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the Roundsman CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name.
        field: &'static str,
        /// Environment variable name.
        env: &'static str,
    },
    /// The selected backend was not compiled in.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        /// Cargo feature providing the backend.
        feature: &'static str,
        /// What the caller asked for.
        action: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the path.
        field: &'static str,
        /// Missing path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the path.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The output path names an existing directory.
    #[error("output path {path:?} is a directory")]
    OutputPathIsDirectory {
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// Opening the solve request file failed.
    #[error("failed to open solve request at {path:?}: {source}")]
    OpenSolveRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Solve request JSON could not be decoded.
    #[error("failed to parse solve request JSON at {path:?}: {source}")]
    ParseSolveRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Decoding failure, including configuration validation.
        #[source]
        source: serde_json::Error,
    },
    /// The request configuration failed validation after CLI overrides.
    #[error("solve request in {path:?} failed validation: {source}")]
    InvalidSolveRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: ConfigError,
    },
    /// Constructing the travel-matrix provider failed.
    #[error("failed to build travel matrix provider for {base_url:?}: {source}")]
    BuildTravelMatrixProvider {
        /// Configured OSRM base URL.
        base_url: String,
        /// Construction failure.
        #[source]
        source: ProviderBuildError,
    },
    /// The solver rejected the request.
    #[error("solver failed: {source}")]
    Solve {
        /// Solver failure.
        #[source]
        source: SolveError,
    },
    /// Serializing the solution failed.
    #[error("failed to serialize solution: {0}")]
    SerializeSolution(#[source] serde_json::Error),
    /// Creating the output file failed.
    #[error("failed to create output file {path:?}: {source}")]
    CreateOutputFile {
        /// Output path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Writing the solve output failed.
    #[error("failed to write solve output: {0}")]
    WriteSolveOutput(#[source] std::io::Error),
}
