//! Entry point for the `roundsman` command.
#![forbid(unsafe_code)]

use roundsman_cli::CliError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

fn main() {
    init_logging();
    match roundsman_cli::run() {
        Ok(()) => {}
        // Help and version requests are reported through clap's own exit path.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("roundsman: {err}");
            std::process::exit(1);
        }
    }
}

/// Route `log` records from the library crates to stderr, filtered by
/// `RUST_LOG` (default `warn`).
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_log = fmt::layer().with_writer(std::io::stderr);
    if let Err(err) = registry().with(stderr_log).with(env_filter).try_init() {
        eprintln!("roundsman: logging disabled: {err}");
    }
}
