//! Logging setup for `gtmx`.
//!
//! Diagnostics go to stderr, or as JSON lines to a log file, so stdout
//! stays clean for JSON output. `RUST_LOG` takes precedence over the verbosity flags.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Default filter directive for a verbosity level.
#[must_use]
pub fn level_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or the filter is
/// invalid.
pub fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(&directives).with_context(|| format!("invalid RUST_LOG: {directives}"))?
        }
        _ => EnvFilter::new(level_directive(verbose, quiet)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose > 1);

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder
                .json()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
