//! Tracing setup. Logs go to a daily rolling file so they never interleave
//! with the REPL.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_PREFIX: &str = "docport.log";

/// Installs the global subscriber. Keep the guard alive for the lifetime of
/// the process or buffered lines are lost.
///
/// `RUST_LOG` wins over `default_level`.
pub fn init_tracing(log_dir: &Path, default_level: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(default_level)))
        .context("Invalid log level")?;

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// Our crates at `level`, chatty HTTP internals capped at `warn`.
fn default_filter(level: &str) -> String {
    format!("{level},hyper=warn,hyper_util=warn,reqwest=warn,rustyline=warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        for level in ["info", "debug", "trace", "warn"] {
            assert!(EnvFilter::try_new(default_filter(level)).is_ok());
        }
    }
}
