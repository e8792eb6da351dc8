//! Debug logging support for fragpatch
//!
//! When debug mode is enabled via config or `--debug`, operations are logged
//! to ~/.fragpatch/fragpatch.log. `RUST_LOG` overrides the default filter.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

const LOG_FILE_NAME: &str = "fragpatch.log";
const DEFAULT_FILTER: &str = "fragpatch=debug";

/// Initialize the debug logging system
///
/// If debug_enabled is true, sets up file logging under `log_dir`.
/// Returns the path to the log file, or None if logging is not enabled.
pub fn init_debug_logging(debug_enabled: bool, log_dir: &Path) -> Result<Option<PathBuf>> {
    if !debug_enabled {
        return Ok(None);
    }

    if let Err(e) = fs::create_dir_all(log_dir) {
        // Logging must never stop a patch from running
        eprintln!(
            "Warning: Could not create log directory {}: {}",
            log_dir.display(),
            e
        );
        return Ok(None);
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_NAME)
        .build(log_dir)
    {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Warning: Could not create log file {}: {}", log_path.display(), e);
            return Ok(None);
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let subscriber = registry()
        .with(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fragpatch started");

    Ok(Some(log_path))
}

/// Enable debug logging under the default log directory
///
/// If the directory cannot be resolved, warns and runs without logging.
pub fn init_default_debug_logging() -> Result<Option<PathBuf>> {
    init_debug_logging_at(default_log_dir())
}

fn init_debug_logging_at(log_dir: Result<PathBuf>) -> Result<Option<PathBuf>> {
    match log_dir {
        Ok(dir) => init_debug_logging(true, &dir),
        Err(e) => {
            eprintln!("Warning: Debug logging disabled: {}", e);
            Ok(None)
        }
    }
}

/// Default log directory: ~/.fragpatch
pub fn default_log_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().context("Cannot determine home directory")?;
    Ok(home_dir.join(".fragpatch"))
}
