//! Logging support for assgn-sanitizer
//!
//! Diagnostics go to stderr, or are appended to a file when one is configured.
//! `RUST_LOG` takes precedence over the verbosity flags.

use anyhow::Result;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Default filter directive for a `-v` count
pub fn filter_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "assgn_sanitizer=warn",
        1 => "assgn_sanitizer=info",
        _ => "assgn_sanitizer=debug",
    }
}

/// Initialize the logging system
///
/// If the log file cannot be opened, falls back to stderr with a warning.
pub fn init_logging(verbosity: u8, log_path: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbosity)));

    let log_file = match log_path.map(open_log_file) {
        Some(Ok(file)) => Some(file),
        Some(Err(e)) => {
            // Never break a run because the log file is unavailable
            eprintln!("Warning: Could not open log file: {}", e);
            None
        }
        None => None,
    };

    let Some(log_file) = log_file else {
        let subscriber = registry()
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .with(filter);

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

        return Ok(());
    };

    let subscriber = registry()
        .with(
            fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    if let Some(path) = log_path {
        info!("Logging to {}", path.display());
    }

    Ok(())
}

/// Open (or create) the log file for appending, creating parent directories
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::OpenOptions::new().create(true).append(true).open(path)
}
