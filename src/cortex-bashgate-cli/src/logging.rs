//! Subscriber setup.
//!
//! stdout belongs to the hook protocol, so console logs always go to stderr.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::cli::LogLevel;

/// Environment variable consulted when no level flag is given.
pub const LOG_ENV_VAR: &str = "CORTEX_BASHGATE_LOG";

/// Keeps the audit file writer alive; logs are flushed when dropped.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// The audit file, when given, always records at least `info` so that every
/// decision lands in it regardless of console verbosity.
pub fn init(level: LogLevel, log_file: Option<&Path>) -> Result<LogGuard> {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(EnvFilter::new(level.as_filter_str()));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let file_level = if level > LogLevel::Info {
                level
            } else {
                LogLevel::Info
            };
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_filter(EnvFilter::new(file_level.as_filter_str()));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LogGuard { _file: guard })
}
