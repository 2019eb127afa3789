//! Tracing subscriber for the binary: stderr console plus an optional log file.

use crate::config::LogConfig;
use anyhow::{Context, Result};
use std::fs::OpenOptions;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

/// Keeps the file writer thread alive; hold it until `main` returns
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Install the global subscriber. Returns a guard when file output is on.
pub fn init(config: &LogConfig) -> Result<Option<LogGuard>> {
    let filter = level_filter(config);

    let console = config.console_output.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter.clone())
    });

    let (file, guard) = match file_writer(config)? {
        Some((writer, guard)) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();

    tracing::debug!("Log level {} ({:?})", config.level, config.parse_level());
    Ok(guard)
}

/// Configured level as the default directive; `RUST_LOG` still wins
fn level_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

/// Append to `midihue.log` in the log directory, off the tick thread
fn file_writer(config: &LogConfig) -> Result<Option<(NonBlocking, LogGuard)>> {
    if !config.file_output {
        return Ok(None);
    }
    config
        .ensure_log_directory()
        .with_context(|| format!("Failed to create log directory {:?}", config.log_dir))?;

    let path = config.current_log_path();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;
    eprintln!("Logging to {:?}", path);

    let (writer, guard) = tracing_appender::non_blocking(file);
    Ok(Some((writer, LogGuard { _guard: guard })))
}
