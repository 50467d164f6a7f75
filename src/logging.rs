//! File-based logging.
//!
//! The TUI owns the terminal, so tracing output goes to a daily rolling file
//! under the configured log directory instead of stdout.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LoggingSettings, default_log_dir};

const LOG_FILE_PREFIX: &str = "encore.log";

fn log_dir(settings: &LoggingSettings) -> PathBuf {
    settings
        .dir
        .clone()
        .or_else(default_log_dir)
        .unwrap_or_else(|| PathBuf::from(".logs"))
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured filter.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<PathBuf> {
    let dir = log_dir(settings);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // The guard flushes on drop; it has to live as long as the process.
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("encore=debug,warn"));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(dir = %dir.display(), "logging initialized");
    Ok(dir)
}
