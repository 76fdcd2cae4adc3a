use std::fs::OpenOptions;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable naming the log file. The terminal UI owns stdout, so
/// without it nothing is logged.
pub const LOG_FILE_ENV: &str = "PAGETAB_LOG_FILE";

pub fn init_tracing() -> Result<()> {
    let Ok(log_path) = std::env::var(LOG_FILE_ENV) else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {log_path}"))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(file_layer).init();
    Ok(())
}
