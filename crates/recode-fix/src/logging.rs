//! File logging for the injected agent.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use recode_core::config::LogSettings;
use tracing_subscriber::EnvFilter;

/// Where the log file goes: `settings.file`, relative to `dir` unless absolute.
pub fn log_path(dir: &Path, settings: &LogSettings) -> PathBuf {
    dir.join(&settings.file)
}

/// `RUST_LOG` if set, otherwise the configured level.
pub fn filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("Invalid log level '{}'", level)),
    }
}

/// Truncate the log file and route every event into it.
pub fn init(dir: &Path, settings: &LogSettings) -> Result<PathBuf> {
    let path = log_path(dir, settings);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(&settings.level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(path)
}
