use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::anyhow;
use anyhow::Result;
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

static LOG_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

/// Sends JSON logs to the configured log file. The terminal belongs to the
/// UI, so nothing is ever logged to stdout or stderr.
pub fn init() -> Result<()> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let level = LevelFilter::from_str(&Config::get(ConfigKey::LogLevel))?;
    let log_file = PathBuf::from(Config::get(ConfigKey::LogFile));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| return anyhow!("log file {} has no file name", log_file.display()))?;
    let dir = log_file
        .parent()
        .filter(|e| return !e.as_os_str().is_empty())
        .unwrap_or_else(|| return Path::new("."));
    std::fs::create_dir_all(dir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .json()
        .with_max_level(level)
        .with_writer(writer)
        .try_init()
        .map_err(|err| return anyhow!(err))?;

    let _ = LOG_GUARD.set(guard);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");

    return Ok(());
}
