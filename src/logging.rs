use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::EnvFilter;

use crate::config::LOG_ENV;

/// Daily log files under `<dir>/logs`. Nothing goes to stdout since the TUI owns the terminal.
pub fn enable_logging(application_data_path: &Path, log_level: Option<&str>) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(7)
        .filename_prefix("billable")
        .filename_suffix("log")
        .build(application_data_path.join("logs"))?;

    let level = log_level
        .map(str::to_string)
        .unwrap_or_else(|| std::env::var(LOG_ENV).unwrap_or_else(|_| "info".into()));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_ansi(false)
        .with_writer(appender)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;
    Ok(())
}

/// `<data dir>/billable`, or the working directory when there is no data dir.
pub fn application_data_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("billable"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
pub static TEST_LOGGING: std::sync::LazyLock<()> = std::sync::LazyLock::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::level_filters::LevelFilter::TRACE)
        .with_test_writer()
        .try_init();
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_into_logs_directory() {
        let dir = tempfile::tempdir().unwrap();
        // A subscriber may already be installed by another test; the directory is created either way.
        let _ = enable_logging(dir.path(), Some("debug"));
        assert!(dir.path().join("logs").is_dir());
    }
}
