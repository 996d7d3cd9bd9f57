//! # Logging Setup
//!
//! Installs the global `tracing` subscriber: stdout plus a per-session log file
//! under the data directory.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::domain::config::SystemConfig;
use crate::domain::paths;

pub const DEFAULT_FILTER: &str =
    "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn";

/// Filter directives: `RUST_LOG` wins, then the config, then `DEFAULT_FILTER`.
pub fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        configured
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    })
}

/// Initializes logging. The returned guard must live as long as the process,
/// or buffered file output is lost.
pub fn init(system: &SystemConfig) -> Result<WorkerGuard> {
    let data_dir = Path::new(&system.data_dir);
    if !data_dir.exists() {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
    }

    // Clear previous session log
    let log_path = data_dir.join(paths::LOG_FILE);
    if log_path.exists() {
        let _ = fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(data_dir, paths::LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_writer(non_blocking)
        .with_ansi(false);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime::rfc_3339())
        .with_writer(std::io::stdout);

    tracing_subscriber::registry()
        .with(env_filter(system.log_filter.as_deref()))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configured_filter_falls_back() {
        // Only meaningful when RUST_LOG is unset, which is the case under `cargo test` by default.
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert_eq!(
            env_filter(Some("relay=notalevel")).to_string(),
            EnvFilter::new(DEFAULT_FILTER).to_string()
        );
        assert_eq!(env_filter(Some("debug")).to_string(), "debug");
    }
}
