//! Logging setup.
//!
//! Two `tracing` layers share one `EnvFilter` (`RUST_LOG`, default `info`):
//! - a JSON file layer, rolled daily, in the app data directory
//! - a pretty human-readable layer on stderr
//!
//! stdout is left alone so command output stays machine-readable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "eyes-of-azrael.log";
const DEFAULT_FILTER: &str = "info";

/// Default log directory under the platform data dir.
pub fn default_log_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("eyes-of-azrael").join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Initialize logging into [`default_log_dir`].
///
/// Returns a `WorkerGuard` which must be kept alive for the duration of the
/// application so buffered file logs are flushed on shutdown.
pub fn init() -> WorkerGuard {
    init_with_dir(&default_log_dir())
}

/// Initialize logging into `log_dir`.
pub fn init_with_dir(log_dir: &Path) -> WorkerGuard {
    if !log_dir.exists() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Failed to create logs directory: {}", e);
        }
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = env_filter();

    // File Layer: JSON for later ingestion
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .json()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(env_filter.clone());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .pretty()
        .with_filter(env_filter);

    if let Err(e) = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("Failed to initialize tracing subscriber: {}", e);
    }

    // Redirect standard `log` macros to `tracing`. Already done when the
    // subscriber's own `tracing-log` feature installed the bridge.
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!(error = %e, "LogTracer already installed");
    }

    log::info!(
        "Logging initialized. Writing to: {:?} (daily rolling)",
        log_dir.join(LOG_FILE_PREFIX)
    );

    guard
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir() {
        let dir = default_log_dir();
        assert!(dir.ends_with("eyes-of-azrael/logs") || dir == PathBuf::from("logs"));
    }

    #[test]
    fn test_init_creates_log_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let log_dir = temp.path().join("nested").join("logs");

        let guard = init_with_dir(&log_dir);
        tracing::info!(test = "logging", "hello from test");
        drop(guard);

        assert!(log_dir.is_dir());
    }
}
