//! Subscriber setup: human-readable stderr plus a per-session log file.
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::SimConfig;

/// Installs the global subscriber. Keep the guard alive until exit so the
/// file writer flushes.
pub fn setup_logging(config: &SimConfig) -> Result<WorkerGuard> {
    let session_id = config.session_id.clone().unwrap_or_else(|| {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        format!("session_{timestamp}")
    });

    let session_log_dir = config.log_dir.clone().unwrap_or_else(log_dir).join(&session_id);
    std::fs::create_dir_all(&session_log_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "sim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    // Stdout carries the JSON summary.
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    tracing::info!(session = %session_id, "logging initialized");
    tracing::info!("Log file: {}", session_log_dir.join("sim.log").display());

    Ok(guard)
}

/// Platform cache directory for logs, e.g. `~/.cache/gas-sim/logs` on Linux.
fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "gas-sim")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("gas-sim"))
        .join("logs")
}
