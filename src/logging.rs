//! Tracing configuration and log routing.
//!
//! The server logs to stdout with a compact formatter and, when possible, appends the same
//! events to a log file. `GEMDRIVE_LOG_FILE` overrides the file location; by default logs
//! land in `logs/gemdrive.log`. File writes go through a non-blocking writer so request
//! handling never waits on disk.
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "gemdrive.log";

/// Configure tracing subscribers for stdout and optional file logging.
///
/// Respects `RUST_LOG` for filtering and defaults to `info`. The file layer is skipped,
/// with a note on stderr, when the log file cannot be opened.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    if let Some(writer) = file_writer() {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();
        registry.with(file_layer).init();
    } else {
        registry.init();
    }
}

/// Open the log file in append mode and wrap it in a non-blocking writer.
///
/// The `WorkerGuard` is parked in a global so the background writer survives for the
/// process lifetime.
fn file_writer() -> Option<NonBlocking> {
    let path = log_file_path()?;
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}

/// Resolve the log file location, creating the default directory when needed.
fn log_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("GEMDRIVE_LOG_FILE") {
        return Some(PathBuf::from(path));
    }
    if let Err(err) = std::fs::create_dir_all(DEFAULT_LOG_DIR) {
        eprintln!("Failed to create logs directory: {err}");
        return None;
    }
    Some(PathBuf::from(DEFAULT_LOG_DIR).join(DEFAULT_LOG_FILE))
}
