use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "largest_banks_etl=info";

/// Initializes diagnostic logging: human-readable on stderr, plus JSON
/// files under `log_dir` when one is given.
///
/// stdout is left to the table dumps. Keep the returned guard alive until
/// exit so buffered file logs get flushed.
pub fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let mut guard = None;
    let file_layer = log_dir.and_then(|dir| {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Could not create log directory {}: {}", dir.display(), e);
            return None;
        }
        let file_appender = tracing_appender::rolling::daily(dir, "etl.log");
        let (non_blocking_writer, file_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(file_guard);
        Some(fmt::layer().json().with_writer(non_blocking_writer))
    });

    let console_layer = fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}
