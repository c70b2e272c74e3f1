//! Logging configuration with file-based output and size-based rotation.
//!
//! Writes logs to `~/.config/airwatch/airwatch.log` (or platform equivalent)
//! with 10 MB size-based rotation. Set `DEBUG_LOGGING=1` to enable debug
//! output for airwatch crates.

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEBUG_DIRECTIVE: &str = "info,airwatch_core=debug,airwatch_cli=debug";

fn filter(debug_logging: bool) -> EnvFilter {
    EnvFilter::new(if debug_logging { DEBUG_DIRECTIVE } else { "info" })
}

/// Initialize logging with dual output (file + stderr).
///
/// Returns a `WorkerGuard` that must be held for the program lifetime so
/// buffered log lines are flushed on exit. Console output goes to stderr,
/// leaving stdout for command results.
///
/// Falls back to stderr-only logging when the log directory or file cannot
/// be created.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let debug_logging = std::env::var("DEBUG_LOGGING").is_ok();

    let Some(log_dir) = dirs::config_dir().map(|config| config.join("airwatch")) else {
        init_console_only(debug_logging);
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        // subscriber not initialized yet
        eprintln!("Failed to create log directory {log_dir:?}: {e}, logging to console only");
        init_console_only(debug_logging);
        return None;
    }

    // 10 MB, keep airwatch.log and airwatch.log.1
    let log_path = log_dir.join("airwatch.log");
    let file_appender = match BasicRollingFileAppender::new(
        &log_path,
        RollingConditionBasic::new().max_size(10 * 1024 * 1024),
        1,
    ) {
        Ok(appender) => appender,
        Err(e) => {
            eprintln!("Failed to create log file at {log_path:?}: {e}");
            init_console_only(debug_logging);
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(log_file = ?log_path, debug_logging, "Airwatch logging initialized");

    Some(guard)
}

fn init_console_only(debug_logging: bool) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(filter(debug_logging))
        .init();

    tracing::info!(debug_logging, "Airwatch logging initialized (console only)");
}
