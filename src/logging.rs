//! Structured JSONL logging to a file plus human-readable stderr output.
//!
//! - **JSONL to file** (~/.input-everywhere/logs/input-everywhere.jsonl)
//! - **Pretty to stderr** for whoever is running the binary
//!
//! ```rust,ignore
//! let _guard = input_everywhere::logging::init();
//! tracing::info!(event_type = "flag_changed", flag = "habitModeEnabled", value = false, "Flag changed");
//! ```
//!
//! Credentials are never passed to any of the helpers below.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::state::Flag;

const LOG_FILE_NAME: &str = "input-everywhere.jsonl";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
/// If the log file cannot be opened, only the stderr layer is installed.
pub fn init() -> LoggingGuard {
    let log_dir = get_log_dir();
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("[LOGGING] Failed to create log directory: {}", e);
    }
    let log_path = log_dir.join(LOG_FILE_NAME);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,ureq=warn"));

    let pretty_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .compact();

    let file = OpenOptions::new().create(true).append(true).open(&log_path);

    let (json_layer, file_guard) = match file {
        Ok(file) => {
            // Non-blocking so a slow disk never stalls event handling
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking_file)
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_span_events(FmtSpan::NONE);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            (None, None)
        }
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

/// Get the log directory path (~/.input-everywhere/logs/)
fn get_log_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".input-everywhere").join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("input-everywhere-logs"))
}

/// A flag was changed by a command, wherever it came from.
pub fn log_flag_change(flag: Flag, value: bool, source: &str) {
    tracing::info!(
        event_type = "flag_changed",
        flag = flag.key(),
        value,
        source,
        "Flag changed"
    );
}

/// The surrogate overlay opened, closed or was re-bound.
pub fn log_capture(page_id: u64, transition: &str, target: Option<u64>) {
    tracing::debug!(
        event_type = "capture",
        page_id,
        transition,
        target = ?target,
        "Capture state transition"
    );
}

/// A broadcast or directive could not be delivered. Expected, never an error.
pub fn log_delivery_miss(page_id: u64, message: &str) {
    tracing::debug!(
        event_type = "delivery_miss",
        page_id,
        message,
        "Page not listening, message dropped"
    );
}
