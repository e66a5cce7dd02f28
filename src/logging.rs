use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app_dirs::AppDirs;

pub const LOG_ENV: &str = "NBACK_LOG";
const LOG_FILE: &str = "nback.log";

/// Keeps the background log writer alive; logs are flushed when dropped.
pub struct LogGuard {
    _guard: WorkerGuard,
}

/// Filter directives from `NBACK_LOG`, if set and non-empty.
fn filter_from_env() -> Option<EnvFilter> {
    let directives = std::env::var(LOG_ENV).ok()?;
    if directives.trim().is_empty() {
        return None;
    }
    Some(EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info")))
}

/// Starts file logging when `NBACK_LOG` is set. The terminal belongs to the
/// game, so nothing is ever written to stdout or stderr.
pub fn init() -> Option<LogGuard> {
    let filter = filter_from_env()?;
    let log_dir = AppDirs::log_dir()?;
    std::fs::create_dir_all(&log_dir).ok()?;

    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .ok()?;

    Some(LogGuard { _guard: guard })
}
