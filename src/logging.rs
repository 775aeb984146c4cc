//! File-based logging
//!
//! The TUI owns the terminal, so tracing output goes to a daily-rotated file
//! instead of stdout.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "jamendo-rs";
const DEFAULT_FILTER: &str = "jamendo_rs=debug,reqwest=info,warn";

/// Initialize the logging system.
///
/// Logs are written to `<dir>/jamendo-rs.YYYY-MM-DD`. `RUST_LOG` overrides
/// the default filter. Keep the returned guard alive until exit or buffered
/// lines are lost.
pub fn init_logging(dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(dir = %dir.display(), "Logging initialized");
    Ok(guard)
}

/// Log the outcome of an API call
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "API request failed"),
        }
    };
}
