//! Process-wide tracing setup: daily files under the data directory plus stdout.

use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use crate::error::{AppError, AppResult};

static LOGGER_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

const LOG_ENV_VAR: &str = "WARD_TIMECLOCK_LOG";
const DEFAULT_LOG_DIRECTIVES: &str = "info,app::db=info,app::clock=debug";
const LOG_FILE_PREFIX: &str = "ward-timeclock";
/// One quarter of daily files.
const RETAINED_LOG_FILES: usize = 92;

/// Installs the global subscriber once; later calls return immediately.
pub fn init_logging(log_dir: &Path) -> AppResult<()> {
    LOGGER_GUARD
        .get_or_try_init(|| {
            fs::create_dir_all(log_dir)?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .filename_suffix("log")
                .max_log_files(RETAINED_LOG_FILES)
                .build(log_dir)
                .map_err(|err| {
                    AppError::other(format!(
                        "cannot open log file in {}: {err}",
                        log_dir.display()
                    ))
                })?;
            let (file_writer, guard) = tracing_appender::non_blocking(appender);
            let filter = log_filter(std::env::var(LOG_ENV_VAR).ok().as_deref())?;

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(file_writer)
                        .with_ansi(false)
                        .with_target(true)
                        .with_timer(UtcTime::rfc_3339()),
                )
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_timer(UtcTime::rfc_3339()),
                )
                .try_init()
                .map_err(|err| AppError::other(format!("failed to install subscriber: {err}")))?;

            Ok(guard)
        })
        .map(|_| ())
}

/// `WARD_TIMECLOCK_LOG` wins over `RUST_LOG`; without either the clock and
/// store targets log at their defaults.
fn log_filter(explicit: Option<&str>) -> AppResult<EnvFilter> {
    let directives = explicit
        .map(str::to_owned)
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .unwrap_or_else(|| DEFAULT_LOG_DIRECTIVES.to_string());

    EnvFilter::try_new(&directives)
        .map_err(|err| AppError::other(format!("invalid log directives {directives:?}: {err}")))
}
