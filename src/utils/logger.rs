// Logger initialization
//
// The CLI logs to stderr so stdout carries only the summary. The TUI owns the
// terminal, so it logs to a file under the configured log directory instead.

use std::fs;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "notepilot=info";
pub const LOG_FILE_NAME: &str = "notepilot.log";

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. The returned guard must live until exit
/// when logging to a file, or buffered lines are lost.
pub fn init_logger(target: LogTarget, log_dir: &Path) -> anyhow::Result<Option<WorkerGuard>> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(fmt::layer().with_target(true).with_writer(io::stderr))
                .try_init()?;
            Ok(None)
        }
        LogTarget::File => {
            fs::create_dir_all(log_dir)?;
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(env_filter())
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_line_number(true)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .try_init()?;
            Ok(Some(guard))
        }
    }
}
