//! Subscriber setup. Logs always go to stdout; `ENABLE_FILE_LOGS` adds a
//! daily rolling file under `LOG_DIR`.
//!
//! Settings are read straight from the environment so that tracing can be
//! installed before anything else (config loading included) wants to log.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::env_string;

pub const LOG_FILE_PREFIX: &str = "polypath-backend.log";
const DEFAULT_FILTER: &str = "info";
const DEFAULT_LOG_DIR: &str = "./logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stdout,
    StdoutAndFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// An `EnvFilter` directive such as `info` or `polypath_backend=debug`.
    pub filter: String,
    pub destination: LogDestination,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_values(
            env_string("RUST_LOG"),
            env_string("ENABLE_FILE_LOGS"),
            env_string("LOG_DIR"),
        )
    }

    pub fn from_values(
        filter: Option<String>,
        file_logs: Option<String>,
        log_dir: Option<String>,
    ) -> Self {
        let destination = if file_logs.as_deref().is_some_and(flag_enabled) {
            LogDestination::StdoutAndFile(PathBuf::from(
                log_dir.unwrap_or_else(|| DEFAULT_LOG_DIR.to_string()),
            ))
        } else {
            LogDestination::Stdout
        };

        Self {
            filter: filter.unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            destination,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::from_values(None, None, None)
    }
}

fn flag_enabled(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Keeps the background file writer alive; dropping it flushes pending lines.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

pub fn init_tracing(settings: &LogSettings) -> LogGuard {
    let env_filter =
        EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut file_error = None;
    let (file_layer, guard) = match &settings.destination {
        LogDestination::Stdout => (None, None),
        LogDestination::StdoutAndFile(dir) => match file_writer(dir) {
            Ok((writer, guard)) => (
                Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true)),
                Some(guard),
            ),
            Err(e) => {
                file_error = Some(e);
                (None, None)
            }
        },
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    if let LogDestination::StdoutAndFile(dir) = &settings.destination {
        match file_error {
            Some(e) => tracing::warn!(log_dir = %dir.display(), error = %e, "file logging disabled"),
            None => tracing::info!(log_dir = %dir.display(), "file logging enabled"),
        }
    }

    LogGuard { _file: guard }
}

fn file_writer(dir: &Path) -> std::io::Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}
