use crate::error::AppError;
use std::{fs, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directive.
pub const LOG_ENV: &str = "TASKBOARD_LOG";

/// Sends diagnostics to `path`. The terminal belongs to the board UI, so
/// nothing is ever written to stdout or stderr.
pub fn init(path: &Path) -> Result<(), AppError> {
    let logging_error = |source| AppError::Logging {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(logging_error)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(logging_error)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| AppError::Subscriber(err.to_string()))
}
