use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "respite=info";

pub enum LogTarget {
    Stderr,
    /// Appends to a file; used while the terminal ui owns the screen.
    File(PathBuf),
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(target: LogTarget) -> Result<(), LoggingError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            let file = open_log_file(&path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    result.map_err(|e| LoggingError::Install(e.to_string()))
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| LoggingError::Open(path.to_path_buf(), e))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggingError::Open(path.to_path_buf(), e))
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {0}: {1}")]
    Open(PathBuf, io::Error),
    #[error("failed to install logger: {0}")]
    Install(String),
}
