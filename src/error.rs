use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort the whole run. Anything that goes wrong for a single
/// row is reported through `RowOutcome` instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Error connecting to Jira: {0}")]
    Connection(String),

    #[error("CSV file '{}' not found", .0.display())]
    InputNotFound(PathBuf),

    #[error("Error reading CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
