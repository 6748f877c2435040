use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the usage-wrapped crates.
#[derive(Error, Debug)]
pub enum WrappedError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A calendar date string was not in `YYYY-MM-DD` form.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A time zone name is not a recognised IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// An input path given on the command line does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// A directory of usage event pages contained no JSON files.
    #[error("No JSON files found in {0}")]
    NoDataFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the wrapped crates.
pub type Result<T> = std::result::Result<T, WrappedError>;
