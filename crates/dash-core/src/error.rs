use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by Channel Dash.
#[derive(Error, Debug)]
pub enum DashError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV record could not be decoded.
    #[error("Failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The per-video export does not have the fixed column layout.
    #[error("Expected {expected} columns in {path}, found {found}")]
    ColumnCount {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    /// An average-view-duration cell is not `HH:MM:SS`.
    #[error("Invalid view duration on row {row}: {value:?} (expected HH:MM:SS)")]
    DurationParse { row: usize, value: String },

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A numeric cell contained non-numeric text.
    #[error("Invalid number in column {column:?}: {value:?}")]
    NumberParse { column: String, value: String },

    /// A top-N request could not be coerced to a count.
    #[error("Invalid top-N value {0:?}: expected a non-negative whole number")]
    InvalidTopN(String),

    /// No video with the requested title exists.
    #[error("Unknown video: {0}")]
    UnknownVideo(String),

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed or written.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dash crates.
pub type Result<T> = std::result::Result<T, DashError>;
