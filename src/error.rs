use std::path::PathBuf;

use thiserror::Error;

/// Errors raised at configuration time or at the file boundary.
///
/// The learning loop itself never fails: unseen states are lazily
/// initialised rather than reported.
#[derive(Debug, Error)]
pub enum HunterError {
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Cannot place {requested} entities on a grid with {cells} cells")]
    TooManyEntities { requested: usize, cells: usize },

    #[error("Expected {expected} actions (one per hunter), got {got}")]
    ActionCountMismatch { expected: usize, got: usize },

    #[error("Operation requires {hunters} hunter(s) and {prey} prey")]
    UnsupportedLayout { hunters: usize, prey: usize },

    #[error("Q-table file not found: {}", path.display())]
    TableNotFound { path: PathBuf },

    #[error("Malformed Q-table file {}: {reason}", path.display())]
    MalformedTable { path: PathBuf, reason: String },

    #[error("Unsupported Q-table format version {found} (expected {expected})")]
    UnsupportedTableVersion { found: u32, expected: u32 },

    #[error("Malformed episode record on line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("State encoding mismatch: table uses {table}, run uses {run}")]
    EncodingMismatch { table: String, run: String },

    #[error("Failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results carrying a [`HunterError`].
pub type Result<T> = std::result::Result<T, HunterError>;

impl HunterError {
    /// Wraps an I/O error with a description of what was being attempted.
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        HunterError::Io {
            operation: operation.into(),
            source,
        }
    }
}
