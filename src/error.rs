//! Error types for the ROSphere core.
//!
//! Nothing here is fatal to the process: ingestion and replay errors are
//! caught at their boundary and surfaced as inline messages, leaving the
//! session at its last-good state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// The uploaded table could not be read at all.
    #[error("dataset ingestion failed: {0}")]
    Ingestion(String),

    /// No column matched any of the recognized time-column spellings.
    #[error("dataset has no recognizable time column")]
    MissingTimeColumn,

    /// A row had an unparseable value in the time column.
    #[error("malformed row {row}: {detail}")]
    MalformedRow { row: usize, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
