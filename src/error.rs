use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by the parsing, reshaping and loading stages.
///
/// Every variant is fatal: the run cannot guarantee data integrity and stops. Recoverable
/// anomalies (bad year ranges, partial country coverage) are reported as
/// [`crate::ingestion::PipelineWarning`]s instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Pipeline configuration could not be decoded.
    #[error("config error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars could not build a frame from the in-memory table.
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// The raw table is not rectangular (or has no header at all).
    #[error("structural error at line {line}: {message}")]
    Structural { line: usize, message: String },

    /// A column used as a year could not be parsed as an integer.
    #[error("invalid year header '{column}'")]
    InvalidYearHeader { column: String },

    /// The table does not have the columns an operation needs.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A cell could not be coerced to a number.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}
