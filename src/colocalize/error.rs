use crate::query::error::QueryError;
use chrono::NaiveDateTime;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColocalizeError {
    #[error("Invalid frame input: expected a single-row frame but received {found} rows")]
    InvalidFrameHeight { found: usize },

    #[error("Malformed observation at row {row}: column '{column}' {reason}")]
    MalformedObservation {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Time window of {days} days around {time} is out of range for {table}")]
    TimeWindowOutOfRange {
        table: String,
        time: NaiveDateTime,
        days: f64,
    },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
