use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnifyError {
    #[error("Invalid columns in '{}': found {found:?}, expected {expected:?}", file.display())]
    SchemaMismatch {
        file: PathBuf,
        found: Vec<String>,
        expected: Vec<String>,
    },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
