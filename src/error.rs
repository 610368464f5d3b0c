use crate::colocalize::error::ColocalizeError;
use crate::compile::error::UnifyError;
use crate::query::error::QueryError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CyanoError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Colocalize(#[from] ColocalizeError),

    #[error(transparent)]
    Unify(#[from] UnifyError),

    #[error("Failed to create directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to list directory '{0}'")]
    DirRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to read CSV file '{0}'")]
    CsvRead(PathBuf, #[source] PolarsError),

    #[error("I/O error writing CSV file '{0}'")]
    CsvWriteIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error writing CSV file '{0}'")]
    CsvWrite(PathBuf, #[source] PolarsError),

    #[error("Failed to read catalog file '{0}'")]
    CatalogRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse catalog file '{0}'")]
    CatalogParse(PathBuf, #[source] serde_json::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
