use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("No CMAP API key found, set the {0} environment variable")]
    MissingApiKey(&'static str),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Query '{query}' failed with status {status}: {message}")]
    HttpStatus {
        query: String,
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Failed to read response body for query '{0}'")]
    ResponseBody(String, #[source] reqwest::Error),

    // Errors during CSV decoding (inside blocking task)
    #[error("I/O error decoding CSV result of query '{query}'")]
    CsvReadIo {
        query: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing error decoding CSV result of query '{query}'")]
    CsvReadPolars {
        query: String,
        #[source]
        source: PolarsError,
    },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Result of query on '{table}' has no column '{column}'")]
    MissingColumn { table: String, column: String },
}
