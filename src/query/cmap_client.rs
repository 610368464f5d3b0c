use crate::query::backend::QueryBackend;
use crate::query::error::QueryError;
use crate::query::query_spec::QuerySpec;
use crate::query::sql::render_sql;
use crate::utils::get_opt_float;
use log::{debug, warn};
use polars::frame::DataFrame;
use polars::prelude::*;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use std::io::Write;
use tempfile::NamedTempFile;
use tokio::task;

const DEFAULT_BASE_URL: &str = "https://simonscmap.com";
const QUERY_ROUTE: &str = "/api/data/query";

/// Environment variable [`CmapClient::from_env`] reads the API key from.
pub const API_KEY_ENV: &str = "CMAP_API_KEY";

/// [`QueryBackend`] talking to the Simons CMAP REST API.
///
/// Every query is rendered to SQL with [`render_sql`], sent as a `GET` with
/// an `Api-Key` authorization header, and the CSV response is decoded into a
/// polars [`DataFrame`].
pub struct CmapClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl CmapClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a client using the key stored in `CMAP_API_KEY`.
    pub fn from_env() -> Result<Self, QueryError> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
            .ok_or(QueryError::MissingApiKey(API_KEY_ENV))
    }

    /// Points the client at another deployment of the API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Runs a raw SQL statement.
    pub async fn query_sql(&self, sql: &str) -> Result<DataFrame, QueryError> {
        let body = self.fetch(sql).await?;
        Self::csv_to_dataframe(body, sql).await
    }

    async fn fetch(&self, sql: &str) -> Result<Vec<u8>, QueryError> {
        let url = format!("{}{}", self.base_url, QUERY_ROUTE);
        debug!("Querying {}: {}", url, sql);

        let response = self
            .http
            .get(&url)
            .query(&[("query", sql)])
            .header(AUTHORIZATION, format!("Api-Key {}", self.api_key))
            .send()
            .await
            .map_err(|e| QueryError::NetworkRequest(url.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            // The API explains rejected statements in the body.
            let message = response.text().await.unwrap_or_default();
            warn!("HTTP {} for query {}: {}", status, sql, message);
            return Err(QueryError::HttpStatus {
                query: sql.to_string(),
                status,
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| QueryError::ResponseBody(sql.to_string(), e))?;
        Ok(bytes.to_vec())
    }

    /// Parses a CSV response body (with header) into a DataFrame using a blocking task.
    /// An empty body means the query matched nothing.
    async fn csv_to_dataframe(bytes: Vec<u8>, sql: &str) -> Result<DataFrame, QueryError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(DataFrame::empty());
        }
        let query = sql.to_string();

        task::spawn_blocking(move || {
            let mut temp_file = NamedTempFile::new().map_err(|e| QueryError::CsvReadIo {
                query: query.clone(),
                source: e,
            })?;
            temp_file
                .write_all(&bytes)
                .and_then(|_| temp_file.flush())
                .map_err(|e| QueryError::CsvReadIo {
                    query: query.clone(),
                    source: e,
                })?;

            CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(None)
                .try_into_reader_with_file_path(Some(temp_file.path().to_path_buf()))
                .and_then(|reader| reader.finish())
                .map_err(|e| QueryError::CsvReadPolars { query, source: e })
        })
        .await?
    }
}

impl QueryBackend for CmapClient {
    async fn query(&self, spec: &QuerySpec) -> Result<DataFrame, QueryError> {
        self.query_sql(&render_sql(spec)).await
    }

    async fn has_field(&self, table: &str, field: &str) -> Result<bool, QueryError> {
        // COL_LENGTH is NULL for unknown columns.
        let sql = format!("SELECT COL_LENGTH('{}', '{}') AS RESULT", table, field);
        let frame = self.query_sql(&sql).await?;
        let length = frame
            .column("RESULT")
            .map_err(|_| QueryError::MissingColumn {
                table: table.to_string(),
                column: "RESULT".to_string(),
            })?;
        Ok(get_opt_float(length, 0).is_some())
    }
}
