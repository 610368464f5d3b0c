//! In-memory [`QueryBackend`] used by the unit tests.

use crate::query::backend::QueryBackend;
use crate::query::error::QueryError;
use crate::query::query_spec::QuerySpec;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::sync::Mutex;

type Responder = Box<dyn Fn(&QuerySpec) -> Result<DataFrame, QueryError> + Send + Sync>;

/// Answers queries with a caller-supplied closure and records every spec it receives.
pub(crate) struct MockBackend {
    responder: Responder,
    fields: HashMap<String, Vec<String>>,
    issued: Mutex<Vec<QuerySpec>>,
}

impl MockBackend {
    pub(crate) fn new(
        responder: impl Fn(&QuerySpec) -> Result<DataFrame, QueryError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            fields: HashMap::new(),
            issued: Mutex::new(Vec::new()),
        }
    }

    /// A backend whose every query matches nothing.
    pub(crate) fn empty() -> Self {
        Self::new(|_| Ok(DataFrame::empty()))
    }

    pub(crate) fn with_fields(mut self, table: &str, fields: &[&str]) -> Self {
        self.fields.insert(
            table.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    pub(crate) fn issued(&self) -> Vec<QuerySpec> {
        self.issued.lock().unwrap().clone()
    }
}

impl QueryBackend for MockBackend {
    async fn query(&self, spec: &QuerySpec) -> Result<DataFrame, QueryError> {
        self.issued.lock().unwrap().push(spec.clone());
        (self.responder)(spec)
    }

    async fn has_field(&self, table: &str, field: &str) -> Result<bool, QueryError> {
        Ok(self
            .fields
            .get(table)
            .is_some_and(|fields| fields.iter().any(|f| f == field)))
    }
}

/// The error a rejected statement produces.
pub(crate) fn rejected(spec: &QuerySpec) -> QueryError {
    QueryError::HttpStatus {
        query: crate::query::sql::render_sql(spec),
        status: reqwest::StatusCode::BAD_REQUEST,
        message: "Invalid object name".to_string(),
    }
}
