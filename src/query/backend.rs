use crate::query::error::QueryError;
use crate::query::query_spec::QuerySpec;
use polars::prelude::DataFrame;
use std::future::Future;

/// The remote query engine the pipeline reads from.
///
/// Implementations only need to be able to run a [`QuerySpec`] and answer a
/// schema question; they are shared by reference across concurrently running
/// colocalization tasks, hence the `Sync` bound.
pub trait QueryBackend: Send + Sync {
    /// Runs `spec` and returns its rows. Zero rows is a valid result, not an error.
    fn query(&self, spec: &QuerySpec) -> impl Future<Output = Result<DataFrame, QueryError>> + Send;

    /// Whether `table` has a column named `field`.
    fn has_field(
        &self,
        table: &str,
        field: &str,
    ) -> impl Future<Output = Result<bool, QueryError>> + Send;
}
