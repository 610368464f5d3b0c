//! Retrieval of raw cyanobacteria observations.

use crate::query::backend::QueryBackend;
use crate::query::error::QueryError;
use crate::query::query_spec::{Literal, Predicate, QuerySpec};
use crate::types::catalog::CyanoSource;
use crate::types::settings::{DEPTH, LAT, LON, TIME};
use log::info;
use polars::prelude::DataFrame;

/// The SELECT retrieving `source`'s observations.
///
/// Sources with a depth dimension are restricted to `depth_range` (meters,
/// inclusive); sources without one are retrieved in full.
pub fn retrieval_query(source: &CyanoSource, has_depth: bool, depth_range: (f64, f64)) -> QuerySpec {
    let mut spec = QuerySpec::new(&source.table).column(TIME).column(LAT).column(LON);
    if has_depth {
        spec = spec.column(DEPTH);
    }
    spec = source
        .fields
        .iter()
        .fold(spec, |spec, field| spec.column(field));
    if has_depth {
        spec = spec.filter(Predicate::between(
            DEPTH,
            Literal::Number(depth_range.0),
            Literal::Number(depth_range.1),
        ));
    }
    spec
}

/// Downloads the observations of one source.
pub async fn retrieve_source<B: QueryBackend>(
    backend: &B,
    source: &CyanoSource,
    depth_range: (f64, f64),
) -> Result<DataFrame, QueryError> {
    let has_depth = backend.has_field(&source.table, DEPTH).await?;
    info!(
        "Downloading {} (depth dimension: {})",
        source.table, has_depth
    );
    let frame = backend
        .query(&retrieval_query(source, has_depth, depth_range))
        .await?;
    info!("Retrieved {} observations from {}", frame.height(), source.table);
    Ok(frame)
}
