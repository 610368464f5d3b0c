//! Matches observations against every environmental dataset.
//!
//! [`match_observation`] is the unit of work: one single-row frame in, the same
//! row with its environmental columns filled out. [`match_frame`] fans that out
//! over a whole observation frame with a bounded number of rows in flight.

use crate::colocalize::error::ColocalizeError;
use crate::colocalize::window::build_window;
use crate::query::backend::QueryBackend;
use crate::query::error::QueryError;
use crate::types::coverage::ResolvedDataset;
use crate::types::observation::Observation;
use crate::utils::get_opt_float;
use chrono::Local;
use futures_util::{stream, StreamExt, TryStreamExt};
use log::info;
use polars::prelude::*;

/// Adds one null `Float64` column per environmental variable, in catalog order.
///
/// Variables already present are cast to `Float64` in place so every row of
/// the frame shares one schema.
pub fn add_env_columns(
    mut frame: DataFrame,
    datasets: &[ResolvedDataset],
) -> Result<DataFrame, ColocalizeError> {
    let height = frame.height();
    for variable in datasets.iter().flat_map(|d| d.variables()) {
        let column = match frame.column(variable) {
            Ok(existing) => existing.cast(&DataType::Float64)?,
            Err(_) => Column::full_null(variable.as_str().into(), height, &DataType::Float64),
        };
        frame.with_column(column)?;
    }
    Ok(frame)
}

/// Colocalizes a single observation.
///
/// Issues one window query per dataset and writes the averaged values into
/// the row's columns. A dataset returning no rows leaves its variables null.
///
/// `row_index` and `row_count` only feed the progress log; `source` names the
/// file the observation came from.
///
/// # Errors
///
/// * [`ColocalizeError::InvalidFrameHeight`] if `frame` does not hold exactly one row.
///   No query is issued in that case.
/// * [`ColocalizeError::MalformedObservation`] if time, lat or lon cannot be read.
/// * [`ColocalizeError::TimeWindowOutOfRange`] if a dataset's time tolerance
///   cannot be applied to the observation time.
/// * [`ColocalizeError::Query`] on the first failing query.
pub async fn match_observation<B: QueryBackend>(
    frame: DataFrame,
    backend: &B,
    datasets: &[ResolvedDataset],
    source: &str,
    row_index: usize,
    row_count: usize,
) -> Result<DataFrame, ColocalizeError> {
    if frame.height() != 1 {
        return Err(ColocalizeError::InvalidFrameHeight {
            found: frame.height(),
        });
    }
    let observation = Observation::from_frame(&frame, 0, row_index)?;
    let mut frame = frame;

    for dataset in datasets {
        info!(
            "{} / {} {}: Colocalizing {} with {} ...",
            row_index,
            row_count.saturating_sub(1),
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            dataset.table(),
            source
        );
        let matched = backend.query(&build_window(&observation, dataset)?).await?;
        if matched.height() == 0 {
            continue;
        }
        for variable in dataset.variables() {
            let value = matched
                .column(variable)
                .map_err(|_| QueryError::MissingColumn {
                    table: dataset.table().to_string(),
                    column: variable.clone(),
                })
                .map(|c| get_opt_float(c, 0))?;
            frame.with_column(Column::new(variable.as_str().into(), &[value]))?;
        }
    }
    Ok(frame)
}

/// Colocalizes every row of `frame`, at most `workers` rows at a time.
///
/// Rows complete in any order; each result is tagged with its original index
/// and the output is reassembled in input order. The first error aborts the
/// whole frame.
pub async fn match_frame<B: QueryBackend>(
    frame: &DataFrame,
    backend: &B,
    datasets: &[ResolvedDataset],
    source: &str,
    workers: usize,
) -> Result<DataFrame, ColocalizeError> {
    let row_count = frame.height();
    if row_count == 0 {
        return Ok(frame.clone());
    }

    let mut matched: Vec<(usize, DataFrame)> = stream::iter(0..row_count)
        .map(move |idx| {
            let row = frame.slice(idx as i64, 1);
            async move {
                match_observation(row, backend, datasets, source, idx, row_count)
                    .await
                    .map(|row| (idx, row))
            }
        })
        .buffer_unordered(workers.max(1))
        .try_collect()
        .await?;

    matched.sort_by_key(|(idx, _)| *idx);
    concat_rows(matched.into_iter().map(|(_, row)| row))
}

fn concat_rows(rows: impl Iterator<Item = DataFrame>) -> Result<DataFrame, ColocalizeError> {
    let mut combined: Option<DataFrame> = None;
    for row in rows {
        match combined.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&row)?;
            }
            None => combined = Some(row),
        }
    }
    Ok(combined.unwrap_or_else(DataFrame::empty))
}
