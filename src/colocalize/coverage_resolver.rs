//! Resolves the temporal coverage of environmental datasets.

use crate::query::backend::QueryBackend;
use crate::query::error::QueryError;
use crate::query::query_spec::{Aggregate, QuerySpec};
use crate::types::catalog::EnvironmentalDataset;
use crate::types::coverage::{ResolvedDataset, TemporalCoverage};
use crate::types::settings::TIME;
use crate::utils::{get_opt_string, parse_timestamp};
use log::{info, warn};
use polars::prelude::DataFrame;

const START_TIME: &str = "startTime";
const END_TIME: &str = "endTime";

/// The `MIN(time)`/`MAX(time)` query issued for one dataset.
pub fn coverage_query(table: &str) -> QuerySpec {
    QuerySpec::new(table)
        .aggregate(Aggregate::Min, TIME, START_TIME)
        .aggregate(Aggregate::Max, TIME, END_TIME)
}

/// Resolves every dataset's coverage, preserving catalog order.
///
/// Climatologies are never queried: they are matched by calendar month
/// regardless of coverage. A dataset whose coverage query returns no rows (or
/// null bounds) keeps an unknown coverage, which the window builder treats as
/// "out of range".
///
/// # Errors
///
/// The first failing query aborts resolution.
pub async fn resolve_coverage<B: QueryBackend>(
    backend: &B,
    datasets: &[EnvironmentalDataset],
) -> Result<Vec<ResolvedDataset>, QueryError> {
    let mut resolved = Vec::with_capacity(datasets.len());
    for dataset in datasets {
        let coverage = if dataset.is_climatology {
            TemporalCoverage::default()
        } else {
            let frame = backend.query(&coverage_query(&dataset.table)).await?;
            let coverage = coverage_from_frame(&frame);
            if coverage.is_known() {
                info!(
                    "{} covers {:?} .. {:?}",
                    dataset.table, coverage.start, coverage.end
                );
            } else {
                warn!(
                    "No temporal coverage reported for {}, observations will be matched by month",
                    dataset.table
                );
            }
            coverage
        };
        resolved.push(ResolvedDataset::new(dataset.clone(), coverage));
    }
    Ok(resolved)
}

fn coverage_from_frame(frame: &DataFrame) -> TemporalCoverage {
    if frame.height() == 0 {
        return TemporalCoverage::default();
    }
    let bound = |name: &str| {
        frame
            .column(name)
            .ok()
            .and_then(|c| get_opt_string(c, 0))
            .and_then(|s| parse_timestamp(&s))
    };
    TemporalCoverage {
        start: bound(START_TIME),
        end: bound(END_TIME),
    }
}
