//! Builds the aggregation query that matches one observation against one
//! environmental dataset.
//!
//! The window is a 4D box centered on the observation and sized by the
//! dataset's [`Tolerances`](crate::Tolerances):
//!
//! * time: `time ± time_days`, or `month = <observation month>` when the
//!   dataset is a climatology or the observation lies outside the dataset's
//!   known coverage,
//! * latitude and longitude: always `± lat_deg` / `± lon_deg`,
//! * depth: `± depth_m`, only for datasets with a depth dimension.
//!
//! Every variable is averaged over the box into a single row.

use crate::colocalize::error::ColocalizeError;
use crate::query::query_spec::{Aggregate, Literal, Predicate, QuerySpec};
use crate::types::coverage::ResolvedDataset;
use crate::types::observation::Observation;
use crate::types::settings::{DEPTH, LAT, LON, MONTH, TIME};
use chrono::{Datelike, NaiveDateTime, TimeDelta};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Whether the observation can be matched on absolute time.
///
/// Always true for climatologies. Otherwise the observation time must lie in
/// the dataset's coverage, bounds included; an unknown coverage counts as out
/// of range.
pub fn in_time_range(observation: &Observation, dataset: &ResolvedDataset) -> bool {
    dataset.is_climatology() || dataset.coverage.contains(observation.time)
}

/// Whether the window falls back to calendar-month matching.
pub fn uses_month_fallback(observation: &Observation, dataset: &ResolvedDataset) -> bool {
    dataset.is_climatology() || !in_time_range(observation, dataset)
}

/// Shifts `time` by a (possibly fractional) number of days.
///
/// `None` if `days` is not finite or the result is not a representable timestamp.
pub fn shift_days(time: NaiveDateTime, days: f64) -> Option<NaiveDateTime> {
    let millis = (days * MILLIS_PER_DAY).round();
    if !millis.is_finite() {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64).and_then(|delta| time.checked_add_signed(delta))
}

/// Builds the window query for `observation` against `dataset`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use cyano_colocalize::{
///     build_window, render_sql, EnvironmentalDataset, Observation, ResolvedDataset,
///     TemporalCoverage, Tolerances,
/// };
///
/// let woa = EnvironmentalDataset::new(
///     "tblWOA_Climatology",
///     &["oxygen_WOA_clim"],
///     Tolerances::new(1.0, 0.75, 0.75, 5.0),
///     true,
///     true,
/// );
/// let dataset = ResolvedDataset::new(woa, TemporalCoverage::default());
/// let time = NaiveDate::from_ymd_opt(2016, 4, 20).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let spec = build_window(&Observation::new(time, 21.0, -158.0, 5.0), &dataset).unwrap();
///
/// assert_eq!(
///     render_sql(&spec),
///     "SELECT AVG([oxygen_WOA_clim]) AS [oxygen_WOA_clim] FROM tblWOA_Climatology \
///      WHERE [month] = 4 AND [lat] BETWEEN 20.25 AND 21.75 \
///      AND [lon] BETWEEN -158.75 AND -157.25 AND [depth] BETWEEN 0 AND 10"
/// );
/// ```
///
/// # Errors
///
/// [`ColocalizeError::TimeWindowOutOfRange`] if the time tolerance shifts the
/// observation time past the representable range.
pub fn build_window(
    observation: &Observation,
    dataset: &ResolvedDataset,
) -> Result<QuerySpec, ColocalizeError> {
    let tolerances = dataset.tolerances();

    let mut spec = dataset
        .variables()
        .iter()
        .fold(QuerySpec::new(dataset.table()), |spec, variable| {
            spec.aggregate(Aggregate::Avg, variable, variable)
        });

    spec = if uses_month_fallback(observation, dataset) {
        spec.filter(Predicate::equals(
            MONTH,
            Literal::Integer(i64::from(observation.time.month())),
        ))
    } else {
        let shifted = |days: f64| {
            shift_days(observation.time, days).ok_or_else(|| {
                ColocalizeError::TimeWindowOutOfRange {
                    table: dataset.table().to_string(),
                    time: observation.time,
                    days: tolerances.time_days,
                }
            })
        };
        spec.filter(Predicate::between(
            TIME,
            Literal::Timestamp(shifted(-tolerances.time_days)?),
            Literal::Timestamp(shifted(tolerances.time_days)?),
        ))
    };

    spec = spec
        .filter(around(LAT, observation.lat, tolerances.lat_deg))
        .filter(around(LON, observation.lon, tolerances.lon_deg));

    if dataset.has_depth() {
        spec = spec.filter(around(DEPTH, observation.depth, tolerances.depth_m));
    }
    Ok(spec)
}

fn around(column: &str, center: f64, half_width: f64) -> Predicate {
    Predicate::between(
        column,
        Literal::Number(center - half_width),
        Literal::Number(center + half_width),
    )
}
