use crate::colocalize::error::ColocalizeError;
use crate::types::settings::{DEPTH, LAT, LON, TIME};
use crate::utils::{get_opt_float, get_opt_string, parse_timestamp};
use chrono::NaiveDateTime;
use polars::prelude::DataFrame;

/// One cyanobacteria observation: the space-time point a colocalization window is centered on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub time: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
    /// Meters. `0.0` when the source has no depth dimension.
    pub depth: f64,
}

impl Observation {
    pub fn new(time: NaiveDateTime, lat: f64, lon: f64, depth: f64) -> Self {
        Self {
            time,
            lat,
            lon,
            depth,
        }
    }

    /// Reads the observation stored at `idx` of an observation frame.
    ///
    /// `row` is only used to label errors. A missing `depth` column or a null
    /// depth value yields `0.0`.
    ///
    /// # Errors
    ///
    /// [`ColocalizeError::MalformedObservation`] when `time`, `lat` or `lon`
    /// is missing, null or unparseable.
    pub fn from_frame(frame: &DataFrame, idx: usize, row: usize) -> Result<Self, ColocalizeError> {
        let malformed = |column: &str, reason: &str| ColocalizeError::MalformedObservation {
            row,
            column: column.to_string(),
            reason: reason.to_string(),
        };

        let raw_time = frame
            .column(TIME)
            .map_err(|_| malformed(TIME, "is missing"))?;
        let time = get_opt_string(raw_time, idx)
            .ok_or_else(|| malformed(TIME, "is null"))
            .and_then(|s| parse_timestamp(&s).ok_or_else(|| malformed(TIME, "is not a timestamp")))?;

        let lat = frame
            .column(LAT)
            .map_err(|_| malformed(LAT, "is missing"))
            .and_then(|c| get_opt_float(c, idx).ok_or_else(|| malformed(LAT, "is not a number")))?;
        let lon = frame
            .column(LON)
            .map_err(|_| malformed(LON, "is missing"))
            .and_then(|c| get_opt_float(c, idx).ok_or_else(|| malformed(LON, "is not a number")))?;
        let depth = frame
            .column(DEPTH)
            .ok()
            .and_then(|c| get_opt_float(c, idx))
            .unwrap_or(0.0);

        Ok(Self::new(time, lat, lon, depth))
    }
}
