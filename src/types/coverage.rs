//! Temporal coverage of environmental datasets and the resolved dataset
//! value handed to the matcher.

use crate::types::catalog::{EnvironmentalDataset, Tolerances};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The `[start, end]` span of a dataset's `time` column, as reported by the backend.
///
/// Either bound is `None` when the backend could not report it (empty table,
/// null aggregate).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalCoverage {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TemporalCoverage {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_known(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Inclusive containment check. An unknown coverage contains nothing.
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= time && time <= end,
            _ => false,
        }
    }
}

/// An [`EnvironmentalDataset`] together with its resolved [`TemporalCoverage`].
///
/// Built once per run by the coverage resolver and shared read-only by every
/// colocalization task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDataset {
    pub dataset: EnvironmentalDataset,
    pub coverage: TemporalCoverage,
}

impl ResolvedDataset {
    pub fn new(dataset: EnvironmentalDataset, coverage: TemporalCoverage) -> Self {
        Self { dataset, coverage }
    }

    pub fn table(&self) -> &str {
        &self.dataset.table
    }

    pub fn variables(&self) -> &[String] {
        &self.dataset.variables
    }

    pub fn tolerances(&self) -> Tolerances {
        self.dataset.tolerances
    }

    pub fn has_depth(&self) -> bool {
        self.dataset.has_depth
    }

    pub fn is_climatology(&self) -> bool {
        self.dataset.is_climatology
    }
}
