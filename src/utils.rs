use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::info;
use polars::prelude::{AnyValue, Column};
use std::io;
use std::path::Path;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses timestamps as returned by CMAP (`2016-04-20T00:00:00.000Z`) or as
/// written to CSV (`2016-04-20 00:00:00`, `2016-04-20`).
///
/// The trailing `Z` marker and any sub-second part are dropped; the result is
/// a naive UTC timestamp.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_matches('"');
    let trimmed = trimmed.strip_suffix('Z').unwrap_or(trimmed);
    let trimmed = match trimmed.split_once('.') {
        Some((head, _)) => head,
        None => trimmed,
    };

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

pub(crate) fn get_opt_float(column: &Column, idx: usize) -> Option<f64> {
    column.get(idx).ok().and_then(|v| v.extract::<f64>())
}

pub(crate) fn get_opt_string(column: &Column, idx: usize) -> Option<String> {
    match column.get(idx).ok()? {
        AnyValue::Null => None,
        AnyValue::String(s) => Some(s.to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        other => Some(other.to_string()),
    }
}

/// File name without directory and extension: `data/tblSeaFlow.csv` -> `tblSeaFlow`.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub async fn ensure_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}
