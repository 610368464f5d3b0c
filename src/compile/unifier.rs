//! Brings one colocalized table onto the canonical schema.
//!
//! Canonical layout:
//!
//! ```text
//! time | lat | lon | depth | table | cruise | <PROCHLOROCOCCUS> | <SYNECHOCOCCUS> | <PICOEUKARYOTE> | env_var_1 | ... | env_var_n
//! ```
//!
//! Abundances are normalised to cells/mL.

use crate::compile::error::UnifyError;
use crate::types::settings::{
    CRUISE, DEPTH, LAT, LON, PICOEUKARYOTE, PROCHLOROCOCCUS, SYNECHOCOCCUS, TABLE, TIME,
};
use log::error;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;

const ABUNDANCE_COLUMNS: [&str; 3] = [PROCHLOROCOCCUS, SYNECHOCOCCUS, PICOEUKARYOTE];
const STRING_COLUMNS: [&str; 3] = [TIME, TABLE, CRUISE];

/// Unit factor bringing a source's abundances to cells/mL.
///
/// SeaFlow reports cells/uL, every other source cells/mL. Depends only on the
/// table name.
///
/// ```
/// use cyano_colocalize::scale_factor;
///
/// assert_eq!(scale_factor("tblSeaFlow"), 1000.0);
/// assert_eq!(scale_factor("tblFlombaum"), 1.0);
/// ```
pub fn scale_factor(table: &str) -> f64 {
    if table.to_lowercase().contains("seaflow") {
        1000.0
    } else {
        1.0
    }
}

/// The canonical label for an abundance column name, if it is one.
pub fn canonical_abundance_label(column: &str) -> Option<&'static str> {
    let lower = column.to_lowercase();
    if !lower.contains("abun") {
        return None;
    }
    if lower.contains("pro") {
        Some(PROCHLOROCOCCUS)
    } else if lower.contains("syn") {
        Some(SYNECHOCOCCUS)
    } else if lower.contains("pico") {
        Some(PICOEUKARYOTE)
    } else {
        None
    }
}

/// The canonical column list for a given set of environmental variables.
pub fn canonical_columns(env_variables: &[&str]) -> Vec<String> {
    [TIME, LAT, LON, DEPTH, TABLE, CRUISE]
        .iter()
        .chain(ABUNDANCE_COLUMNS.iter())
        .chain(env_variables.iter())
        .map(|c| c.to_string())
        .collect()
}

fn column_names(frame: &DataFrame) -> Vec<String> {
    frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// The frame's column names with every abundance column replaced by its
/// canonical label. Two source columns may map onto the same label.
pub fn renamed_column_names(frame: &DataFrame) -> Vec<String> {
    column_names(frame)
        .into_iter()
        .map(|name| {
            canonical_abundance_label(&name)
                .map(str::to_string)
                .unwrap_or(name)
        })
        .collect()
}

fn has_duplicates(names: &[String]) -> bool {
    let mut seen = HashSet::with_capacity(names.len());
    !names.iter().all(|name| seen.insert(name.as_str()))
}

fn schema_mismatch(file: &Path, found: Vec<String>, expected: Vec<String>) -> UnifyError {
    error!("Invalid columns in {}: {:?}", file.display(), found);
    UnifyError::SchemaMismatch {
        file: file.to_path_buf(),
        found,
        expected,
    }
}

fn insert_if_absent(frame: &mut DataFrame, index: usize, column: Column) -> PolarsResult<()> {
    if frame.column(column.name()).is_err() {
        frame.insert_column(index, column)?;
    }
    Ok(())
}

/// Unifies one colocalized frame.
///
/// `table` is the source table name (the colocalized file's stem); `file` is
/// only used for diagnostics.
///
/// # Errors
///
/// * [`UnifyError::SchemaMismatch`] if two columns map onto the same
///   abundance label, or if after renaming and inserting the standard columns
///   the column list is not exactly the canonical one.
/// * [`UnifyError::DataFrameProcessing`] if a numeric column holds a value
///   that is not a number.
pub fn unify(
    mut frame: DataFrame,
    table: &str,
    file: &Path,
    env_variables: &[&str],
) -> Result<DataFrame, UnifyError> {
    let height = frame.height();
    let expected = canonical_columns(env_variables);

    let renamed = renamed_column_names(&frame);
    if has_duplicates(&renamed) {
        return Err(schema_mismatch(file, renamed, expected));
    }
    frame.set_column_names(renamed.iter().map(String::as_str))?;

    insert_if_absent(&mut frame, 3, Column::new(DEPTH.into(), vec![0.0f64; height]))?;
    insert_if_absent(&mut frame, 4, Column::new(TABLE.into(), vec![table; height]))?;
    insert_if_absent(
        &mut frame,
        5,
        Column::full_null(CRUISE.into(), height, &DataType::String),
    )?;
    for (offset, label) in ABUNDANCE_COLUMNS.iter().enumerate() {
        insert_if_absent(
            &mut frame,
            6 + offset,
            Column::full_null((*label).into(), height, &DataType::Float64),
        )?;
    }

    let found = column_names(&frame);
    if found != expected {
        return Err(schema_mismatch(file, found, expected));
    }

    let factor = scale_factor(table);
    let exprs: Vec<Expr> = expected
        .iter()
        .map(|name| {
            let column = col(name.as_str());
            if STRING_COLUMNS.contains(&name.as_str()) {
                column.cast(DataType::String)
            } else if ABUNDANCE_COLUMNS.contains(&name.as_str()) {
                (column.strict_cast(DataType::Float64) * lit(factor)).alias(name.as_str())
            } else {
                column.strict_cast(DataType::Float64)
            }
        })
        .collect();

    Ok(frame.lazy().select(exprs).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{get_opt_float, get_opt_string};
    use std::path::PathBuf;

    const ENV: [&str; 2] = ["sst", "NO3"];

    fn file(table: &str) -> PathBuf {
        PathBuf::from(format!("data/colocalized/{}.csv", table))
    }

    fn seaflow() -> DataFrame {
        df!(
            "time" => ["2016-04-20T00:00:00.000Z", "2016-04-20T00:03:00.000Z"],
            "lat" => [21.5, 21.6],
            "lon" => [-158.0, -158.1],
            "cruise" => ["KOK1606", "KOK1606"],
            "abundance_prochloro" => [Some(150.0), None],
            "abundance_synecho" => [1.5, 2.0],
            "abundance_picoeuk" => [0.5, 0.25],
            "sst" => [Some(25.1), None],
            "NO3" => [None::<f64>, None]
        )
        .unwrap()
    }

    #[test]
    fn test_abundance_labels() {
        assert_eq!(
            canonical_abundance_label("prochlorococcus_abundance_P701A90Z_Tarran"),
            Some(PROCHLOROCOCCUS)
        );
        assert_eq!(canonical_abundance_label("abundance_synecho"), Some(SYNECHOCOCCUS));
        assert_eq!(
            canonical_abundance_label("picoeukaryotic_abundance_PYEUA00A_Zubkov"),
            Some(PICOEUKARYOTE)
        );
        assert_eq!(canonical_abundance_label("Abundance_PICOEUK"), Some(PICOEUKARYOTE));
        assert_eq!(canonical_abundance_label("cruise"), None);
        assert_eq!(canonical_abundance_label("prochlorococcus_biomass"), None);
    }

    #[test]
    fn test_scale_factor_depends_only_on_name() {
        assert_eq!(scale_factor("tblSeaFlow"), 1000.0);
        assert_eq!(scale_factor("tblSeaFlow_v1_5"), 1000.0);
        assert_eq!(scale_factor("SEAFLOW"), 1000.0);
        assert_eq!(scale_factor("tblJC039_AMT19_flow_cytometry"), 1.0);
        assert_eq!(scale_factor("tblSeaFlow"), scale_factor("tblSeaFlow"));
    }

    #[test]
    fn test_unify_seaflow_scales_and_inserts_depth_and_table() {
        let unified = unify(seaflow(), "tblSeaFlow", &file("tblSeaFlow"), &ENV).unwrap();

        assert_eq!(column_names(&unified), canonical_columns(&ENV));
        assert_eq!(
            get_opt_float(unified.column(PROCHLOROCOCCUS).unwrap(), 0),
            Some(150_000.0)
        );
        assert_eq!(get_opt_float(unified.column(PROCHLOROCOCCUS).unwrap(), 1), None);
        assert_eq!(
            get_opt_float(unified.column(SYNECHOCOCCUS).unwrap(), 1),
            Some(2000.0)
        );
        assert_eq!(get_opt_float(unified.column(DEPTH).unwrap(), 0), Some(0.0));
        assert_eq!(
            get_opt_string(unified.column(TABLE).unwrap(), 1),
            Some("tblSeaFlow".to_string())
        );
        assert_eq!(get_opt_float(unified.column("sst").unwrap(), 0), Some(25.1));
    }

    #[test]
    fn test_unify_other_source_keeps_units() {
        let mut frame = seaflow();
        frame.drop_in_place("cruise").unwrap();
        let unified = unify(frame, "tblFlombaum", &file("tblFlombaum"), &ENV).unwrap();
        assert_eq!(
            get_opt_float(unified.column(PROCHLOROCOCCUS).unwrap(), 0),
            Some(150.0)
        );
    }

    #[test]
    fn test_unify_inserts_missing_cruise() {
        let frame = df!(
            "time" => ["2004-05-01"],
            "lat" => [10.0],
            "lon" => [-30.0],
            "depth" => [2.0],
            "prochlorococcus_abundance_P701A90Z_Zubkov" => [100.0],
            "synechococcus_abundance_P700A90Z_Zubkov" => [10.0],
            "sst" => [20.0],
            "NO3" => [0.1]
        )
        .unwrap();
        let table = "tblD284_AMT15_Flow_Cytometry";
        let unified = unify(frame, table, &file(table), &ENV).unwrap();

        let names = column_names(&unified);
        assert_eq!(names, canonical_columns(&ENV));
        assert_eq!(names[5], CRUISE);
        assert_eq!(unified.column(CRUISE).unwrap().null_count(), 1);
        assert_eq!(unified.column(PICOEUKARYOTE).unwrap().null_count(), 1);
        assert_eq!(get_opt_float(unified.column(DEPTH).unwrap(), 0), Some(2.0));
        assert_eq!(unified.column(DEPTH).unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_unify_rejects_unexpected_columns() {
        let mut frame = seaflow();
        frame
            .with_column(Column::new("salinity".into(), &[1.0, 2.0]))
            .unwrap();
        let err = unify(frame, "tblSeaFlow", &file("tblSeaFlow"), &ENV).unwrap_err();
        match err {
            UnifyError::SchemaMismatch { found, expected, .. } => {
                assert!(found.contains(&"salinity".to_string()));
                assert_eq!(expected, canonical_columns(&ENV));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unify_rejects_non_numeric_env_value() {
        let mut frame = seaflow();
        frame
            .with_column(Column::new("sst".into(), &["25.1", "warm"]))
            .unwrap();
        let result = unify(frame, "tblSeaFlow", &file("tblSeaFlow"), &ENV);
        assert!(matches!(result, Err(UnifyError::DataFrameProcessing(_))));
    }

    #[test]
    fn test_unify_rejects_non_numeric_abundance() {
        let mut frame = seaflow();
        frame
            .with_column(Column::new("abundance_synecho".into(), &["1.5", "n/a"]))
            .unwrap();
        let result = unify(frame, "tblSeaFlow", &file("tblSeaFlow"), &ENV);
        assert!(matches!(result, Err(UnifyError::DataFrameProcessing(_))));
    }

    #[test]
    fn test_unify_accepts_numeric_strings_and_nulls() {
        let mut frame = seaflow();
        frame
            .with_column(Column::new("sst".into(), &[Some("25.1"), None]))
            .unwrap();
        let unified = unify(frame, "tblSeaFlow", &file("tblSeaFlow"), &ENV).unwrap();
        let sst = unified.column("sst").unwrap();
        assert_eq!(get_opt_float(sst, 0), Some(25.1));
        assert_eq!(sst.null_count(), 1);
    }

    #[test]
    fn test_unify_rejects_two_columns_with_same_abundance_label() {
        let frame = df!(
            "time" => ["2004-05-01"],
            "lat" => [10.0],
            "lon" => [-30.0],
            "pro_abundance_a" => [100.0],
            "pro_abundance_b" => [110.0],
            "sst" => [20.0],
            "NO3" => [0.1]
        )
        .unwrap();
        let err = unify(frame, "tblDup", &file("tblDup"), &ENV).unwrap_err();
        match err {
            UnifyError::SchemaMismatch { found, expected, .. } => {
                let labels = found.iter().filter(|c| c.as_str() == PROCHLOROCOCCUS).count();
                assert_eq!(labels, 2);
                assert_eq!(expected, canonical_columns(&ENV));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unify_rejects_reordered_env_columns() {
        let frame = seaflow()
            .select([
                "time",
                "lat",
                "lon",
                "cruise",
                "abundance_prochloro",
                "abundance_synecho",
                "abundance_picoeuk",
                "NO3",
                "sst",
            ])
            .unwrap();
        let result = unify(frame, "tblSeaFlow", &file("tblSeaFlow"), &ENV);
        assert!(matches!(result, Err(UnifyError::SchemaMismatch { .. })));
    }
}
