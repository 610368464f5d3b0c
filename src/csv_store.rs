//! CSV persistence of raw, colocalized and compiled tables.

use crate::error::CyanoError;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::task;

/// Reads a CSV file with header, inferring dtypes from every row.
///
/// A zero-byte file, as written for a source without observations, reads as an
/// empty frame.
pub async fn read_csv(path: &Path) -> Result<DataFrame, CyanoError> {
    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || -> Result<DataFrame, CyanoError> {
        let is_empty = std::fs::metadata(&path_buf)
            .map(|m| m.len() == 0)
            .unwrap_or(false);
        if is_empty {
            return Ok(DataFrame::empty());
        }
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path_buf.clone()))
            .and_then(|reader| reader.finish())
            .map_err(|e| CyanoError::CsvRead(path_buf, e))
    })
    .await?
}

/// Writes `df` as CSV with header, replacing any existing file.
///
/// A frame without columns is written as a zero-byte file.
pub async fn write_csv(mut df: DataFrame, path: &Path) -> Result<(), CyanoError> {
    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || -> Result<(), CyanoError> {
        let mut file = std::fs::File::create(&path_buf)
            .map_err(|e| CyanoError::CsvWriteIo(path_buf.clone(), e))?;
        if df.width() == 0 {
            info!("Wrote empty file {}", path_buf.display());
            return Ok(());
        }
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| CyanoError::CsvWrite(path_buf.clone(), e))?;
        info!("Wrote {} rows to {}", df.height(), path_buf.display());
        Ok(())
    })
    .await??;
    Ok(())
}

/// The `*.csv` files directly inside `dir`, sorted by file name.
pub async fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, CyanoError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| CyanoError::DirRead(dir.to_path_buf(), e))?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| CyanoError::DirRead(dir.to_path_buf(), e))?
    {
        let path = entry.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_then_read_keeps_nulls_and_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tblX.csv");
        let df = df!(
            "time" => ["2016-04-20T00:00:00.000Z", "2016-04-21T00:00:00.000Z"],
            "lat" => [1.5, 2.5],
            "sst" => [None, Some(20.0)]
        )
        .unwrap();
        write_csv(df, &path).await.unwrap();

        let back = read_csv(&path).await.unwrap();
        assert_eq!(back.shape(), (2, 3));
        assert_eq!(back.column("sst").unwrap().null_count(), 1);
        let names: Vec<String> = back.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["time", "lat", "sst"]);
    }

    #[tokio::test]
    async fn test_frame_without_columns_reads_back_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tblEmpty.csv");
        write_csv(DataFrame::empty(), &path).await.unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        let back = read_csv(&path).await.unwrap();
        assert_eq!(back.shape(), (0, 0));
    }

    #[tokio::test]
    async fn test_list_csv_files_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.csv", "notes.txt"] {
            std::fs::write(tmp.path().join(name), "x\n1\n").unwrap();
        }
        std::fs::create_dir(tmp.path().join("colocalized")).unwrap();

        let files = list_csv_files(tmp.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let result = read_csv(Path::new("/nonexistent/tbl.csv")).await;
        assert!(matches!(result, Err(CyanoError::CsvRead(..))));
    }
}
