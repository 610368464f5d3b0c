use crate::compile::unifier::unify;
use crate::csv_store::{list_csv_files, read_csv, write_csv};
use crate::error::CyanoError;
use crate::utils::{ensure_dir_exists, file_stem};
use log::info;
use polars::prelude::DataFrame;
use std::path::Path;

/// Unifies every colocalized CSV in `colocalized_dir` and stacks them, in
/// file-name order, into `output_file`.
///
/// Files are processed one at a time. Returns the compiled frame.
pub async fn compile_dir(
    colocalized_dir: &Path,
    output_file: &Path,
    env_variables: &[&str],
) -> Result<DataFrame, CyanoError> {
    let files = list_csv_files(colocalized_dir).await?;
    if let Some(parent) = output_file.parent() {
        ensure_dir_exists(parent)
            .await
            .map_err(|e| CyanoError::DirCreation(parent.to_path_buf(), e))?;
    }

    let mut compiled: Option<DataFrame> = None;
    for file in &files {
        info!("Compiling {}", file.display());
        let frame = read_csv(file).await?;
        let unified = unify(frame, &file_stem(file), file, env_variables)?;
        match compiled.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&unified)?;
            }
            None => compiled = Some(unified),
        }
    }

    let compiled = compiled.unwrap_or_else(DataFrame::empty);
    info!(
        "Compiled {} rows from {} files",
        compiled.height(),
        files.len()
    );
    write_csv(compiled.clone(), output_file).await?;
    Ok(compiled)
}
