//! The main entry point: a pipeline that retrieves cyanobacteria observations,
//! colocalizes them with environmental variables and compiles the result into
//! one table.
//!
//! Every stage reads its input from and writes its output to the directory
//! layout described by [`Settings`], so stages can also be run separately.

use crate::colocalize::coverage_resolver::resolve_coverage;
use crate::colocalize::matcher::{add_env_columns, match_frame};
use crate::compile::compiler::compile_dir;
use crate::csv_store::{list_csv_files, read_csv, write_csv};
use crate::error::CyanoError;
use crate::query::backend::QueryBackend;
use crate::retrieve::retrieve_source;
use crate::types::catalog::Catalog;
use crate::types::coverage::ResolvedDataset;
use crate::types::settings::Settings;
use crate::utils::ensure_dir_exists;
use bon::bon;
use log::{info, warn};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

/// Drives the retrieval, colocalization and compile stages against one
/// [`QueryBackend`].
///
/// # Examples
///
/// ```no_run
/// use cyano_colocalize::{CmapClient, CyanoColocalizer, CyanoError, Settings};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), CyanoError> {
/// let pipeline = CyanoColocalizer::builder()
///     .backend(CmapClient::from_env()?)
///     .settings(Settings::default().with_data_dir("./data"))
///     .build();
///
/// let compiled = pipeline.run().await?;
/// println!("{}", compiled.head(Some(5)));
/// # Ok(())
/// # }
/// ```
pub struct CyanoColocalizer<B: QueryBackend> {
    backend: B,
    catalog: Catalog,
    settings: Settings,
}

#[bon]
impl<B: QueryBackend> CyanoColocalizer<B> {
    /// Creates a pipeline.
    ///
    /// * `.backend(B)`: **Required.** The query engine to read from.
    /// * `.catalog(Catalog)`: Optional. Defaults to [`Catalog::default`].
    /// * `.settings(Settings)`: Optional. Defaults to [`Settings::default`].
    #[builder]
    pub fn new(backend: B, catalog: Option<Catalog>, settings: Option<Settings>) -> Self {
        Self {
            backend,
            catalog: catalog.unwrap_or_default(),
            settings: settings.unwrap_or_default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Downloads every cyanobacteria source into `<data_dir>/<table>.csv`.
    ///
    /// Sources are processed one after the other. Returns the written paths.
    pub async fn retrieve(&self) -> Result<Vec<PathBuf>, CyanoError> {
        let data_dir = self.settings.data_dir();
        ensure_dir_exists(data_dir)
            .await
            .map_err(|e| CyanoError::DirCreation(data_dir.to_path_buf(), e))?;

        let mut written = Vec::with_capacity(self.catalog.cyano_sources.len());
        for source in &self.catalog.cyano_sources {
            let frame =
                retrieve_source(&self.backend, source, self.settings.depth_range()).await?;
            let path = data_dir.join(format!("{}.csv", source.table));
            write_csv(frame, &path).await?;
            written.push(path);
        }
        Ok(written)
    }

    /// Resolves the temporal coverage of every environmental dataset.
    pub async fn resolve_coverage(&self) -> Result<Vec<ResolvedDataset>, CyanoError> {
        Ok(resolve_coverage(&self.backend, &self.catalog.environmental).await?)
    }

    /// Colocalizes one raw observation file without writing anything.
    ///
    /// Rows are matched concurrently, at most [`Settings::workers`] at a time;
    /// the returned frame keeps the input row order.
    pub async fn colocalize_file(
        &self,
        path: &Path,
        datasets: &[ResolvedDataset],
    ) -> Result<DataFrame, CyanoError> {
        let source = path.display().to_string();
        let frame = add_env_columns(read_csv(path).await?, datasets)?;
        info!("Colocalizing {} observations from {}", frame.height(), source);
        Ok(match_frame(
            &frame,
            &self.backend,
            datasets,
            &source,
            self.settings.workers(),
        )
        .await?)
    }

    /// Colocalizes every raw CSV in the data directory.
    ///
    /// Each result is written under the colocalized directory with the same
    /// file name. Files are processed one after the other; files without rows
    /// are skipped.
    pub async fn colocalize(&self, datasets: &[ResolvedDataset]) -> Result<Vec<PathBuf>, CyanoError> {
        let output_dir = self.settings.colocalized_dir();
        ensure_dir_exists(&output_dir)
            .await
            .map_err(|e| CyanoError::DirCreation(output_dir.clone(), e))?;

        let files = list_csv_files(self.settings.data_dir()).await?;
        let mut written = Vec::with_capacity(files.len());
        for file in files {
            let Some(name) = file.file_name() else {
                continue;
            };
            let colocalized = self.colocalize_file(&file, datasets).await?;
            if colocalized.height() == 0 {
                warn!("No observations in {}, skipping", file.display());
                continue;
            }
            let path = output_dir.join(name);
            write_csv(colocalized, &path).await?;
            written.push(path);
        }
        Ok(written)
    }

    /// Compiles every colocalized file into `<data_dir>/compiled/compiled.csv`.
    pub async fn compile(&self) -> Result<DataFrame, CyanoError> {
        info!("Compiling colocalized cyano datasets");
        compile_dir(
            &self.settings.colocalized_dir(),
            &self.settings.compiled_file(),
            &self.catalog.env_variables(),
        )
        .await
    }

    /// Runs every stage in order and returns the compiled table.
    pub async fn run(&self) -> Result<DataFrame, CyanoError> {
        self.retrieve().await?;
        let datasets = self.resolve_coverage().await?;
        self.colocalize(&datasets).await?;
        self.compile().await
    }
}
