//! Run-wide settings: directory layout, retrieval depth bounds, canonical
//! column labels and the width of the colocalization worker pool.

use std::path::{Path, PathBuf};

/// Canonical label for prochlorococcus abundance.
pub const PROCHLOROCOCCUS: &str = "prochlorococcus_abundance";
/// Canonical label for synechococcus abundance.
pub const SYNECHOCOCCUS: &str = "synechococcus_abundance";
/// Canonical label for picoeukaryote abundance.
pub const PICOEUKARYOTE: &str = "picoeukaryote_abundance";

pub const TIME: &str = "time";
pub const LAT: &str = "lat";
pub const LON: &str = "lon";
pub const DEPTH: &str = "depth";
pub const MONTH: &str = "month";
pub const TABLE: &str = "table";
pub const CRUISE: &str = "cruise";

const DEFAULT_DATA_DIR: &str = "./data";
const COLOCALIZED_DIR_NAME: &str = "colocalized";
const COMPILED_DIR_NAME: &str = "compiled";
const COMPILED_FILE_NAME: &str = "compiled.csv";

/// Settings shared by every stage of a run.
///
/// ```
/// use cyano_colocalize::Settings;
///
/// let settings = Settings::default().with_data_dir("/tmp/cyano").with_workers(4);
/// assert!(settings.colocalized_dir().ends_with("colocalized"));
/// assert_eq!(settings.workers(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    data_dir: PathBuf,
    depth_range: (f64, f64),
    workers: usize,
}

impl Settings {
    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    /// Vertical bounds (meters, inclusive) applied when retrieving observations.
    pub fn with_depth_range(mut self, min_depth: f64, max_depth: f64) -> Self {
        self.depth_range = (min_depth, max_depth);
        self
    }

    /// Number of observations colocalized concurrently. Clamped to at least 1.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Where raw observation files are stored.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where colocalized files are stored.
    pub fn colocalized_dir(&self) -> PathBuf {
        self.data_dir.join(COLOCALIZED_DIR_NAME)
    }

    pub fn compiled_dir(&self) -> PathBuf {
        self.data_dir.join(COMPILED_DIR_NAME)
    }

    pub fn compiled_file(&self) -> PathBuf {
        self.compiled_dir().join(COMPILED_FILE_NAME)
    }

    pub fn depth_range(&self) -> (f64, f64) {
        self.depth_range
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            depth_range: (0.0, 5.0),
            workers: default_workers(),
        }
    }
}

/// Same sizing rule as a default thread-pool executor: `min(32, cpus + 4)`.
fn default_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus + 4).min(32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_layout() {
        let settings = Settings::default().with_data_dir("/tmp/run");
        assert_eq!(settings.data_dir(), Path::new("/tmp/run"));
        assert_eq!(settings.colocalized_dir(), PathBuf::from("/tmp/run/colocalized"));
        assert_eq!(
            settings.compiled_file(),
            PathBuf::from("/tmp/run/compiled/compiled.csv")
        );
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.depth_range(), (0.0, 5.0));
        assert!(settings.workers() >= 5 && settings.workers() <= 32);
        assert_eq!(Settings::default().with_workers(0).workers(), 1);
    }
}
