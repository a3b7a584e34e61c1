use std::path::{Path, PathBuf};

use crate::project::SurveyConfig;

/// Logical layout of a survey project on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI is responsible for creating directories and writing artifacts.
#[derive(Debug, Clone)]
pub struct SurveyLayout {
    /// Root directory of the project.
    pub root: PathBuf,
    /// Directory for internal metadata (.kernel-survey).
    pub meta_dir: PathBuf,
    /// Path to the project config file (JSON).
    pub config_path: PathBuf,
    /// Directory holding benchmark logs.
    pub logs_dir: PathBuf,
    /// Directory receiving report artifacts.
    pub reports_dir: PathBuf,
}

impl SurveyLayout {
    /// Compute the default layout for a project rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".kernel-survey");
        let config_path = meta_dir.join("survey.json");
        let logs_dir = root.join("logs");
        let reports_dir = root.join("reports");

        Self { root, meta_dir, config_path, logs_dir, reports_dir }
    }

    /// Recompute logs/reports directories from a loaded config.
    pub fn with_config(mut self, config: &SurveyConfig) -> Self {
        self.logs_dir = self.resolve(&config.logs_dir);
        self.reports_dir = self.resolve(&config.reports_dir);
        self
    }

    /// Resolve a possibly relative path against the project root.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn summary_path(&self) -> PathBuf {
        self.reports_dir.join("summary.txt")
    }

    pub fn kernels_csv_path(&self) -> PathBuf {
        self.reports_dir.join("kernels.csv")
    }

    pub fn results_csv_path(&self) -> PathBuf {
        self.reports_dir.join("best_results.csv")
    }

    pub fn report_json_path(&self) -> PathBuf {
        self.reports_dir.join("report.json")
    }

    pub fn run_metadata_path(&self) -> PathBuf {
        self.reports_dir.join("run_metadata.json")
    }
}
