use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extract::{LogScanner, SignatureScanner};
use crate::model::{BestResult, Precision, SourceFile};
use crate::project::{ConfigError, MarkerConfig, SurveyConfig};
use crate::registry::KernelRegistry;
use crate::report::Report;
use crate::services::attribution::repair;

/// A benchmark log produced for one source under one precision variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogArtifact {
    /// Base name of the originating source file.
    pub source_name: String,
    pub precision: Precision,
    pub path: PathBuf,
}

/// Everything the orchestration layer hands to the core for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyInputs {
    pub sources: Vec<PathBuf>,
    pub logs: Vec<LogArtifact>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Source,
    Log,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Source => "source",
            FileKind::Log => "log",
        }
    }
}

#[derive(Debug, Error)]
pub enum SurveyError {
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A file that could not be read. Recorded per file; never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadFailure {
    pub kind: FileKind,
    pub path: PathBuf,
    pub message: String,
}

impl ReadFailure {
    pub fn new(kind: FileKind, path: &Path, err: &io::Error) -> Self {
        ReadFailure {
            kind,
            path: path.to_path_buf(),
            message: format!("Failed to read {} file {}: {err}", kind.as_str(), path.display()),
        }
    }
}

/// Bookkeeping persisted next to the report artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub config_hash: String,
    pub started_at: String,
    pub finished_at: String,
    pub scripts_analyzed: usize,
    pub kernels_detected: usize,
    pub best_results: usize,
    pub unattributed: usize,
    pub name_collisions: usize,
    pub failures: usize,
}

#[derive(Debug, Clone)]
pub struct SurveyOutcome {
    pub registry: KernelRegistry,
    /// Resolved results in production order.
    pub results: Vec<BestResult>,
    pub report: Report,
    pub failures: Vec<ReadFailure>,
    pub metadata: RunMetadata,
}

/// Drives both scanners over the inputs of one run.
pub struct SurveyRunner {
    signatures: SignatureScanner,
    logs: LogScanner,
}

impl SurveyRunner {
    pub fn new(markers: &MarkerConfig) -> Result<Self, ConfigError> {
        Ok(Self { signatures: SignatureScanner::new(markers)?, logs: LogScanner::new(markers)? })
    }

    /// Scan sources in list order and register after each file, so the
    /// first-wins outcome only depends on the list order.
    pub fn scan_sources(&self, paths: &[PathBuf]) -> (KernelRegistry, Vec<ReadFailure>) {
        let mut registry = KernelRegistry::new();
        let mut failures = Vec::new();
        for path in paths {
            let source = SourceFile::new(path);
            match read_text(path) {
                Ok(text) => {
                    registry.add_source(&source);
                    registry.register(self.signatures.extract(&text, &source));
                }
                Err(err) => {
                    warn!(source = %path.display(), error = %err, "skipping unreadable source");
                    failures.push(ReadFailure::new(FileKind::Source, path, &err));
                }
            }
        }
        (registry, failures)
    }

    /// Scan logs in list order. A log that does not exist contributes nothing.
    pub fn collect_results(&self, logs: &[LogArtifact]) -> (Vec<BestResult>, Vec<ReadFailure>) {
        let mut results = Vec::new();
        let mut failures = Vec::new();
        for log in logs {
            match read_text(&log.path) {
                Ok(text) => results.extend(self.logs.extract(
                    &text,
                    &log.source_name,
                    log.precision,
                    &log.path,
                )),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    debug!(log = %log.path.display(), "log artifact missing; no results");
                }
                Err(err) => {
                    warn!(log = %log.path.display(), error = %err, "skipping unreadable log");
                    failures.push(ReadFailure::new(FileKind::Log, &log.path, &err));
                }
            }
        }
        (results, failures)
    }

    /// Full pipeline: scan, extract, repair, then build the report.
    pub fn run(&self, config_hash: &str, inputs: &SurveyInputs) -> SurveyOutcome {
        let started_at = Utc::now().to_rfc3339();

        let (registry, mut failures) = self.scan_sources(&inputs.sources);
        let (raw, log_failures) = self.collect_results(&inputs.logs);
        failures.extend(log_failures);

        let results = repair(raw, &registry);
        let report = Report::build(&registry, &results);

        let totals = report.totals;
        info!(
            scripts = totals.scripts_analyzed,
            kernels = totals.kernels_detected,
            results = totals.best_results,
            unattributed = totals.unattributed,
            name_collisions = totals.name_collisions,
            failures = failures.len(),
            "survey complete"
        );

        let metadata = RunMetadata {
            config_hash: config_hash.to_string(),
            started_at,
            finished_at: Utc::now().to_rfc3339(),
            scripts_analyzed: totals.scripts_analyzed,
            kernels_detected: totals.kernels_detected,
            best_results: totals.best_results,
            unattributed: totals.unattributed,
            name_collisions: totals.name_collisions,
            failures: failures.len(),
        };

        SurveyOutcome { registry, results, report, failures, metadata }
    }
}

/// Run a survey with the markers and fingerprint of `config`.
pub fn run_survey(
    config: &SurveyConfig,
    inputs: &SurveyInputs,
) -> Result<SurveyOutcome, SurveyError> {
    let runner = SurveyRunner::new(&config.markers)?;
    let hash = config.fingerprint()?;
    Ok(runner.run(&hash, inputs))
}

fn read_text(path: &Path) -> io::Result<String> {
    std::fs::read(path).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
