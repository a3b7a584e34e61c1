use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use survey_core::project::{SurveyConfig, SurveyLayout};
use survey_core::registry::KernelRegistry;
use survey_core::report::{render_kernels_csv, render_results_csv, render_summary};
use survey_core::services::{
    run_survey, LogArtifact, ReadFailure, RunMetadata, SurveyInputs, SurveyOutcome, SurveyRunner,
};

use crate::canonicalize_or_current;
use crate::commands::{
    collect_source_paths, discover_logs, parse_log_spec, resolve_config, write_artifact,
};

/// Options for the `report` command.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub root: String,
    pub config: Option<String>,
    /// Source paths overriding the configured ones.
    pub sources: Vec<String>,
    /// Explicit `SOURCE:PRECISION:PATH` log specs; disables log discovery.
    pub logs: Vec<String>,
    pub json: bool,
}

/// Persisted alongside the report: run bookkeeping plus per-file failures.
#[derive(Debug, Serialize)]
pub struct RunRecord<'a> {
    pub project: &'a str,
    #[serde(flatten)]
    pub metadata: &'a RunMetadata,
    pub inputs: &'a SurveyInputs,
    pub failure_details: &'a [ReadFailure],
}

/// `scan --json` output: the registry plus any sources that could not be read.
#[derive(Debug, Serialize)]
pub struct ScanRecord<'a> {
    pub registry: &'a KernelRegistry,
    pub failures: &'a [ReadFailure],
}

/// Paths of the artifacts written by one `report` run.
#[derive(Debug, Clone)]
pub struct WrittenArtifacts {
    pub summary: PathBuf,
    pub kernels_csv: PathBuf,
    pub results_csv: PathBuf,
    pub report_json: PathBuf,
    pub run_metadata: PathBuf,
}

/// Resolve the source list: CLI overrides first, else the config entries.
fn source_paths(
    layout: &SurveyLayout,
    config: &SurveyConfig,
    overrides: &[String],
) -> Result<Vec<PathBuf>> {
    let entries = if overrides.is_empty() { config.sources.as_slice() } else { overrides };
    collect_source_paths(layout, entries, &config.source_extensions)
}

/// Extract kernel signatures only and print the registry.
pub fn scan_command(root: &str, sources: &[String], json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let (config, layout) = resolve_config(&SurveyLayout::new(&root_path), None)?;
    let paths = source_paths(&layout, &config, sources)?;

    let runner = SurveyRunner::new(&config.markers).context("Invalid marker configuration")?;
    let (registry, failures) = runner.scan_sources(&paths);

    if json {
        let record = ScanRecord { registry: &registry, failures: &failures };
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("Kernels ({}):", registry.total_kernels());
        for entry in registry.sources() {
            println!("- {} ({})", entry.source.name, entry.kernels.len());
            for sig in &entry.kernels {
                let template = if sig.is_template { " [template]" } else { "" };
                println!("    {}({}){}", sig.name, sig.parameters, template);
            }
        }
        for collision in registry.collisions() {
            println!(
                "  merged {} into {} (same base name)",
                collision.merged.display(),
                collision.kept.display()
            );
        }
        print_failures(&failures);
    }

    Ok(())
}

/// Run the full pipeline and write every report artifact.
pub fn report_command(opts: &ReportOptions) -> Result<WrittenArtifacts> {
    let root_path = canonicalize_or_current(&opts.root)?;
    let (config, layout) =
        resolve_config(&SurveyLayout::new(&root_path), opts.config.as_deref())?;
    let sources = source_paths(&layout, &config, &opts.sources)?;

    let logs: Vec<LogArtifact> = if opts.logs.is_empty() {
        discover_logs(&layout.logs_dir, &sources, &config.precisions)
    } else {
        opts.logs
            .iter()
            .map(|spec| parse_log_spec(spec, &layout, &sources))
            .collect::<Result<_>>()?
    };

    let inputs = SurveyInputs { sources, logs };
    let outcome = run_survey(&config, &inputs).context("Failed to run kernel survey")?;
    let written = write_report_artifacts(&layout, &config, &inputs, &outcome)?;

    if opts.json {
        println!("{}", outcome.report.to_json()?);
    } else {
        print!("{}", render_summary(&outcome.report));
        print_failures(&outcome.failures);
        println!();
        println!("Artifacts:");
        println!("  Summary: {}", written.summary.display());
        println!("  Kernels CSV: {}", written.kernels_csv.display());
        println!("  Results CSV: {}", written.results_csv.display());
        println!("  Report JSON: {}", written.report_json.display());
        println!("  Run metadata: {}", written.run_metadata.display());
    }

    Ok(written)
}

/// Write the five report artifacts into the layout's reports dir.
pub fn write_report_artifacts(
    layout: &SurveyLayout,
    config: &SurveyConfig,
    inputs: &SurveyInputs,
    outcome: &SurveyOutcome,
) -> Result<WrittenArtifacts> {
    fs::create_dir_all(&layout.reports_dir).with_context(|| {
        format!("Failed to ensure reports dir {}", layout.reports_dir.display())
    })?;

    let written = WrittenArtifacts {
        summary: layout.summary_path(),
        kernels_csv: layout.kernels_csv_path(),
        results_csv: layout.results_csv_path(),
        report_json: layout.report_json_path(),
        run_metadata: layout.run_metadata_path(),
    };

    write_artifact(&written.summary, &render_summary(&outcome.report))?;
    write_artifact(&written.kernels_csv, &render_kernels_csv(&outcome.registry))?;
    write_artifact(&written.results_csv, &render_results_csv(&outcome.results))?;
    let report_json = outcome.report.to_json().context("Failed to serialize report to JSON")?;
    write_artifact(&written.report_json, &report_json)?;

    let record = RunRecord {
        project: &config.name,
        metadata: &outcome.metadata,
        inputs,
        failure_details: &outcome.failures,
    };
    let record_json =
        serde_json::to_string_pretty(&record).context("Failed to serialize run metadata")?;
    write_artifact(&written.run_metadata, &record_json)?;

    Ok(written)
}

fn print_failures(failures: &[ReadFailure]) {
    if failures.is_empty() {
        return;
    }
    println!();
    println!("Failures ({}):", failures.len());
    for failure in failures {
        println!("- [{}] {}: {}", failure.kind.as_str(), failure.path.display(), failure.message);
    }
}
