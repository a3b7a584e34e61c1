use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use survey_core::model::{Precision, SourceFile};
use survey_core::project::{load_survey_config, SurveyConfig, SurveyLayout};
use survey_core::services::LogArtifact;
use tracing::{debug, warn};

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Pick the config for a run: explicit file, then project config, then defaults.
///
/// Returns the config plus the layout adjusted to its logs/reports dirs.
pub fn resolve_config(
    layout: &SurveyLayout,
    config_file: Option<&str>,
) -> Result<(SurveyConfig, SurveyLayout)> {
    let config = if let Some(file) = config_file {
        let path = layout.resolve(file);
        SurveyConfig::from_file(&path)
            .with_context(|| format!("Failed to load survey config at {}", path.display()))?
    } else if layout.config_path.is_file() {
        load_survey_config(layout)?
    } else {
        debug!(root = %layout.root.display(), "no project config; using defaults");
        SurveyConfig::new(crate::infer_project_name(&layout.root))
    };
    let resolved = layout.clone().with_config(&config);
    Ok((config, resolved))
}

/// Expand configured source entries into an ordered file list.
///
/// Directories contribute their files with a matching extension, sorted by
/// name. Plain paths are kept even if missing so the read failure surfaces
/// in the run's failure list.
pub fn collect_source_paths(
    layout: &SurveyLayout,
    entries: &[String],
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let mut out: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = if entry == "." { layout.root.clone() } else { layout.resolve(entry) };
        if path.is_dir() {
            let mut found = Vec::new();
            for dir_entry in
                fs::read_dir(&path).with_context(|| format!("Failed to read {}", path.display()))?
            {
                let dir_entry = dir_entry?;
                if !dir_entry.file_type()?.is_file() {
                    continue;
                }
                let file_path = dir_entry.path();
                let ext = file_path.extension().and_then(|e| e.to_str()).unwrap_or_default();
                if extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)) {
                    found.push(file_path);
                }
            }
            found.sort();
            for file_path in found {
                if !out.contains(&file_path) {
                    out.push(file_path);
                }
            }
        } else if !out.contains(&path) {
            out.push(path);
        }
    }
    Ok(out)
}

/// Logs named `<source-stem>.<precision>.log` under the logs dir, ordered by
/// source then precision. Paths are listed whether or not the file exists.
///
/// Sources sharing a stem (`reduce.cu`, `reduce.cuh`) would share log paths;
/// each path goes to the first source that claims it.
pub fn discover_logs(
    logs_dir: &Path,
    sources: &[PathBuf],
    precisions: &[Precision],
) -> Vec<LogArtifact> {
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    let mut logs = Vec::new();
    for path in sources {
        let source = SourceFile::new(path);
        for &precision in precisions {
            let log_path = logs_dir.join(format!("{}.{}.log", source.stem(), precision));
            if !claimed.insert(log_path.clone()) {
                warn!(
                    source = %source.name,
                    log = %log_path.display(),
                    "log already claimed by a source with the same stem; skipping"
                );
                continue;
            }
            logs.push(LogArtifact { source_name: source.name.clone(), precision, path: log_path });
        }
    }
    logs
}

/// Parse `SOURCE:PRECISION:PATH` into a log artifact.
///
/// `SOURCE` may be a base name (`reduce.cu`) or a stem (`reduce`); stems are
/// mapped onto the matching scanned source when there is one.
pub fn parse_log_spec(
    spec: &str,
    layout: &SurveyLayout,
    sources: &[PathBuf],
) -> Result<LogArtifact> {
    let mut parts = spec.splitn(3, ':');
    let (Some(source), Some(precision), Some(path)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(anyhow!("Invalid log spec '{}'. Expected SOURCE:PRECISION:PATH", spec));
    };
    if source.trim().is_empty() || path.trim().is_empty() {
        return Err(anyhow!("Invalid log spec '{}'. Expected SOURCE:PRECISION:PATH", spec));
    }
    let precision: Precision = precision.parse()?;

    let known: Vec<SourceFile> = sources.iter().map(SourceFile::new).collect();
    let source_name = known
        .iter()
        .find(|s| s.name == source)
        .or_else(|| known.iter().find(|s| s.stem() == source))
        .map(|s| s.name.clone())
        .unwrap_or_else(|| source.to_string());

    Ok(LogArtifact { source_name, precision, path: layout.resolve(path) })
}

/// Write one artifact, creating nothing but the file itself.
pub fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .with_context(|| format!("Failed to write report artifact at {}", path.display()))
}
