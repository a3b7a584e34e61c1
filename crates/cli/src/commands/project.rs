use std::fs;

use crate::commands::print_dir_status;
use crate::{canonicalize_or_current, infer_project_name};
use anyhow::{Context, Result};
use serde::Serialize;
use survey_core::model::Precision;
use survey_core::project::{open_survey, SurveyConfig, SurveyLayout};

#[derive(Serialize)]
pub struct SurveyInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub sources: Vec<String>,
    pub source_extensions: Vec<String>,
    pub precisions: Vec<Precision>,
    pub dirs: SurveyInfoDirs,
}

#[derive(Serialize)]
pub struct SurveyInfoDirs {
    pub meta_dir: String,
    pub logs_dir: String,
    pub reports_dir: String,
}

/// Initialize a new survey project at `root`.
pub fn init_project_command(root: &str, name: Option<String>) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = SurveyLayout::new(&root_path);

    let project_name = name.unwrap_or_else(|| infer_project_name(&root_path));

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.logs_dir)
        .with_context(|| format!("Failed to create logs dir: {}", layout.logs_dir.display()))?;
    fs::create_dir_all(&layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", layout.reports_dir.display())
    })?;

    // Build and write the default config, scanning the root by default.
    let mut config = SurveyConfig::new(&project_name);
    config.sources.push(".".to_string());
    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write survey config: {}", layout.config_path.display())
    })?;

    println!("Initialized kernel survey project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.config_path.display());
    println!("  Logs dir: {}", layout.logs_dir.display());
    println!("  Reports dir: {}", layout.reports_dir.display());

    Ok(())
}

/// Print the resolved config and whether each project directory exists.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = SurveyLayout::new(&root_path);
    let (config, resolved) = open_survey(&layout)?;

    if json {
        let snapshot = SurveyInfoSnapshot {
            name: config.name.clone(),
            root: resolved.root.display().to_string(),
            config_file: resolved.config_path.display().to_string(),
            config_version: config.config_version.clone(),
            sources: config.sources.clone(),
            source_extensions: config.source_extensions.clone(),
            precisions: config.precisions.clone(),
            dirs: SurveyInfoDirs {
                meta_dir: resolved.meta_dir.display().to_string(),
                logs_dir: resolved.logs_dir.display().to_string(),
                reports_dir: resolved.reports_dir.display().to_string(),
            },
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let precisions: Vec<&str> = config.precisions.iter().map(|p| p.as_str()).collect();

    println!("Kernel Survey Project Info");
    println!("==========================");
    println!("Name: {}", config.name);
    println!("Root: {}", resolved.root.display());
    println!("Config file: {}", resolved.config_path.display());
    println!("Config version: {}", config.config_version);
    let sources =
        if config.sources.is_empty() { "(none)".to_string() } else { config.sources.join(", ") };
    println!("Sources: {}", sources);
    println!("Precisions: {}", precisions.join(", "));
    println!("Tag marker: {}", config.markers.tag);
    println!("Best-result marker: {}", config.markers.best_marker);
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.kernel-survey)", &resolved.meta_dir);
    print_dir_status("Logs dir", &resolved.logs_dir);
    print_dir_status("Reports dir", &resolved.reports_dir);

    Ok(())
}
