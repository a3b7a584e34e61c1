use anyhow::{Context, Result};

use crate::project::{SurveyConfig, SurveyLayout};

/// Load the project config JSON from disk for a given layout.
pub fn load_survey_config(layout: &SurveyLayout) -> Result<SurveyConfig> {
    let config_json = std::fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read survey config at {}", layout.config_path.display())
    })?;
    let config: SurveyConfig =
        serde_json::from_str(&config_json).context("Failed to parse survey config JSON")?;
    config.markers.validate().context("Survey config has invalid markers")?;
    Ok(config)
}

/// Load the config and return the layout adjusted to its directories.
pub fn open_survey(layout: &SurveyLayout) -> Result<(SurveyConfig, SurveyLayout)> {
    let config = load_survey_config(layout)?;
    let resolved = layout.clone().with_config(&config);
    Ok((config, resolved))
}
