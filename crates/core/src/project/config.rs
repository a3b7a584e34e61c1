use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::Precision;

/// Errors raised while loading or validating survey configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read { path: String, source: std::io::Error },

    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid marker configuration: {0}")]
    InvalidMarker(String),
}

/// Textual markers recognised in sources and benchmark logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Marker placed before a declaration to mark it for extraction.
    pub tag: String,
    /// Keyword that opens a kernel declaration (e.g. `__global__`).
    pub declaration_keyword: String,
    pub template_keyword: String,
    pub line_comment: String,
    /// Attribute annotations `name(...)` removed before naming a kernel.
    pub attribute_keywords: Vec<String>,
    /// Marker identifying the winning configuration line in a log.
    pub best_marker: String,
    /// Label for kernel-context lines, matched as `label:` and `label=`.
    pub kernel_label: String,
    pub metric_keys: MetricKeys,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            tag: "@kernel".to_string(),
            declaration_keyword: "__global__".to_string(),
            template_keyword: "template".to_string(),
            line_comment: "//".to_string(),
            attribute_keywords: vec!["__launch_bounds__".to_string(), "__attribute__".to_string()],
            best_marker: "[BEST]".to_string(),
            kernel_label: "kernel".to_string(),
            metric_keys: MetricKeys::default(),
        }
    }
}

/// Accepted `key=` aliases for each metric, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricKeys {
    pub block_x: Vec<String>,
    pub block_y: Vec<String>,
    pub throughput: Vec<String>,
    pub bandwidth: Vec<String>,
    pub time_ms: Vec<String>,
}

impl Default for MetricKeys {
    fn default() -> Self {
        fn keys(names: &[&str]) -> Vec<String> {
            names.iter().map(|s| s.to_string()).collect()
        }
        Self {
            block_x: keys(&["bx", "block_x"]),
            block_y: keys(&["by", "block_y"]),
            throughput: keys(&["gflops", "tflops"]),
            bandwidth: keys(&["bw", "bandwidth", "gbps"]),
            time_ms: keys(&["time_ms", "time", "ms"]),
        }
    }
}

impl MarkerConfig {
    /// Reject settings that would make the scanners match everything or nothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("tag", &self.tag),
            ("declaration_keyword", &self.declaration_keyword),
            ("best_marker", &self.best_marker),
            ("kernel_label", &self.kernel_label),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidMarker(format!("'{field}' must not be empty")));
            }
        }
        let keys = &self.metric_keys;
        let aliases = [
            ("block_x", &keys.block_x),
            ("block_y", &keys.block_y),
            ("throughput", &keys.throughput),
            ("bandwidth", &keys.bandwidth),
            ("time_ms", &keys.time_ms),
        ];
        for (field, list) in aliases {
            if list.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigError::InvalidMarker(format!(
                    "metric '{field}' needs at least one key"
                )));
            }
        }
        Ok(())
    }
}

/// Serializable configuration describing a survey project.
///
/// This lives at `.kernel-survey/survey.json` in the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Human-friendly project name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Config format version.
    #[serde(default = "default_config_version")]
    pub config_version: String,
    /// Source files or directories to scan, relative to the project root.
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
    #[serde(default = "default_logs_dir")]
    pub logs_dir: String,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,
    /// Precision variants in execution order.
    #[serde(default = "default_precisions")]
    pub precisions: Vec<Precision>,
    #[serde(default)]
    pub markers: MarkerConfig,
}

fn default_config_version() -> String {
    "0.1.0".to_string()
}

fn default_source_extensions() -> Vec<String> {
    vec!["cu".to_string(), "cuh".to_string()]
}

fn default_logs_dir() -> String {
    "logs".to_string()
}

fn default_reports_dir() -> String {
    "reports".to_string()
}

fn default_precisions() -> Vec<Precision> {
    Precision::CANONICAL.to_vec()
}

impl SurveyConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: default_config_version(),
            sources: Vec::new(),
            source_extensions: default_source_extensions(),
            logs_dir: default_logs_dir(),
            reports_dir: default_reports_dir(),
            precisions: default_precisions(),
            markers: MarkerConfig::default(),
        }
    }

    /// Load a config file, choosing YAML or JSON by extension (JSON otherwise).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        let is_yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yaml" | "yml"));
        let config: SurveyConfig =
            if is_yaml { serde_yaml::from_str(&body)? } else { serde_json::from_str(&body)? };
        config.markers.validate()?;
        Ok(config)
    }

    /// SHA-256 of the canonical JSON form, recorded with every run.
    pub fn fingerprint(&self) -> Result<String, ConfigError> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
