//! Core data model for kernel signatures and benchmark results.
//!
//! Everything here is a plain value type. Scanning, registration and report
//! building live in their own modules and only pass these types around.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel rendered for results whose kernel could not be attributed.
pub const UNKNOWN_KERNEL: &str = "unknown";

/// A scanned source file: its path plus the base name used as a join key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: PathBuf,
    pub name: String,
}

impl SourceFile {
    /// Build a source file from a path, deriving the display name from the
    /// final path component.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    /// File name without its extension (`reduce.cu` -> `reduce`).
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }
}

/// One tagged kernel declaration recovered from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelSignature {
    pub source: SourceFile,
    pub name: String,
    /// Whitespace-collapsed, attribute-stripped text between the outer parentheses.
    pub parameters: String,
    pub is_template: bool,
}

/// Numeric precision a benchmark was run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Double,
    Float,
    Half,
}

impl Precision {
    /// Canonical execution order used when the caller does not specify one.
    pub const CANONICAL: [Precision; 3] = [Precision::Double, Precision::Float, Precision::Half];

    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Double => "double",
            Precision::Float => "float",
            Precision::Half => "half",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown precision '{0}'. Allowed: double, float, half")]
pub struct ParsePrecisionError(pub String);

impl FromStr for Precision {
    type Err = ParsePrecisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "double" | "fp64" | "f64" => Ok(Precision::Double),
            "float" | "single" | "fp32" | "f32" => Ok(Precision::Float),
            "half" | "fp16" | "f16" => Ok(Precision::Half),
            _ => Err(ParsePrecisionError(s.to_string())),
        }
    }
}

/// Why a best result has no concrete kernel name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum UnresolvedReason {
    /// The log never named a kernel before the best-result line.
    NoKernelContext,
    /// Repair ran but the source file has no registered kernels.
    NoRegisteredKernels,
    /// Repair ran but the source file has several kernels to choose from.
    Ambiguous { candidates: usize },
}

/// Which kernel a best result belongs to, and how we know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum KernelAttribution {
    /// Named by a kernel-context marker in the log itself.
    Logged(String),
    /// Filled in by attribution repair from the registry.
    Inferred(String),
    Unknown(UnresolvedReason),
}

impl KernelAttribution {
    /// Concrete kernel name, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            KernelAttribution::Logged(name) | KernelAttribution::Inferred(name) => Some(name),
            KernelAttribution::Unknown(_) => None,
        }
    }

    /// Name as rendered in reports; unresolved results show the sentinel.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(UNKNOWN_KERNEL)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, KernelAttribution::Unknown(_))
    }
}

/// Metric fields of a best-result line, kept verbatim as logged.
///
/// A field missing from the line stays `None` and renders as an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestMetrics {
    pub block_x: Option<String>,
    pub block_y: Option<String>,
    pub throughput: Option<String>,
    pub bandwidth: Option<String>,
    pub time_ms: Option<String>,
}

impl BestMetrics {
    pub fn block_x_value(&self) -> Option<u32> {
        parse_field(&self.block_x)
    }

    pub fn block_y_value(&self) -> Option<u32> {
        parse_field(&self.block_y)
    }

    pub fn throughput_value(&self) -> Option<f64> {
        parse_field(&self.throughput)
    }

    pub fn bandwidth_value(&self) -> Option<f64> {
        parse_field(&self.bandwidth)
    }

    pub fn time_ms_value(&self) -> Option<f64> {
        parse_field(&self.time_ms)
    }
}

fn parse_field<T: FromStr>(field: &Option<String>) -> Option<T> {
    field.as_deref().and_then(|raw| raw.parse().ok())
}

/// A best configuration reported by one benchmark log.
///
/// Raw results come straight out of the log scanner; resolved results have
/// additionally been through attribution repair. Both share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestResult {
    /// Base name of the source file the benchmark was built from.
    pub source: String,
    pub kernel: KernelAttribution,
    pub precision: Precision,
    pub metrics: BestMetrics,
    pub log_path: PathBuf,
}
