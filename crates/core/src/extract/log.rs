//! Benchmark log scanner.
//!
//! Logs are free text. Two kinds of lines matter: kernel-context lines
//! (`kernel: name` or `... kernel=name ...`) that set the current kernel, and
//! best-result lines carrying the winning configuration as `key=value` tokens.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::model::{BestMetrics, BestResult, KernelAttribution, Precision, UnresolvedReason};
use crate::project::{ConfigError, MarkerConfig, MetricKeys};

static KEY_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([^\s,;|)\]}]+)")
        .expect("key=value pattern is valid")
});

const KERNEL_NAME: &str = r"([A-Za-z_][A-Za-z0-9_]*(?:::[A-Za-z_][A-Za-z0-9_]*)*)";

/// Which metric a `key=` token feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricField {
    BlockX,
    BlockY,
    Throughput,
    Bandwidth,
    TimeMs,
}

/// Extracts best-result records from benchmark log text.
#[derive(Debug, Clone)]
pub struct LogScanner {
    best_marker: String,
    context_colon: Regex,
    context_assign: Regex,
    keys: Vec<(String, MetricField)>,
}

impl LogScanner {
    pub fn new(markers: &MarkerConfig) -> Result<Self, ConfigError> {
        markers.validate()?;
        let label = regex::escape(markers.kernel_label.trim());
        let build = |pattern: String| {
            Regex::new(&pattern)
                .map_err(|e| ConfigError::InvalidMarker(format!("kernel label: {e}")))
        };
        let context_colon = build(format!(r"(?i)(?:^|[^A-Za-z0-9_]){label}\s*:\s*{KERNEL_NAME}"))?;
        let context_assign =
            build(format!(r#"(?i)(?:^|[^A-Za-z0-9_]){label}\s*=\s*["']?{KERNEL_NAME}"#))?;

        Ok(Self {
            best_marker: markers.best_marker.clone(),
            context_colon,
            context_assign,
            keys: metric_key_table(&markers.metric_keys),
        })
    }

    /// Kernel named by a context marker on this line, if any.
    pub fn kernel_context(&self, line: &str) -> Option<String> {
        self.context_colon
            .captures(line)
            .or_else(|| self.context_assign.captures(line))
            .map(|caps| caps[1].to_string())
    }

    /// Metric fields of a line, independent of token order. First occurrence wins.
    pub fn parse_metrics(&self, line: &str) -> BestMetrics {
        let mut metrics = BestMetrics::default();
        for caps in KEY_VALUE.captures_iter(line) {
            let key = caps[1].to_ascii_lowercase();
            let Some(field) = self.field_for(&key) else {
                continue;
            };
            let slot = match field {
                MetricField::BlockX => &mut metrics.block_x,
                MetricField::BlockY => &mut metrics.block_y,
                MetricField::Throughput => &mut metrics.throughput,
                MetricField::Bandwidth => &mut metrics.bandwidth,
                MetricField::TimeMs => &mut metrics.time_ms,
            };
            if slot.is_none() {
                *slot = Some(caps[2].to_string());
            }
        }
        metrics
    }

    /// Scan one log and return a record per best-result line, in log order.
    pub fn extract(
        &self,
        text: &str,
        source_name: &str,
        precision: Precision,
        log_path: &Path,
    ) -> Vec<BestResult> {
        let mut current_kernel: Option<String> = None;
        let mut out = Vec::new();

        for line in text.lines() {
            if let Some(kernel) = self.kernel_context(line) {
                current_kernel = Some(kernel);
            }
            if !line.contains(&self.best_marker) {
                continue;
            }
            let kernel = match &current_kernel {
                Some(name) => KernelAttribution::Logged(name.clone()),
                None => KernelAttribution::Unknown(UnresolvedReason::NoKernelContext),
            };
            out.push(BestResult {
                source: source_name.to_string(),
                kernel,
                precision,
                metrics: self.parse_metrics(line),
                log_path: log_path.to_path_buf(),
            });
        }

        debug!(
            source = source_name,
            precision = %precision,
            log = %log_path.display(),
            results = out.len(),
            "scanned log"
        );
        out
    }

    fn field_for(&self, key: &str) -> Option<MetricField> {
        self.keys.iter().find(|(k, _)| k == key).map(|(_, field)| *field)
    }
}

fn metric_key_table(keys: &MetricKeys) -> Vec<(String, MetricField)> {
    let groups = [
        (&keys.block_x, MetricField::BlockX),
        (&keys.block_y, MetricField::BlockY),
        (&keys.throughput, MetricField::Throughput),
        (&keys.bandwidth, MetricField::Bandwidth),
        (&keys.time_ms, MetricField::TimeMs),
    ];
    let mut table = Vec::new();
    for (aliases, field) in groups {
        for alias in aliases.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
            table.push((alias.to_ascii_lowercase(), field));
        }
    }
    table
}
