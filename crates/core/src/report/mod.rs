//! Consolidated report joining the kernel registry with resolved best results.
//!
//! Grouping is source (first-seen order) -> kernel (registration order) ->
//! results (production order). Results that cannot be attached to a
//! registered kernel are kept in per-source or top-level buckets instead of
//! being dropped, so every input record is visible somewhere in the report.

mod csv;
mod text;

pub use csv::{escape_field, render_kernels_csv, render_results_csv};
pub use text::render_summary;

use serde::Serialize;

use crate::model::{BestResult, KernelSignature, SourceFile};
use crate::registry::{KernelRegistry, NameCollision};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelReport {
    pub signature: KernelSignature,
    pub results: Vec<BestResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: SourceFile,
    pub kernel_count: usize,
    pub kernels: Vec<KernelReport>,
    /// Results still tagged `unknown` after repair.
    pub unattributed: Vec<BestResult>,
    /// Results naming a kernel that is not registered for this source.
    pub unmatched: Vec<BestResult>,
}

/// Counts over the registry, plus result bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub scripts_analyzed: usize,
    pub kernels_detected: usize,
    pub best_results: usize,
    pub unattributed: usize,
    pub unmatched: usize,
    pub orphaned: usize,
    pub name_collisions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sources: Vec<SourceReport>,
    /// Results whose source file was never scanned.
    pub orphaned: Vec<BestResult>,
    /// Source paths folded into an earlier source sharing their base name.
    pub collisions: Vec<NameCollision>,
    pub totals: ReportTotals,
}

impl Report {
    /// Build the report. Must run after all registration and result extraction.
    pub fn build(registry: &KernelRegistry, results: &[BestResult]) -> Self {
        let mut sources = Vec::with_capacity(registry.source_count());
        let mut totals = ReportTotals {
            scripts_analyzed: registry.source_count(),
            kernels_detected: registry.total_kernels(),
            best_results: results.len(),
            name_collisions: registry.collisions().len(),
            ..ReportTotals::default()
        };

        for entry in registry.sources() {
            let source_name = entry.source.name.as_str();
            let for_source: Vec<&BestResult> =
                results.iter().filter(|r| r.source == source_name).collect();

            let kernels = entry
                .kernels
                .iter()
                .map(|sig| KernelReport {
                    signature: sig.clone(),
                    results: for_source
                        .iter()
                        .filter(|r| r.kernel.name() == Some(sig.name.as_str()))
                        .map(|r| (*r).clone())
                        .collect(),
                })
                .collect();

            let unattributed: Vec<BestResult> = for_source
                .iter()
                .filter(|r| r.kernel.is_unknown())
                .map(|r| (*r).clone())
                .collect();
            let unmatched: Vec<BestResult> = for_source
                .iter()
                .filter(|r| {
                    r.kernel
                        .name()
                        .map(|k| !registry.contains_kernel(source_name, k))
                        .unwrap_or(false)
                })
                .map(|r| (*r).clone())
                .collect();

            totals.unattributed += unattributed.len();
            totals.unmatched += unmatched.len();
            sources.push(SourceReport {
                source: entry.source.clone(),
                kernel_count: entry.kernels.len(),
                kernels,
                unattributed,
                unmatched,
            });
        }

        let orphaned: Vec<BestResult> =
            results.iter().filter(|r| !registry.contains_source(&r.source)).cloned().collect();
        totals.orphaned = orphaned.len();

        Self { sources, orphaned, collisions: registry.collisions().to_vec(), totals }
    }

    /// Pretty JSON form of the whole report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
