use std::fmt::Write as _;

use crate::model::{BestResult, KernelSignature};
use crate::report::Report;

/// Human-readable summary: source -> kernel -> one line per best result.
pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("Kernel Survey Report\n");
    out.push_str("====================\n");

    for source in &report.sources {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} ({} kernel{})",
            source.source.name,
            source.kernel_count,
            if source.kernel_count == 1 { "" } else { "s" }
        );
        if source.kernels.is_empty() {
            out.push_str("  (no tagged kernels)\n");
        }
        for kernel in &source.kernels {
            let _ = writeln!(out, "  - {}", signature_line(&kernel.signature));
            if kernel.results.is_empty() {
                out.push_str("      (no best results)\n");
            }
            for result in &kernel.results {
                let _ = writeln!(out, "      {}", result_line(result));
            }
        }
        if !source.unattributed.is_empty() {
            out.push_str("  Unattributed results:\n");
            for result in &source.unattributed {
                let _ = writeln!(out, "      {} kernel=unknown", result_line(result));
            }
        }
        if !source.unmatched.is_empty() {
            out.push_str("  Results for unregistered kernels:\n");
            for result in &source.unmatched {
                let _ = writeln!(
                    out,
                    "      {} kernel={}",
                    result_line(result),
                    result.kernel.display_name()
                );
            }
        }
    }

    if !report.orphaned.is_empty() {
        out.push_str("\nResults for unscanned sources:\n");
        for result in &report.orphaned {
            let _ = writeln!(
                out,
                "  - {} / {}: {}",
                result.source,
                result.kernel.display_name(),
                result_line(result)
            );
        }
    }

    if !report.collisions.is_empty() {
        out.push_str("\nSources merged by base name:\n");
        for collision in &report.collisions {
            let _ = writeln!(
                out,
                "  - {}: kept {}, merged {}",
                collision.name,
                collision.kept.display(),
                collision.merged.display()
            );
        }
    }

    let totals = &report.totals;
    out.push_str("\nTotals\n------\n");
    let _ = writeln!(out, "Scripts analyzed: {}", totals.scripts_analyzed);
    if totals.name_collisions > 0 {
        let _ = writeln!(out, "Base-name collisions: {}", totals.name_collisions);
    }
    let _ = writeln!(out, "Kernels detected: {}", totals.kernels_detected);
    let _ = writeln!(
        out,
        "Best results: {} (unattributed: {}, unmatched: {}, orphaned: {})",
        totals.best_results, totals.unattributed, totals.unmatched, totals.orphaned
    );
    out
}

fn signature_line(sig: &KernelSignature) -> String {
    let prefix = if sig.is_template { "template " } else { "" };
    format!("{prefix}{}({})", sig.name, sig.parameters)
}

fn result_line(result: &BestResult) -> String {
    let m = &result.metrics;
    let field = |v: &Option<String>| v.clone().unwrap_or_default();
    format!(
        "[{}] bx={} by={} gflops={} bw={} time_ms={}",
        result.precision,
        field(&m.block_x),
        field(&m.block_y),
        field(&m.throughput),
        field(&m.bandwidth),
        field(&m.time_ms)
    )
}
