use std::path::PathBuf;

use survey_core::model::{
    BestMetrics, BestResult, KernelAttribution, KernelSignature, Precision, SourceFile,
    UnresolvedReason,
};
use survey_core::registry::KernelRegistry;
use survey_core::report::{
    escape_field, render_kernels_csv, render_results_csv, render_summary, Report,
};

fn sig(path: &str, name: &str, params: &str, is_template: bool) -> KernelSignature {
    KernelSignature {
        source: SourceFile::new(path),
        name: name.to_string(),
        parameters: params.to_string(),
        is_template,
    }
}

fn result(source: &str, kernel: KernelAttribution, precision: Precision, bx: &str) -> BestResult {
    BestResult {
        source: source.to_string(),
        kernel,
        precision,
        metrics: BestMetrics {
            block_x: Some(bx.to_string()),
            block_y: Some("4".to_string()),
            throughput: Some("10.5".to_string()),
            bandwidth: None,
            time_ms: Some("1.2".to_string()),
        },
        log_path: PathBuf::from("logs/run.log"),
    }
}

fn logged(name: &str) -> KernelAttribution {
    KernelAttribution::Logged(name.to_string())
}

fn sample_registry() -> KernelRegistry {
    let mut registry = KernelRegistry::new();
    registry.register(vec![
        sig("src/reduce.cu", "reduce", "const float* in, float* out", false),
        sig("src/reduce.cu", "finalize", "float* out", false),
        sig("src/scale.cu", "scale", "T* data, int n", true),
    ]);
    registry.add_source(&SourceFile::new("src/empty.cu"));
    registry
}

#[test]
fn results_group_under_their_kernel_in_production_order() {
    let registry = sample_registry();
    let results = vec![
        result("reduce.cu", logged("reduce"), Precision::Double, "128"),
        result("scale.cu", KernelAttribution::Inferred("scale".into()), Precision::Double, "32"),
        result("reduce.cu", logged("reduce"), Precision::Float, "256"),
        result("reduce.cu", logged("finalize"), Precision::Half, "64"),
    ];
    let report = Report::build(&registry, &results);

    let sources: Vec<&str> = report.sources.iter().map(|s| s.source.name.as_str()).collect();
    assert_eq!(sources, vec!["reduce.cu", "scale.cu", "empty.cu"]);

    let reduce = &report.sources[0];
    assert_eq!(reduce.kernel_count, 2);
    assert_eq!(reduce.kernels[0].signature.name, "reduce");
    let precisions: Vec<Precision> =
        reduce.kernels[0].results.iter().map(|r| r.precision).collect();
    assert_eq!(precisions, vec![Precision::Double, Precision::Float]);
    assert_eq!(reduce.kernels[1].results.len(), 1);
    assert_eq!(report.sources[1].kernels[0].results.len(), 1);
    assert!(report.sources[2].kernels.is_empty());
}

#[test]
fn totals_count_registry_not_results() {
    let registry = sample_registry();
    let report = Report::build(&registry, &[]);
    assert_eq!(report.totals.scripts_analyzed, 3);
    assert_eq!(report.totals.kernels_detected, 3);
    assert_eq!(report.totals.best_results, 0);
}

#[test]
fn unresolved_unmatched_and_orphaned_results_are_kept() {
    let registry = sample_registry();
    let results = vec![
        result(
            "reduce.cu",
            KernelAttribution::Unknown(UnresolvedReason::Ambiguous { candidates: 2 }),
            Precision::Double,
            "1",
        ),
        result("reduce.cu", logged("not_tagged"), Precision::Double, "2"),
        result("missing.cu", logged("ghost"), Precision::Float, "3"),
    ];
    let report = Report::build(&registry, &results);

    let reduce = &report.sources[0];
    assert_eq!(reduce.unattributed.len(), 1);
    assert_eq!(reduce.unmatched.len(), 1);
    assert_eq!(reduce.unmatched[0].kernel.display_name(), "not_tagged");
    assert!(reduce.kernels.iter().all(|k| k.results.is_empty()));
    assert_eq!(report.orphaned.len(), 1);

    let totals = report.totals;
    assert_eq!(totals.best_results, 3);
    assert_eq!(totals.unattributed, 1);
    assert_eq!(totals.unmatched, 1);
    assert_eq!(totals.orphaned, 1);
}

#[test]
fn summary_lists_sources_kernels_results_and_totals() {
    let registry = sample_registry();
    let results = vec![
        result("reduce.cu", logged("reduce"), Precision::Double, "128"),
        result(
            "reduce.cu",
            KernelAttribution::Unknown(UnresolvedReason::NoKernelContext),
            Precision::Float,
            "8",
        ),
    ];
    let summary = render_summary(&Report::build(&registry, &results));

    assert!(summary.starts_with("Kernel Survey Report\n"));
    assert!(summary.contains("reduce.cu (2 kernels)"));
    assert!(summary.contains("scale.cu (1 kernel)"));
    assert!(summary.contains("  - reduce(const float* in, float* out)"));
    assert!(summary.contains("  - template scale(T* data, int n)"));
    assert!(summary.contains("      [double] bx=128 by=4 gflops=10.5 bw= time_ms=1.2"));
    assert!(summary.contains("  Unattributed results:"));
    assert!(summary.contains("[float] bx=8 by=4 gflops=10.5 bw= time_ms=1.2 kernel=unknown"));
    assert!(summary.contains("empty.cu (0 kernels)\n  (no tagged kernels)"));
    assert!(summary.contains("Scripts analyzed: 3"));
    assert!(summary.contains("Kernels detected: 3"));
    assert!(summary.contains("Best results: 2 (unattributed: 1, unmatched: 0, orphaned: 0)"));
}

#[test]
fn kernels_csv_has_one_row_per_signature() {
    let csv = render_kernels_csv(&sample_registry());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "source_file,kernel,parameters,is_template,source_path");
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "reduce.cu,reduce,\"const float* in, float* out\",false,src/reduce.cu");
    assert_eq!(lines[3], "scale.cu,scale,\"T* data, int n\",true,src/scale.cu");
}

#[test]
fn results_csv_renders_unknown_and_empty_fields() {
    let results = vec![result(
        "reduce.cu",
        KernelAttribution::Unknown(UnresolvedReason::NoRegisteredKernels),
        Precision::Half,
        "64",
    )];
    let csv = render_results_csv(&results);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "source_file,kernel,precision,block_x,block_y,gflops,bandwidth,time_ms,log_path"
    );
    assert_eq!(lines[1], "reduce.cu,unknown,half,64,4,10.5,,1.2,logs/run.log");
}

#[test]
fn escape_field_quotes_only_when_needed() {
    assert_eq!(escape_field("plain"), "plain");
    assert_eq!(escape_field("a, b"), "\"a, b\"");
    assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
}

#[test]
fn report_json_carries_attribution_kind() {
    let registry = sample_registry();
    let inferred = KernelAttribution::Inferred("scale".into());
    let results = vec![result("scale.cu", inferred, Precision::Float, "32")];
    let json = Report::build(&registry, &results).to_json().expect("json");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

    let kernel = &value["sources"][1]["kernels"][0]["results"][0]["kernel"];
    assert_eq!(kernel["kind"], "inferred");
    assert_eq!(kernel["value"], "scale");
    assert_eq!(value["totals"]["kernels_detected"], 3);
}

#[test]
fn merged_base_name_sources_are_listed_in_report_and_summary() {
    let mut registry = sample_registry();
    registry.register(vec![sig("vendor/reduce.cu", "vendor_reduce", "int n", false)]);
    let report = Report::build(&registry, &[]);

    assert_eq!(report.totals.name_collisions, 1);
    assert_eq!(report.totals.scripts_analyzed, 3);
    assert_eq!(report.collisions[0].merged, PathBuf::from("vendor/reduce.cu"));

    let summary = render_summary(&report);
    assert!(summary.contains("Sources merged by base name:"));
    assert!(summary.contains("  - reduce.cu: kept src/reduce.cu, merged vendor/reduce.cu"));
    assert!(summary.contains("Base-name collisions: 1"));

    let clean = render_summary(&Report::build(&sample_registry(), &[]));
    assert!(!clean.contains("Base-name collisions"));
}
