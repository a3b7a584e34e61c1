use crate::model::BestResult;
use crate::registry::KernelRegistry;

const KERNEL_COLUMNS: [&str; 5] =
    ["source_file", "kernel", "parameters", "is_template", "source_path"];

const RESULT_COLUMNS: [&str; 9] = [
    "source_file",
    "kernel",
    "precision",
    "block_x",
    "block_y",
    "gflops",
    "bandwidth",
    "time_ms",
    "log_path",
];

/// Quote a field when it contains a separator, quote or newline.
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[&str]) {
    let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// One row per registered `(source, kernel)` pair, in registry order.
pub fn render_kernels_csv(registry: &KernelRegistry) -> String {
    let mut out = String::new();
    push_row(&mut out, &KERNEL_COLUMNS);
    for sig in registry.signatures() {
        let path = sig.source.path.display().to_string();
        let template = if sig.is_template { "true" } else { "false" };
        push_row(
            &mut out,
            &[
                sig.source.name.as_str(),
                sig.name.as_str(),
                sig.parameters.as_str(),
                template,
                path.as_str(),
            ],
        );
    }
    out
}

/// One row per resolved best result, in the order given. Absent metrics stay empty.
pub fn render_results_csv(results: &[BestResult]) -> String {
    let mut out = String::new();
    push_row(&mut out, &RESULT_COLUMNS);
    for result in results {
        let m = &result.metrics;
        let log_path = result.log_path.display().to_string();
        push_row(
            &mut out,
            &[
                result.source.as_str(),
                result.kernel.display_name(),
                result.precision.as_str(),
                m.block_x.as_deref().unwrap_or(""),
                m.block_y.as_deref().unwrap_or(""),
                m.throughput.as_deref().unwrap_or(""),
                m.bandwidth.as_deref().unwrap_or(""),
                m.time_ms.as_deref().unwrap_or(""),
                log_path.as_str(),
            ],
        );
    }
    out
}
