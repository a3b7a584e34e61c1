use crate::model::{BestResult, KernelAttribution, UnresolvedReason};
use crate::registry::KernelRegistry;

/// Resolve unattributed results whose source has exactly one registered kernel.
///
/// Everything else is passed through untouched, in input order. Results that
/// stay unresolved record why: no kernels or several kernels to choose from.
pub fn repair(raw: Vec<BestResult>, registry: &KernelRegistry) -> Vec<BestResult> {
    raw.into_iter().map(|result| repair_one(result, registry)).collect()
}

fn repair_one(mut result: BestResult, registry: &KernelRegistry) -> BestResult {
    if !result.kernel.is_unknown() {
        return result;
    }
    result.kernel = match registry.sole_kernel_name_of(&result.source) {
        Some(name) => KernelAttribution::Inferred(name.to_string()),
        None => {
            let candidates = registry.kernel_count(&result.source);
            let reason = if candidates == 0 {
                UnresolvedReason::NoRegisteredKernels
            } else {
                UnresolvedReason::Ambiguous { candidates }
            };
            KernelAttribution::Unknown(reason)
        }
    };
    result
}
