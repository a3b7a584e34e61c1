//! Deduplicated, order-preserving collection of extracted kernel signatures.
//!
//! Sources are keyed by their base name, which is also how benchmark logs
//! refer to them. Within a source, kernels are keyed by name; the first
//! registration of a `(source, kernel)` pair wins and later ones are ignored.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::{KernelSignature, SourceFile};

/// One scanned source and the kernels registered for it, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub source: SourceFile,
    pub kernels: Vec<KernelSignature>,
}

/// A source path folded into an earlier source with the same base name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCollision {
    pub name: String,
    pub kept: PathBuf,
    pub merged: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KernelRegistry {
    sources: Vec<SourceEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    collisions: Vec<NameCollision>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a source was scanned, even if it yields no kernels.
    ///
    /// Returns the source's position in first-seen order. A second file with
    /// the same base name is folded into the first one and recorded as a
    /// [`NameCollision`].
    pub fn add_source(&mut self, source: &SourceFile) -> usize {
        if let Some(&idx) = self.index.get(&source.name) {
            let kept = &self.sources[idx].source.path;
            let already_recorded = self.collisions.iter().any(|c| c.merged == source.path);
            if *kept != source.path && !already_recorded {
                warn!(
                    name = %source.name,
                    kept = %kept.display(),
                    merged = %source.path.display(),
                    "source base name already registered from another path; merging"
                );
                self.collisions.push(NameCollision {
                    name: source.name.clone(),
                    kept: kept.clone(),
                    merged: source.path.clone(),
                });
            }
            return idx;
        }
        let idx = self.sources.len();
        self.sources.push(SourceEntry { source: source.clone(), kernels: Vec::new() });
        self.index.insert(source.name.clone(), idx);
        idx
    }

    /// Register signatures; repeats of an existing `(source, kernel)` pair are ignored.
    pub fn register<I>(&mut self, signatures: I)
    where
        I: IntoIterator<Item = KernelSignature>,
    {
        for sig in signatures {
            let idx = self.add_source(&sig.source);
            let entry = &mut self.sources[idx];
            if entry.kernels.iter().any(|k| k.name == sig.name) {
                continue;
            }
            entry.kernels.push(sig);
        }
    }

    /// Kernels of a source in registration order (empty if unknown).
    pub fn kernels_of(&self, source_name: &str) -> &[KernelSignature] {
        self.entry(source_name).map(|e| e.kernels.as_slice()).unwrap_or(&[])
    }

    pub fn kernel_count(&self, source_name: &str) -> usize {
        self.kernels_of(source_name).len()
    }

    /// The kernel name if and only if exactly one kernel is registered for the source.
    pub fn sole_kernel_name_of(&self, source_name: &str) -> Option<&str> {
        match self.kernels_of(source_name) {
            [only] => Some(only.name.as_str()),
            _ => None,
        }
    }

    pub fn contains_source(&self, source_name: &str) -> bool {
        self.index.contains_key(source_name)
    }

    pub fn contains_kernel(&self, source_name: &str, kernel_name: &str) -> bool {
        self.kernels_of(source_name).iter().any(|k| k.name == kernel_name)
    }

    /// Sources in first-seen order.
    pub fn sources(&self) -> &[SourceEntry] {
        &self.sources
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn total_kernels(&self) -> usize {
        self.sources.iter().map(|e| e.kernels.len()).sum()
    }

    /// Paths merged into an earlier source with the same base name, in order seen.
    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }

    /// Every registered signature, sources in order, kernels in order.
    pub fn signatures(&self) -> impl Iterator<Item = &KernelSignature> {
        self.sources.iter().flat_map(|e| e.kernels.iter())
    }

    fn entry(&self, source_name: &str) -> Option<&SourceEntry> {
        self.index.get(source_name).map(|&idx| &self.sources[idx])
    }
}
