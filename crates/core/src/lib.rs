//! survey-core
//!
//! Core library for extracting tagged kernel signatures from annotated GPU
//! sources and correlating them with benchmark "best result" logs.
//!
//! The pipeline is: scan sources into a `KernelRegistry`, scan logs into raw
//! `BestResult`s, repair missing attribution, then build a `Report` and render
//! it as a text summary, two CSV exports and JSON.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends; the CLI only discovers inputs and writes artifacts.

pub mod model;
pub mod extract;
pub mod registry;
pub mod report;
pub mod project;
pub mod services;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
