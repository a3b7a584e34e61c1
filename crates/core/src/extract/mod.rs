//! Text scanners for annotated sources and benchmark logs.

pub mod log;
pub mod signature;

pub use log::LogScanner;
pub use signature::{extract_signatures, ScanState, SignatureScanner};
