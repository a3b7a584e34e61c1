//! Project configuration and on-disk layout.
//!
//! - `SurveyConfig` / `MarkerConfig`: serializable settings, including every
//!   textual marker the scanners look for.
//! - `SurveyLayout`: computed paths for the config, logs and report artifacts.

pub mod config;
pub mod layout;
pub mod util;

pub use config::*;
pub use layout::*;
pub use util::*;
