pub mod project;
pub mod survey;
pub mod util;

pub use project::*;
pub use survey::*;
pub use util::*;
