/// Execution config module.
pub mod execution;
/// Launch config module.
pub mod launch;
/// Profiling config module.
pub mod profiling;

mod base;
mod logger;

pub use base::*;
pub use logger::*;
