//! Schema module - Configuration, task, and statistics types.

mod evolution;
mod task;

pub use evolution::*;
pub use task::*;
