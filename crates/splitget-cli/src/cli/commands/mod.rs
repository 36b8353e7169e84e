//! CLI command handlers, one per file.

mod completions;
mod get;
mod man;
mod probe;

pub use completions::run_completions;
pub use get::{run_get, GetArgs};
pub use man::run_man;
pub use probe::run_probe;
