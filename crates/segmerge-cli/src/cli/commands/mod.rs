//! CLI command handlers, one file per command.

mod completions;
mod config;
mod man;
mod merge;
mod plan;

pub use completions::run_completions;
pub use config::run_config;
pub use man::run_man;
pub use merge::{run_merge, MergeOverrides};
pub use plan::run_plan;
