//! CLI command handlers, one file per command.

mod completions;
mod export;
mod filename;
mod list;
mod man;
mod source;

pub use completions::run_completions;
pub use export::run_export;
pub use filename::run_filename;
pub use list::run_list;
pub use man::run_man;
