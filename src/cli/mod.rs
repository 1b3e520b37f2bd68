//! CLI components.

pub mod repl;
pub mod runner;

pub use repl::{run_interactive, Repl};
pub use runner::{drive_request, render_snapshot_file, run_single_prompt, Screen};
