pub mod commands;
mod context;
pub mod output;
mod shell;

pub use context::{CliMode, CommandError, CommandResult, ShellContext};
pub use shell::{run_cli, SCRIPT_ENV};
