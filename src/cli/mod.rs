//! CLI module - argument parsing, subcommand runners and interactive prompts

mod args;
pub mod evaluate;
pub mod inspect;
pub mod predict;
mod prompts;
pub mod train;

pub use args::*;
pub use prompts::*;
