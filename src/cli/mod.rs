//! Command-line interface for tramite
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point and command dispatch
//! - `commands`: command implementations
//! - `tests`: argument parsing tests (cfg(test) only)

pub mod args;
mod commands;
mod run;


pub use args::{Cli, Commands, LogFormatArg, build_cli};
pub use run::run;
