//! CLI module
//!
//! Command-line interface for running Omics list operations.
//!
//! # Commands
//!
//! - `list` - Run a list operation and print its output
//! - `operations` - List catalog operations
//! - `describe` - Show an operation definition

mod commands;
mod runner;

pub use commands::{Cli, Commands, IterationModeArg, OutputFormat};
pub use runner::Runner;
