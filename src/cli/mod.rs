//! CLI module for the `swapi` tool.
//!
//! This module provides the command-line interface for planning and
//! applying planet manifests.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, StateCommands};
pub use output::{LookupOutcome, OutputFormatter};
