//! CLI module for the `scpctl` tool.
//!
//! This module provides the command-line interface for applying
//! manifests against the Samsung Cloud Platform.

mod commands;
mod output;

pub use commands::{Cli, Commands, OutputFormat, StateCommands};
pub use output::OutputFormatter;
