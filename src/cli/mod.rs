//! CLI module
//!
//! Command-line interface for exporting the catalog.
//!
//! A run loads configuration, pages through the catalog API, and writes
//! the collected records to one JSON file. `--dry-run` stops after
//! validating the configuration.

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::{ExportSummary, Runner};
