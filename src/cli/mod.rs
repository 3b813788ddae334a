//! Command-line interface definitions

/// Argument parsing types
pub mod commands;

pub use commands::{Action, Commands, ConfigOptions, ReportOptions, RunOptions};
