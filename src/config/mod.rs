// src/config/mod.rs
//! Configuration management for the bot
//!
//! This module handles all configuration-related functionality including:
//! - Loading and parsing configuration files
//! - Applying the environment variable overrides
//! - Generating configuration templates
//!
//! The configuration uses TOML format; `.env` files are loaded by the binary
//! before the overrides are read.

/// Core configuration implementation
///
/// Contains the [`Config`] struct that gathers every section's settings.
pub mod config;

// Re-export key items for easy access
pub use config::{Config, ENV_OVERRIDES};

use crate::utils::error::BotError;
use std::path::PathBuf;

/// Loads bot configuration from a TOML file plus environment overrides
///
/// # Arguments
/// * `path` - Path to the configuration file (anything convertible to PathBuf)
///
/// # Returns
/// * `Ok(Config)` - Successfully loaded configuration
/// * `Err(BotError)` - If the file couldn't be read or parsed
pub fn load(path: impl Into<PathBuf>) -> Result<Config, BotError> {
    Config::load(path)
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
