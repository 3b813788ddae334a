// src/utils/mod.rs
//! Utilities module for common functionality
//!
//! This module contains shared utilities used throughout the bot,
//! including error handling and logging infrastructure.

/// Error types and handling utilities
///
/// Contains the [`BotError`] enum which defines all possible error conditions
/// for the bot, along with conversion implementations.
pub mod error;

/// Logging configuration and utilities
pub mod logging;

// Re-export for easier access
pub use error::BotError;
pub use logging::{init_logging, init_report_logging};
