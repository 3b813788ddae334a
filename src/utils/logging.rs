// src/utils/logging.rs
//! Logging configuration and utilities
//!
//! This module handles logging setup for the bot, including:
//! - Standard logging configuration for the long-running chat session
//! - Quiet logging for one-shot reports printed to stdout
//!
//! Uses `env_logger` under the hood with custom formatting and filtering.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem with sensible defaults
///
/// # Configuration
/// - Logs to stdout
/// - Default log level: Info
/// - Custom timestamp and source location formatting
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging() {
    let mut builder = common_log_config(Target::Stdout);
    builder.filter_level(LevelFilter::Info);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

/// Configures logging for the one-shot `report` command
///
/// # Differences from Standard Logging
/// - Logs go to stderr so stdout only carries the rendered report
/// - Default log level: Warn (if RUST_LOG not set)
pub fn init_report_logging() {
    let mut builder = common_log_config(Target::Stderr);

    if env::var("RUST_LOG").is_err() {
        builder.filter_level(LevelFilter::Warn);
    } else {
        builder.parse_env("RUST_LOG");
    }

    builder.init();
}

/// Creates and configures a base logger builder with common settings
///
/// Format: `[timestamp level module:line] message`
fn common_log_config(target: Target) -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(target);

    builder
}
