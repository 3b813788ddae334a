//! Status reports
//!
//! This module turns fetched figures into the text the bot posts:
//! - [`MetricCollector`] queries the external sources
//! - [`Template`] substitutes a [`MetricSnapshot`] into report text
//! - [`BlockTimer`] tracks the time since the pool's last block
//!

/// Concurrent collection of report values
pub mod collector;

/// Number and duration formatting helpers
pub mod format;

/// Template parsing and rendering
pub mod template;

/// "Time since last block" state
pub mod tracker;

// Re-export main components
pub use collector::{MarketReport, MetricCollector};
pub use template::{MetricSnapshot, Template, Unresolved};
pub use tracker::BlockTimer;
