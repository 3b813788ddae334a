//! Pool Status Bot - mining pool statistics for a chat channel
//!
//! This crate answers chat commands with reports built from:
//! - A mining pool's HTTP API (hash rate, workers, luck, per-address stats)
//! - A block explorer (network hash rate)
//! - A full node's JSON-RPC interface (height, difficulty, address checks)
//! - A coin market data site (price, market cap, icon)

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Chat gateway, command handling and address registrations
pub mod bot;

/// Clients for the external services
pub mod network;

/// Report collection, templates and the block timer
pub mod report;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use bot::{CommandHandler, GatewayClient, Registry, Reply, RestClient};
pub use cli::Commands;
pub use config::Config;
pub use network::{ExplorerClient, MarketClient, NodeClient, PoolApiClient};
pub use report::{BlockTimer, MetricCollector, MetricSnapshot, Template};
pub use types::CoinId;
pub use utils::{BotError, init_logging};
