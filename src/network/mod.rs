// src/network/mod.rs
//! Clients for the external services a report is built from
//!
//! Each service sits behind a small async trait so the collector and the
//! command handler can be driven by in-memory fakes in tests:
//! - [`NetworkSource`]: network hash rate from the block explorer
//! - [`NodeSource`]: chain info and address validation over JSON-RPC
//! - [`PoolSource`]: pool statistics, luck history and per-address stats
//! - [`MarketSource`]: coin ticker and icon from the market data site

/// Block explorer client (network hash rate)
pub mod explorer;

/// Market data client (ticker and scraped coin icons)
pub mod market;

/// Full node JSON-RPC client
pub mod node;

/// Mining pool HTTP API client
pub mod pool;

use crate::types::{BlockchainInfo, CoinId, CoinTicker, PoolStats, WorkerStats};
use crate::utils::error::BotError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Re-export main components for cleaner imports
pub use explorer::ExplorerClient;
pub use market::MarketClient;
pub use node::NodeClient;
pub use pool::PoolApiClient;

/// Network-wide figures published by a block explorer
#[async_trait]
pub trait NetworkSource: Send + Sync {
    /// Network hash rate in H/s
    async fn network_hashrate(&self) -> Result<f64, BotError>;
}

/// A full node reachable over JSON-RPC
#[async_trait]
pub trait NodeSource: Send + Sync {
    /// Current height and difficulty
    async fn blockchain_info(&self) -> Result<BlockchainInfo, BotError>;

    /// Whether the node accepts `address` as a valid address
    async fn validate_address(&self, address: &str) -> Result<bool, BotError>;
}

/// A mining pool's public statistics API
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Pool hash rate and worker count
    async fn pool_stats(&self) -> Result<PoolStats, BotError>;

    /// Luck ratios of recently found blocks
    async fn luck_history(&self) -> Result<Vec<f64>, BotError>;

    /// Statistics for one payout address
    ///
    /// # Errors
    /// `BotError::NotMining` when the pool has no workers for the address.
    async fn worker_stats(&self, address: &str) -> Result<WorkerStats, BotError>;
}

/// A coin market data site
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Current ticker for `coin`
    async fn ticker(&self, coin: &CoinId) -> Result<CoinTicker, BotError>;

    /// Icon URL for `coin`, if the details page links one
    async fn icon_url(&self, coin: &CoinId) -> Result<Option<String>, BotError>;

    /// Human-facing details page for `coin`
    fn coin_url(&self, coin: &CoinId) -> String;
}

/// Settings shared by every outgoing HTTP request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("pool-status-bot/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            request_timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Builds the HTTP client every service client shares
pub fn http_client(config: &HttpConfig) -> Result<reqwest::Client, BotError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Turns a non-success status into `BotError::Unavailable`
pub(crate) fn ensure_success(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response, BotError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BotError::Unavailable {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Joins a base URL and a path without doubling or dropping the slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
