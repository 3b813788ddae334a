// src/network/pool.rs

//! Mining pool API client
//!
//! Reads the pool's public JSON endpoints:
//! - `/poolstats/noheights` for hash rate and worker count
//! - `/luck` for the luck of recently found blocks
//! - `/workerinfo/<address>` for one payout address
use crate::network::{PoolSource, ensure_success, join_url};
use crate::types::{PoolStats, WorkerStats, json_number};
use crate::utils::error::BotError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Configuration for the pool API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Base URL of the pool API (e.g., "https://api.freshgarlicblocks.net")
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    "https://api.freshgarlicblocks.net".into()
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            api_url: default_api_url(),
        }
    }
}

/// Client for the pool's statistics endpoints
pub struct PoolApiClient {
    config: PoolConfig,
    client: Client,
}

impl PoolApiClient {
    /// Creates a new PoolApiClient sharing `client`
    pub fn new(config: PoolConfig, client: Client) -> Self {
        PoolApiClient { config, client }
    }

    async fn get_json(&self, path: &str) -> Result<Value, BotError> {
        let url = join_url(&self.config.api_url, path);
        let response = self.client.get(&url).send().await?;
        Ok(ensure_success(response, &url)?.json().await?)
    }
}

#[async_trait]
impl PoolSource for PoolApiClient {
    async fn pool_stats(&self) -> Result<PoolStats, BotError> {
        parse_pool_stats(&self.get_json("/poolstats/noheights").await?)
    }

    async fn luck_history(&self) -> Result<Vec<f64>, BotError> {
        parse_luck(&self.get_json("/luck").await?)
    }

    async fn worker_stats(&self, address: &str) -> Result<WorkerStats, BotError> {
        let url = join_url(&self.config.api_url, &format!("/workerinfo/{}", address));
        let response = self.client.get(&url).send().await?;
        // The pool answers 500 for addresses with no active workers.
        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            return Err(BotError::NotMining(address.to_string()));
        }
        let body: Value = ensure_success(response, &url)?.json().await?;
        parse_worker_stats(&body)
    }
}

fn parse_pool_stats(body: &Value) -> Result<PoolStats, BotError> {
    let average_hashrate = json_number(&body["averageHashrate"])
        .ok_or_else(|| BotError::ParseError("Missing averageHashrate".to_string()))?;
    let workers = json_number(&body["workers"])
        .ok_or_else(|| BotError::ParseError("Missing workers".to_string()))?;
    Ok(PoolStats {
        average_hashrate,
        workers: workers as u64,
    })
}

/// Collects the `luck` ratio of every block entry, skipping malformed ones
fn parse_luck(body: &Value) -> Result<Vec<f64>, BotError> {
    let blocks = body
        .as_array()
        .ok_or_else(|| BotError::ParseError("Luck history is not an array".to_string()))?;
    Ok(blocks
        .iter()
        .filter_map(|block| json_number(&block["luck"]))
        .collect())
}

fn parse_worker_stats(body: &Value) -> Result<WorkerStats, BotError> {
    let field = |value: &Value, name: &str| {
        json_number(value).ok_or_else(|| BotError::ParseError(format!("Missing {}", name)))
    };
    Ok(WorkerStats {
        payout: field(&body["nextpayout"]["grlc"], "nextpayout.grlc")?,
        percentage: field(&body["nextpayout"]["percentage"], "nextpayout.percentage")?,
        hashrate: field(&body["hashrate"], "hashrate")?,
    })
}
