// src/network/explorer.rs
use crate::network::{NetworkSource, ensure_success};
use crate::utils::error::BotError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Configuration for the block explorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// Endpoint answering with the network hash rate as plain text (H/s)
    #[serde(default = "default_hashrate_url")]
    pub network_hashrate_url: String,
}

fn default_hashrate_url() -> String {
    "https://garli.co.in/api/getnetworkhashps".into()
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            network_hashrate_url: default_hashrate_url(),
        }
    }
}

/// Client for the block explorer's plain-text API
pub struct ExplorerClient {
    config: ExplorerConfig,
    client: Client,
}

impl ExplorerClient {
    /// Creates a new ExplorerClient sharing `client`
    pub fn new(config: ExplorerConfig, client: Client) -> Self {
        ExplorerClient { config, client }
    }
}

#[async_trait]
impl NetworkSource for ExplorerClient {
    async fn network_hashrate(&self) -> Result<f64, BotError> {
        let url = &self.config.network_hashrate_url;
        let response = self.client.get(url).send().await?;
        let body = ensure_success(response, url)?.text().await?;
        parse_hashrate(&body)
    }
}

/// Parses the explorer's plain numeric body
fn parse_hashrate(body: &str) -> Result<f64, BotError> {
    body.trim()
        .parse::<f64>()
        .map_err(|_| BotError::ParseError(format!("network hashrate {:?}", body.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hashrate() {
        assert_eq!(parse_hashrate("5000000000\n").unwrap(), 5e9);
        assert_eq!(parse_hashrate("1.25e10").unwrap(), 1.25e10);
        assert!(matches!(parse_hashrate("<html>"), Err(BotError::ParseError(_))));
    }
}
