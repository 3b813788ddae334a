// src/network/market.rs
//! Market data client
//!
//! Fetches the coin ticker as JSON and scrapes the coin's details page for
//! its 32x32 icon. Icon lookups are memoized in a bounded cache with a
//! time-to-live, so a long-running bot neither re-scrapes on every command
//! nor grows without limit.

use crate::network::{MarketSource, ensure_success, join_url};
use crate::types::{CoinId, CoinTicker};
use crate::utils::error::BotError;
use async_trait::async_trait;
use lazy_static::lazy_static;
use moka::future::Cache;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

lazy_static! {
    static ref ICON_LINK: Regex = Regex::new(r#"href="([^"]+/img/coins/32x32/[^"]+)""#).unwrap();
}

/// Configuration for the market data site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Ticker API base; the coin id is appended as a path segment
    #[serde(default = "default_ticker_url")]
    pub ticker_url: String,
    /// Coin details page base; the coin id is appended as a path segment
    #[serde(default = "default_coin_page_url")]
    pub coin_page_url: String,
    /// Coin reported by `!cmc` without an argument
    #[serde(default)]
    pub default_coin: CoinId,
    /// Maximum number of cached icon URLs
    #[serde(default = "default_icon_capacity")]
    pub icon_cache_capacity: u64,
    /// Seconds before a cached icon URL is looked up again
    #[serde(default = "default_icon_ttl")]
    pub icon_cache_ttl_secs: u64,
}

fn default_ticker_url() -> String {
    "https://api.coinmarketcap.com/v1/ticker".into()
}

fn default_coin_page_url() -> String {
    "https://coinmarketcap.com/currencies".into()
}

fn default_icon_capacity() -> u64 {
    256
}

fn default_icon_ttl() -> u64 {
    6 * 60 * 60
}

impl Default for MarketConfig {
    fn default() -> Self {
        MarketConfig {
            ticker_url: default_ticker_url(),
            coin_page_url: default_coin_page_url(),
            default_coin: CoinId::default(),
            icon_cache_capacity: default_icon_capacity(),
            icon_cache_ttl_secs: default_icon_ttl(),
        }
    }
}

/// Client for the ticker API and coin pages
pub struct MarketClient {
    config: MarketConfig,
    client: Client,
    icons: Cache<CoinId, String>,
}

impl MarketClient {
    /// Creates a new MarketClient sharing `client`
    pub fn new(config: MarketConfig, client: Client) -> Self {
        let icons = Cache::builder()
            .max_capacity(config.icon_cache_capacity)
            .time_to_live(Duration::from_secs(config.icon_cache_ttl_secs))
            .build();
        MarketClient {
            config,
            client,
            icons,
        }
    }

    async fn scrape_icon(&self, coin: &CoinId) -> Result<Option<String>, BotError> {
        let url = self.coin_url(coin);
        let response = self.client.get(&url).send().await?;
        let html = ensure_success(response, &url)?.text().await?;
        Ok(find_icon(&html))
    }
}

#[async_trait]
impl MarketSource for MarketClient {
    async fn ticker(&self, coin: &CoinId) -> Result<CoinTicker, BotError> {
        let url = join_url(&self.config.ticker_url, &format!("{}/", coin));
        let response = self.client.get(&url).send().await?;
        let body: Value = ensure_success(response, &url)?.json().await?;
        parse_ticker(body)
    }

    async fn icon_url(&self, coin: &CoinId) -> Result<Option<String>, BotError> {
        if let Some(icon) = self.icons.get(coin).await {
            return Ok(Some(icon));
        }

        let icon = self.scrape_icon(coin).await?;
        if let Some(icon) = &icon {
            log::debug!("Caching icon for {}: {}", coin, icon);
            self.icons.insert(coin.clone(), icon.clone()).await;
        }
        Ok(icon)
    }

    fn coin_url(&self, coin: &CoinId) -> String {
        join_url(&self.config.coin_page_url, &format!("{}/", coin))
    }
}

/// First icon link on a coin details page
fn find_icon(html: &str) -> Option<String> {
    ICON_LINK
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// The ticker API wraps the coin object in a one-element array
fn parse_ticker(body: Value) -> Result<CoinTicker, BotError> {
    match body {
        Value::Array(mut items) if !items.is_empty() => match items.swap_remove(0) {
            Value::Object(properties) => Ok(CoinTicker::new(properties)),
            other => Err(BotError::ParseError(format!("Ticker entry is not an object: {}", other))),
        },
        other => Err(BotError::ParseError(format!("Unexpected ticker body: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::tests::canned_server;
    use serde_json::json;

    const PAGE: &str = r#"<html><head>
        <link rel="stylesheet" href="/static/site.css">
        <link rel="icon" href="https://files.example.com/static/img/coins/32x32/garlicoin.png">
        <link rel="icon" href="https://files.example.com/static/img/coins/64x64/garlicoin.png">
        </head></html>"#;

    #[test]
    fn test_find_icon() {
        assert_eq!(
            find_icon(PAGE).as_deref(),
            Some("https://files.example.com/static/img/coins/32x32/garlicoin.png")
        );
        assert_eq!(find_icon("<html></html>"), None);
    }

    #[test]
    fn test_parse_ticker() {
        let ticker = parse_ticker(json!([{"id": "garlicoin", "name": "Garlicoin", "rank": "400"}]))
            .unwrap();
        assert_eq!(ticker.name(), Some("Garlicoin"));
        assert_eq!(ticker.to_snapshot().get("rank"), Some("400"));
    }

    #[test]
    fn test_parse_ticker_rejects_error_body() {
        assert!(parse_ticker(json!({"error": "id not found"})).is_err());
        assert!(parse_ticker(json!([])).is_err());
    }

    #[test]
    fn test_coin_url() {
        let client = MarketClient::new(MarketConfig::default(), Client::new());
        let coin: CoinId = "garlicoin".parse().unwrap();
        assert_eq!(
            client.coin_url(&coin),
            "https://coinmarketcap.com/currencies/garlicoin/"
        );
    }

    #[tokio::test]
    async fn test_icon_cache_serves_cached_value() {
        let client = MarketClient::new(MarketConfig::default(), Client::new());
        let coin: CoinId = "garlicoin".parse().unwrap();
        client
            .icons
            .insert(coin.clone(), "https://cdn.example/32x32/garlicoin.png".into())
            .await;
        // Served from the cache, so no request leaves the process.
        let icon = client.icon_url(&coin).await.unwrap();
        assert_eq!(icon.as_deref(), Some("https://cdn.example/32x32/garlicoin.png"));
    }

    #[tokio::test]
    async fn test_icon_scraped_once_then_cached() {
        // One response only: a second scrape would find nobody listening.
        let base = canned_server(vec![(200, PAGE)]).await;
        let config = MarketConfig {
            coin_page_url: base,
            ..MarketConfig::default()
        };
        let client = MarketClient::new(config, Client::new());
        let coin: CoinId = "garlicoin".parse().unwrap();
        let expected = Some("https://files.example.com/static/img/coins/32x32/garlicoin.png");

        assert_eq!(client.icon_url(&coin).await.unwrap().as_deref(), expected);
        assert_eq!(client.icon_url(&coin).await.unwrap().as_deref(), expected);
    }

    #[tokio::test]
    async fn test_page_without_icon_is_not_cached() {
        let base = canned_server(vec![(200, "<html></html>"), (200, PAGE)]).await;
        let config = MarketConfig {
            coin_page_url: base,
            ..MarketConfig::default()
        };
        let client = MarketClient::new(config, Client::new());
        let coin: CoinId = "garlicoin".parse().unwrap();

        assert_eq!(client.icon_url(&coin).await.unwrap(), None);
        assert!(client.icon_url(&coin).await.unwrap().is_some());
    }
}
