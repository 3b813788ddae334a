// src/report/collector.rs
//! Gathers the values for one report
//!
//! Every source is queried independently and concurrently; a failed fetch
//! only leaves its own placeholders unresolved.

use crate::network::{MarketSource, NetworkSource, NodeSource, PoolSource};
use crate::report::format;
use crate::report::template::MetricSnapshot;
use crate::report::tracker::BlockTimer;
use crate::types::{CoinId, CoinTicker};
use crate::utils::error::BotError;
use std::sync::Arc;

/// Market data plus the embed metadata that goes with it
#[derive(Debug, Clone)]
pub struct MarketReport {
    /// Values for the market template
    pub snapshot: MetricSnapshot,
    /// Coin name for the embed author line
    pub name: String,
    /// Link to the coin's details page
    pub coin_url: String,
    /// Icon for the embed author line, when one could be found
    pub icon_url: Option<String>,
}

/// Queries all sources and turns the answers into metric snapshots
#[derive(Clone)]
pub struct MetricCollector {
    network: Arc<dyn NetworkSource>,
    node: Arc<dyn NodeSource>,
    pool: Arc<dyn PoolSource>,
    market: Arc<dyn MarketSource>,
    timer: Arc<BlockTimer>,
}

impl MetricCollector {
    /// Creates a collector over the given sources
    pub fn new(
        network: Arc<dyn NetworkSource>,
        node: Arc<dyn NodeSource>,
        pool: Arc<dyn PoolSource>,
        market: Arc<dyn MarketSource>,
        timer: Arc<BlockTimer>,
    ) -> Self {
        MetricCollector {
            network,
            node,
            pool,
            market,
            timer,
        }
    }

    /// The block timer read by pool reports
    pub fn timer(&self) -> &Arc<BlockTimer> {
        &self.timer
    }

    /// Values for the pool status report
    ///
    /// Never fails: each missing figure is logged and left out.
    pub async fn pool_report(&self) -> MetricSnapshot {
        let (network, chain, pool, luck) = tokio::join!(
            self.network.network_hashrate(),
            self.node.blockchain_info(),
            self.pool.pool_stats(),
            self.pool.luck_history(),
        );

        let mut snapshot = MetricSnapshot::new();

        let network_ghs = available("network hashrate", network).map(format::to_gigahashes);
        snapshot.insert_opt("network_hashrate", network_ghs.map(format::decimal));

        if let Some(info) = available("blockchain info", chain) {
            snapshot.insert("block_height", info.blocks);
            snapshot.insert("difficulty", format::decimal(info.difficulty));
        }

        let pool_ghs = available("pool stats", pool).map(|stats| {
            snapshot.insert("workers", stats.workers);
            format::to_gigahashes(stats.average_hashrate)
        });
        snapshot.insert_opt("pool_hashrate", pool_ghs.map(format::decimal));

        if let (Some(pool_ghs), Some(network_ghs)) = (pool_ghs, network_ghs) {
            snapshot.insert_opt(
                "percentage",
                format::share_percentage(pool_ghs, network_ghs).map(format::decimal),
            );
        }

        if let Some(ratios) = available("luck history", luck) {
            snapshot.insert_opt("avg_luck", format::average_luck(&ratios).map(format::decimal));
        }

        snapshot.insert("time_since", self.timer.time_since());
        snapshot
    }

    /// Values and embed metadata for the market report
    ///
    /// # Errors
    /// Fails when the ticker cannot be fetched; a missing icon is not an error.
    pub async fn market_report(&self, coin: &CoinId) -> Result<MarketReport, BotError> {
        let (ticker, icon) = tokio::join!(self.market.ticker(coin), self.market.icon_url(coin));
        let ticker: CoinTicker = ticker?;

        Ok(MarketReport {
            snapshot: ticker.to_snapshot(),
            name: ticker.name().unwrap_or(coin.as_str()).to_string(),
            coin_url: self.market.coin_url(coin),
            icon_url: available("coin icon", icon).flatten(),
        })
    }

    /// Values for the per-address worker report
    ///
    /// # Errors
    /// `BotError::NotMining` when the address has no active workers, or any
    /// transport error from the pool.
    pub async fn worker_report(&self, address: &str) -> Result<MetricSnapshot, BotError> {
        let stats = self.pool.worker_stats(address).await?;
        Ok(stats.to_snapshot(address))
    }

    /// Asks the node whether `address` is valid
    pub async fn validate_address(&self, address: &str) -> Result<bool, BotError> {
        self.node.validate_address(address).await
    }
}

/// Keeps a successful value, logging why a failed one is missing
fn available<T>(what: &str, result: Result<T, BotError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_unavailable() => {
            log::debug!("{} skipped: {}", what, e);
            None
        }
        Err(e) => {
            log::warn!("{} skipped: {}", what, e);
            None
        }
    }
}
