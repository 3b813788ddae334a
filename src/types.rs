// src/types.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::report::format;
use crate::report::template::MetricSnapshot;

/// Identifier of a coin on the market data site (e.g. `garlicoin`)
///
/// Only ASCII letters and digits are accepted, since the id is pasted into
/// request URLs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CoinId(String);

impl CoinId {
    /// The id as it appears in URLs
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The pool's own coin
impl Default for CoinId {
    fn default() -> Self {
        CoinId("garlicoin".to_string())
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CoinId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()) {
            Ok(CoinId(s.to_string()))
        } else {
            Err(format!("Invalid coin id: {}", s))
        }
    }
}

impl TryFrom<String> for CoinId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CoinId> for String {
    fn from(id: CoinId) -> Self {
        id.0
    }
}

/// Chain tip summary returned by `getblockchaininfo`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockchainInfo {
    /// Current block height
    pub blocks: u64,
    /// Current proof-of-work difficulty
    pub difficulty: f64,
}

/// Aggregate pool statistics
#[derive(Debug, Clone, PartialEq)]
pub struct PoolStats {
    /// Average pool hash rate in H/s
    pub average_hashrate: f64,
    /// Connected workers
    pub workers: u64,
}

/// Statistics for one payout address on the pool
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerStats {
    /// Coins expected in the next payout
    pub payout: f64,
    /// Share of the next payout, in percent
    pub percentage: f64,
    /// Estimated hash rate in H/s
    pub hashrate: f64,
}

/// Market data for one coin, kept as the raw property map
///
/// The ticker API returns every field as a string or number; all scalar
/// properties are exposed to the market template under their own names.
#[derive(Debug, Clone, PartialEq)]
pub struct CoinTicker {
    properties: Map<String, Value>,
}

impl CoinTicker {
    /// Wraps a ticker object
    pub fn new(properties: Map<String, Value>) -> Self {
        CoinTicker { properties }
    }

    /// Display name reported by the ticker
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }

    /// Scalar properties as template values; nested values and nulls are skipped
    pub fn to_snapshot(&self) -> MetricSnapshot {
        let mut snapshot = MetricSnapshot::new();
        for (key, value) in &self.properties {
            match value {
                Value::String(s) => snapshot.insert(key.as_str(), s),
                Value::Number(n) => snapshot.insert(key.as_str(), n),
                Value::Bool(b) => snapshot.insert(key.as_str(), b),
                _ => {}
            }
        }
        snapshot
    }
}

/// Reads a JSON number, or a string holding one
pub fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl WorkerStats {
    /// Fills the worker report values for `address`
    pub fn to_snapshot(&self, address: &str) -> MetricSnapshot {
        let mut snapshot = MetricSnapshot::new();
        snapshot.insert("address", address);
        snapshot.insert("hashrate", format::decimal(self.hashrate / format::MEGA));
        snapshot.insert("payout", format::decimal(self.payout));
        snapshot.insert("percentage", format::decimal(self.percentage));
        snapshot
    }
}
