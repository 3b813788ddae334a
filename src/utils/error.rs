// src/utils/error.rs
use serde_json;
use std::io;
use thiserror::Error;
use tokio_tungstenite::tungstenite;
use url;

/// Main error type for the bot
///
/// Every fallible operation in the crate returns this type. The first four
/// variants are the domain outcomes a command handler turns into replies;
/// the rest wrap transport and parsing failures.
#[derive(Error, Debug)]
pub enum BotError {
    /// A remote service answered with a non-success status
    #[error("{endpoint} unavailable (HTTP {status})")]
    Unavailable {
        /// URL or RPC method that was requested
        endpoint: String,
        /// HTTP status code returned
        status: u16,
    },

    /// The worker-stats endpoint reports that the address has no active workers
    #[error("Address {0} is not currently mining")]
    NotMining(String),

    /// The node rejected an address during registration
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A per-user command was issued before registering an address
    #[error("User {0} has not registered an address")]
    NotRegistered(String),

    /// The node answered a JSON-RPC call with an error object
    #[error("RPC error: {0}")]
    RpcError(String),

    /// A response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    ParseError(String),

    /// Errors in the chat gateway protocol
    #[error("Gateway protocol violation: {0}")]
    ProtocolError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    /// WebSocket communication errors
    #[error("WebSocket error: {0}")]
    WsError(#[from] tungstenite::Error),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Converts TOML parse errors into BotError
///
/// Wraps the original error in a `ConfigError` variant with context.
impl From<toml::de::Error> for BotError {
    fn from(e: toml::de::Error) -> Self {
        BotError::ConfigError(format!("Invalid config format: {}", e))
    }
}

impl BotError {
    /// Returns true for outcomes that mean "the field is simply missing"
    ///
    /// Collectors use this to decide between a quiet debug line and a warning.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BotError::Unavailable { .. })
    }
}
