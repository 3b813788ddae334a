// src/bot/gateway.rs

//! Chat gateway session
//!
//! Holds the websocket session with the Discord gateway:
//! - Hello / Identify handshake, with the presence string
//! - Heartbeats at the interval the gateway asks for
//! - Dispatch of `MESSAGE_CREATE` events to the command handler
//!
//! Each message is handled on its own task so a slow report never blocks
//! the heartbeat or a block notification arriving behind it.
use crate::bot::handler::{CommandHandler, InboundMessage};
use crate::bot::rest::RestClient;
use crate::utils::error::BotError;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tungstenite::protocol::Message;
use url::Url;

/// Gateway opcodes used by the bot
mod op {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// GUILDS | GUILD_MESSAGES | DIRECT_MESSAGES | MESSAGE_CONTENT
const INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 12) | (1 << 15);

/// Configuration for the chat connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token
    #[serde(default)]
    pub token: String,
    /// Channel whose messages mark a block found by the pool
    #[serde(default)]
    pub reset_channel_id: String,
    /// Text shown as the bot's current activity
    #[serde(default = "default_presence")]
    pub presence: String,
    /// Gateway websocket URL
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    /// REST API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Pause before opening a new session after the gateway ends one
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

fn default_presence() -> String {
    "!info | !cmc".into()
}

fn default_gateway_url() -> String {
    "wss://gateway.discord.gg/?v=10&encoding=json".into()
}

fn default_api_url() -> String {
    "https://discord.com/api/v10".into()
}

fn default_reconnect_delay() -> u64 {
    5
}

impl Default for DiscordConfig {
    fn default() -> Self {
        DiscordConfig {
            token: String::new(),
            reset_channel_id: String::new(),
            presence: default_presence(),
            gateway_url: default_gateway_url(),
            api_url: default_api_url(),
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

/// One gateway frame
#[derive(Debug, Clone, Deserialize)]
struct Payload {
    op: u8,
    #[serde(default)]
    d: Value,
    #[serde(default)]
    s: Option<u64>,
    #[serde(default)]
    t: Option<String>,
}

/// Why a gateway session ended without a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The gateway asked us to reconnect
    Reconnect,
    /// The gateway rejected the session
    InvalidSession,
    /// A heartbeat went unacknowledged
    MissedHeartbeat,
    /// The websocket was closed
    Closed,
}

/// Client for the chat gateway
pub struct GatewayClient {
    /// Connection configuration
    config: DiscordConfig,
    /// Turns messages into replies
    handler: Arc<CommandHandler>,
    /// Delivers replies
    rest: RestClient,
    /// Our own user id, learned from `READY`
    self_id: Option<String>,
    /// Last dispatch sequence number, echoed in heartbeats
    sequence: Option<u64>,
}

impl GatewayClient {
    /// Creates a new GatewayClient
    ///
    /// # Arguments
    /// * `config` - Gateway and REST settings
    /// * `handler` - Command handler shared with spawned message tasks
    /// * `rest` - REST client used to post replies
    pub fn new(config: DiscordConfig, handler: Arc<CommandHandler>, rest: RestClient) -> Self {
        GatewayClient {
            config,
            handler,
            rest,
            self_id: None,
            sequence: None,
        }
    }

    /// Keeps a session open, starting a new one whenever the gateway ends one
    ///
    /// # Errors
    /// Returns the first transport or protocol error
    pub async fn serve(&mut self) -> Result<(), BotError> {
        loop {
            let end = self.run().await?;
            log::warn!(
                "Gateway session ended ({:?}), reconnecting in {}s",
                end,
                self.config.reconnect_delay_secs
            );
            time::sleep(Duration::from_secs(self.config.reconnect_delay_secs)).await;
        }
    }

    /// Runs one gateway session until the gateway ends it
    ///
    /// # Errors
    /// Returns `BotError` if:
    /// - The gateway URL is invalid
    /// - The websocket handshake or a read/write fails
    /// - The first frame is not Hello
    pub async fn run(&mut self) -> Result<SessionEnd, BotError> {
        let url = Url::parse(&self.config.gateway_url)
            .map_err(|e| BotError::ConfigError(format!("Invalid gateway URL: {}", e)))?;
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (mut sink, mut stream) = ws.split();
        log::info!("Connected to gateway {}", url.host_str().unwrap_or_default());

        let hello = match stream.next().await {
            Some(Ok(Message::Text(text))) => serde_json::from_str::<Payload>(text.as_str())?,
            Some(Ok(other)) => {
                return Err(BotError::ProtocolError(format!("Expected Hello, got {:?}", other)));
            }
            Some(Err(e)) => return Err(e.into()),
            None => return Ok(SessionEnd::Closed),
        };
        let period = heartbeat_interval(&hello)?;

        sink.send(Message::text(
            identify_payload(&self.config.token, &self.config.presence).to_string(),
        ))
        .await?;

        let mut heartbeat = time::interval_at(Instant::now() + period, period);
        let mut acked = true;

        loop {
            tokio::select! {
                msg = stream.next() => {
                    let payload = match msg {
                        Some(Ok(Message::Text(text))) => serde_json::from_str::<Payload>(text.as_str())?,
                        Some(Ok(Message::Close(frame))) => {
                            log::info!("Gateway closed the connection: {:?}", frame);
                            return Ok(SessionEnd::Closed);
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(e.into()),
                        None => return Ok(SessionEnd::Closed),
                    };

                    match payload.op {
                        op::DISPATCH => {
                            if payload.s.is_some() {
                                self.sequence = payload.s;
                            }
                            self.dispatch(payload.t.as_deref(), &payload.d);
                        }
                        op::HEARTBEAT => {
                            sink.send(Message::text(heartbeat_payload(self.sequence).to_string())).await?;
                        }
                        op::HEARTBEAT_ACK => acked = true,
                        op::RECONNECT => return Ok(SessionEnd::Reconnect),
                        op::INVALID_SESSION => return Ok(SessionEnd::InvalidSession),
                        other => log::debug!("Ignoring gateway op {}", other),
                    }
                }
                _ = heartbeat.tick() => {
                    if !acked {
                        return Ok(SessionEnd::MissedHeartbeat);
                    }
                    acked = false;
                    sink.send(Message::text(heartbeat_payload(self.sequence).to_string())).await?;
                }
            }
        }
    }

    /// Handles one dispatch event
    fn dispatch(&mut self, event: Option<&str>, data: &Value) {
        match event {
            Some("READY") => {
                self.self_id = data["user"]["id"].as_str().map(str::to_string);
                log::info!(
                    "Session ready as {}",
                    data["user"]["username"].as_str().unwrap_or("unknown user")
                );
            }
            Some("MESSAGE_CREATE") => {
                let Some(message) = parse_message(data) else {
                    log::debug!("Skipping malformed MESSAGE_CREATE");
                    return;
                };
                if self.self_id.as_deref() == Some(message.author_id.as_str()) {
                    return;
                }

                let handler = Arc::clone(&self.handler);
                let rest = self.rest.clone();
                tokio::spawn(async move {
                    if let Some(reply) = handler.handle(&message).await {
                        if let Err(e) = rest.send(&message.channel_id, &reply).await {
                            log::error!("Failed to reply in {}: {}", message.channel_id, e);
                        }
                    }
                });
            }
            _ => {}
        }
    }
}

/// Reads `heartbeat_interval` out of a Hello frame
fn heartbeat_interval(hello: &Payload) -> Result<Duration, BotError> {
    if hello.op != op::HELLO {
        return Err(BotError::ProtocolError(format!(
            "Expected Hello, got op {}",
            hello.op
        )));
    }
    hello.d["heartbeat_interval"]
        .as_u64()
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .ok_or_else(|| BotError::ProtocolError("Hello without heartbeat_interval".to_string()))
}

/// Identify frame carrying the token, intents and presence
fn identify_payload(token: &str, presence: &str) -> Value {
    json!({
        "op": op::IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "pool-status-bot",
                "device": "pool-status-bot"
            },
            "presence": {
                "since": null,
                "activities": [{ "name": presence, "type": 0 }],
                "status": "online",
                "afk": false
            }
        }
    })
}

fn heartbeat_payload(sequence: Option<u64>) -> Value {
    json!({ "op": op::HEARTBEAT, "d": sequence })
}

/// Extracts the fields the handler needs from a `MESSAGE_CREATE` body
fn parse_message(data: &Value) -> Option<InboundMessage> {
    Some(InboundMessage {
        author_id: data["author"]["id"].as_str()?.to_string(),
        channel_id: data["channel_id"].as_str()?.to_string(),
        content: data["content"].as_str().unwrap_or_default().to_string(),
    })
}
