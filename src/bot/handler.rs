// src/bot/handler.rs
//! Command parsing and dispatch
//!
//! Turns one inbound chat message into at most one reply. All failures are
//! resolved here: domain outcomes become user-facing text, anything else is
//! logged and answered with a short apology.

use crate::bot::registry::Registry;
use crate::report::collector::MetricCollector;
use crate::report::template::{INFO_TEMPLATE, MARKET_TEMPLATE, Template, WORKER_TEMPLATE};
use crate::types::CoinId;
use crate::utils::error::BotError;
use std::sync::Arc;

/// A chat message as the handler sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Id of the message author
    pub author_id: String,
    /// Id of the channel the message was posted in
    pub channel_id: String,
    /// Raw message text
    pub content: String,
}

/// Rich message with an author line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// Author line text
    pub author_name: String,
    /// Link behind the author line
    pub author_url: String,
    /// Small icon next to the author line
    pub icon_url: Option<String>,
    /// Body text
    pub description: String,
}

/// What the bot sends back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain message text
    Text(String),
    /// Embedded card
    Embed(Embed),
}

/// Commands the bot understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!info`: pool status
    Info,
    /// `!cmc [coin]`: market data; `None` means the default coin
    Market(Option<CoinId>),
    /// `!myinfo`: stats for the caller's registered address
    MyInfo,
    /// `!register <address>`; `None` when the address was left out
    Register(Option<String>),
}

impl Command {
    /// Parses the first space-delimited word of `content`
    ///
    /// Returns `None` for anything that is not a command.
    pub fn parse(content: &str) -> Option<Command> {
        let mut words = content.split(' ');
        let keyword = words.next()?;
        let argument = words.next().filter(|word| !word.is_empty());

        match keyword {
            "!info" => Some(Command::Info),
            "!cmc" => Some(Command::Market(argument.and_then(|word| word.parse().ok()))),
            "!myinfo" => Some(Command::MyInfo),
            "!register" => Some(Command::Register(argument.map(str::to_string))),
            _ => None,
        }
    }
}

/// Reply text for a user with no registered address
pub const NOT_REGISTERED: &str =
    "You have not registered an address yet. Use `!register <address>` first.";

/// Reply text for `!register` without an address
pub const REGISTER_USAGE: &str = "Usage: `!register <address>`";

/// Reply text when a service the command needs is down
pub const UNAVAILABLE: &str = "A required service is unavailable right now, please try again later.";

/// Reply text when a handler fails for reasons the user cannot fix
pub const INTERNAL_ERROR: &str = "Something went wrong, please try again later.";

/// Dispatches inbound messages to report builders
pub struct CommandHandler {
    collector: MetricCollector,
    registry: Arc<Registry>,
    reset_channel_id: String,
    default_coin: CoinId,
    info: Template,
    market: Template,
    worker: Template,
}

impl CommandHandler {
    /// Creates a handler
    ///
    /// # Arguments
    /// * `collector` - Source of report values, including the block timer
    /// * `registry` - Address registrations
    /// * `reset_channel_id` - Channel whose messages mark a found block
    /// * `default_coin` - Coin used by `!cmc` without an argument
    pub fn new(
        collector: MetricCollector,
        registry: Arc<Registry>,
        reset_channel_id: impl Into<String>,
        default_coin: CoinId,
    ) -> Self {
        CommandHandler {
            collector,
            registry,
            reset_channel_id: reset_channel_id.into(),
            default_coin,
            info: Template::parse(INFO_TEMPLATE),
            market: Template::parse(MARKET_TEMPLATE),
            worker: Template::parse(WORKER_TEMPLATE),
        }
    }

    /// Handles one message, returning the reply to send, if any
    pub async fn handle(&self, message: &InboundMessage) -> Option<Reply> {
        if message.channel_id == self.reset_channel_id {
            log::info!("Block notification received, resetting block timer");
            self.collector.timer().reset();
            return None;
        }

        let command = Command::parse(&message.content)?;
        log::debug!("{:?} from {} in {}", command, message.author_id, message.channel_id);

        let reply = match command {
            Command::Info => Ok(self.info_reply().await),
            Command::Market(coin) => {
                let coin = coin.unwrap_or_else(|| self.default_coin.clone());
                self.market_reply(&coin).await
            }
            Command::MyInfo => self.my_info_reply(&message.author_id).await,
            Command::Register(None) => Ok(Reply::Text(REGISTER_USAGE.to_string())),
            Command::Register(Some(address)) => {
                self.register_reply(&message.author_id, &address).await
            }
        };

        Some(reply.unwrap_or_else(|e| Reply::Text(error_text(&e))))
    }

    async fn info_reply(&self) -> Reply {
        let snapshot = self.collector.pool_report().await;
        Reply::Text(self.info.render(&snapshot))
    }

    async fn market_reply(&self, coin: &CoinId) -> Result<Reply, BotError> {
        let report = match self.collector.market_report(coin).await {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Market data for {} unavailable: {}", coin, e);
                return Ok(Reply::Text(format!(
                    "Could not retrieve market data for `{}`.",
                    coin
                )));
            }
        };

        Ok(Reply::Embed(Embed {
            author_name: format!("{} | CoinMarketCap", report.name),
            author_url: report.coin_url,
            icon_url: report.icon_url,
            description: self.market.render(&report.snapshot),
        }))
    }

    async fn my_info_reply(&self, user: &str) -> Result<Reply, BotError> {
        let address = self.registry.lookup(user).await?;
        let snapshot = self.collector.worker_report(&address).await?;
        Ok(Reply::Text(self.worker.render(&snapshot)))
    }

    async fn register_reply(&self, user: &str, address: &str) -> Result<Reply, BotError> {
        if !self.collector.validate_address(address).await? {
            return Err(BotError::InvalidAddress(address.to_string()));
        }
        self.registry.register(user, address).await?;
        log::info!("User {} registered {}", user, address);
        Ok(Reply::Text(format!("Registered address `{}`.", address)))
    }
}

/// User-facing text for a failed command
fn error_text(error: &BotError) -> String {
    match error {
        BotError::NotRegistered(_) => NOT_REGISTERED.to_string(),
        BotError::NotMining(address) => {
            format!("Address `{}` is not currently mining on the pool.", address)
        }
        BotError::InvalidAddress(address) => format!("Address `{}` is not valid.", address),
        BotError::Unavailable { endpoint, status } => {
            log::warn!("{} answered HTTP {}", endpoint, status);
            UNAVAILABLE.to_string()
        }
        other => {
            log::error!("Command failed: {}", other);
            INTERNAL_ERROR.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::registry::tests::scratch_path;
    use crate::report::collector::tests::{FakeSources, collector_over};
    use crate::types::WorkerStats;
    use serde_json::json;
    use test_case::test_case;

    const RESET_CHANNEL: &str = "999";

    fn message(author: &str, channel: &str, content: &str) -> InboundMessage {
        InboundMessage {
            author_id: author.into(),
            channel_id: channel.into(),
            content: content.into(),
        }
    }

    async fn handler_over(sources: FakeSources, label: &str) -> CommandHandler {
        let registry = Registry::open(scratch_path(label)).await.unwrap();
        CommandHandler::new(
            collector_over(sources),
            Arc::new(registry),
            RESET_CHANNEL,
            CoinId::default(),
        )
    }

    fn text(reply: Option<Reply>) -> String {
        match reply {
            Some(Reply::Text(text)) => text,
            other => panic!("expected a text reply, got {other:?}"),
        }
    }

    #[test_case("!info", Some(Command::Info) ; "info")]
    #[test_case("!info extra words", Some(Command::Info) ; "info ignores arguments")]
    #[test_case("!cmc", Some(Command::Market(None)) ; "cmc default coin")]
    #[test_case("!cmc bitcoin", Some(Command::Market(Some("bitcoin".parse().unwrap()))) ; "cmc with coin")]
    #[test_case("!cmc bit-coin", Some(Command::Market(None)) ; "cmc rejects non alphanumeric")]
    #[test_case("!myinfo", Some(Command::MyInfo) ; "myinfo")]
    #[test_case("!register GAddr", Some(Command::Register(Some("GAddr".into()))) ; "register")]
    #[test_case("!register", Some(Command::Register(None)) ; "register without address")]
    #[test_case("!INFO", None ; "keywords are case sensitive")]
    #[test_case("hello !info", None ; "command must come first")]
    #[test_case("", None ; "empty message")]
    fn test_command_parse(content: &str, expected: Option<Command>) {
        assert_eq!(Command::parse(content), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_channel_resets_timer_without_reply() {
        let handler = handler_over(FakeSources::healthy(), "reset").await;
        tokio::time::advance(std::time::Duration::from_secs(500)).await;

        let reply = handler.handle(&message("1", RESET_CHANNEL, "!info")).await;
        assert_eq!(reply, None, "reset channel never gets a reply");

        tokio::time::advance(std::time::Duration::from_secs(7)).await;
        let report = text(handler.handle(&message("1", "42", "!info")).await);
        assert!(report.contains("Time Since Last Block: 00:00:07"), "{report}");
    }

    #[tokio::test]
    async fn test_non_command_is_ignored() {
        let handler = handler_over(FakeSources::healthy(), "ignored").await;
        assert_eq!(handler.handle(&message("1", "42", "gm")).await, None);
    }

    #[tokio::test]
    async fn test_info_report() {
        let handler = handler_over(FakeSources::healthy(), "info").await;
        let report = text(handler.handle(&message("1", "42", "!info")).await);
        assert!(report.starts_with("```Block Height: 812345\n"), "{report}");
        assert!(report.contains("Network Hashrate: 5.0 GH/s"), "{report}");
        assert!(report.contains("Pool Average Luck: 100.0%"), "{report}");
    }

    #[tokio::test]
    async fn test_myinfo_before_register() {
        let handler = handler_over(FakeSources::healthy(), "unregistered").await;
        let reply = text(handler.handle(&message("7", "42", "!myinfo")).await);
        assert_eq!(reply, NOT_REGISTERED);
    }

    #[tokio::test]
    async fn test_register_then_myinfo() {
        let mut sources = FakeSources::healthy();
        sources.valid_addresses.insert("GValidAddr".into());
        sources.workers.lock().unwrap().push((
            "GValidAddr".into(),
            WorkerStats {
                payout: 3.5,
                percentage: 1.25,
                hashrate: 1.5e6,
            },
        ));
        let handler = handler_over(sources, "roundtrip").await;

        let reply = text(handler.handle(&message("7", "42", "!register GValidAddr")).await);
        assert_eq!(reply, "Registered address `GValidAddr`.");

        let report = text(handler.handle(&message("7", "42", "!myinfo")).await);
        assert!(report.contains("Address: GValidAddr"), "{report}");
        assert!(report.contains("Estimated Hashrate: 1.5 MH/s"), "{report}");
        assert!(report.contains("Expected Payout: 3.5 GRLC"), "{report}");
        assert!(report.contains("Share of Pool: 1.25%"), "{report}");
    }

    #[tokio::test]
    async fn test_register_invalid_address() {
        let handler = handler_over(FakeSources::healthy(), "invalid").await;
        let reply = text(handler.handle(&message("7", "42", "!register nope")).await);
        assert_eq!(reply, "Address `nope` is not valid.");

        let reply = text(handler.handle(&message("7", "42", "!myinfo")).await);
        assert_eq!(reply, NOT_REGISTERED, "an invalid address must not be stored");
    }

    #[tokio::test]
    async fn test_myinfo_not_mining() {
        let mut sources = FakeSources::healthy();
        sources.valid_addresses.insert("GIdle".into());
        let handler = handler_over(sources, "idle").await;

        handler.handle(&message("7", "42", "!register GIdle")).await;
        let reply = text(handler.handle(&message("7", "42", "!myinfo")).await);
        assert_eq!(reply, "Address `GIdle` is not currently mining on the pool.");
    }

    #[tokio::test]
    async fn test_register_usage() {
        let handler = handler_over(FakeSources::healthy(), "usage").await;
        let reply = text(handler.handle(&message("7", "42", "!register")).await);
        assert_eq!(reply, REGISTER_USAGE);
    }

    #[tokio::test]
    async fn test_market_embed() {
        let handler = handler_over(
            FakeSources {
                ticker: Some(json!({
                    "name": "Garlicoin",
                    "symbol": "GRLC",
                    "rank": "400",
                    "price_usd": "0.0512",
                    "price_btc": "0.00000123",
                    "market_cap_usd": "3000000.0",
                    "available_supply": "60000000.0"
                })),
                ..FakeSources::default()
            },
            "market",
        )
        .await;

        match handler.handle(&message("7", "42", "!cmc")).await {
            Some(Reply::Embed(embed)) => {
                assert_eq!(embed.author_name, "Garlicoin | CoinMarketCap");
                assert_eq!(embed.author_url, "https://market.example/currencies/garlicoin/");
                assert_eq!(embed.icon_url, None);
                assert!(embed.description.contains("**Rank:** 400"), "{}", embed.description);
                assert!(
                    embed.description.contains("**Circulating Supply:** 60000000.0 GRLC"),
                    "{}",
                    embed.description
                );
            }
            other => panic!("expected an embed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_market_unavailable() {
        let handler = handler_over(FakeSources::default(), "market-down").await;
        let reply = text(handler.handle(&message("7", "42", "!cmc dogecoin")).await);
        assert_eq!(reply, "Could not retrieve market data for `dogecoin`.");
    }
}
