// src/main.rs
use clap::Parser;
use pool_status_bot::bot::{CommandHandler, GatewayClient, Registry, RestClient};
use pool_status_bot::network::{self, ExplorerClient, MarketClient, NodeClient, PoolApiClient};
use pool_status_bot::report::template::{INFO_TEMPLATE, MARKET_TEMPLATE, UNAVAILABLE};
use pool_status_bot::report::{BlockTimer, MetricCollector, Template, Unresolved};
use pool_status_bot::utils::{self, init_report_logging};
use pool_status_bot::{BotError, cli, config};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Main entry point for the bot
///
/// # Flow
/// 1. Loads `.env` so the environment overrides can come from a file
/// 2. Parses command line arguments
/// 3. Delegates to the subcommand handler and propagates its error
fn main() -> Result<(), BotError> {
    dotenv::dotenv().ok();
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Run(opts) => run_bot(opts),
        cli::Action::Report(opts) => print_report(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Connects to chat and serves commands until a fatal error
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads and validates configuration
/// 3. Opens the address registry
/// 4. Builds the service clients and the command handler
/// 5. Keeps a gateway session open
fn run_bot(opts: cli::RunOptions) -> Result<(), BotError> {
    utils::init_logging();

    let mut config = config::load(&opts.config)?;
    if let Some(path) = opts.registry {
        config.registry.path = path;
    }
    config.validate_for_chat()?;

    let rt = Runtime::new()?;
    rt.block_on(async {
        let registry = Registry::open(&config.registry.path).await?;
        log::info!(
            "Loaded {} registrations from {}",
            registry.len().await,
            registry.path().display()
        );

        let http = network::http_client(&config.http)?;
        let collector = build_collector(&config, http.clone())?;
        let handler = Arc::new(CommandHandler::new(
            collector,
            Arc::new(registry),
            config.discord.reset_channel_id.clone(),
            config.market.default_coin.clone(),
        ));
        let rest = RestClient::new(&config.discord.api_url, &config.discord.token, http);

        let mut gateway = GatewayClient::new(config.discord.clone(), handler, rest);
        gateway.serve().await
    })
}

/// Prints one report to stdout
///
/// The block timer starts with the process, so `time_since` is only
/// meaningful inside a running bot.
fn print_report(opts: cli::ReportOptions) -> Result<(), BotError> {
    init_report_logging();

    let config = config::load(&opts.config)?;
    let missing = if opts.keep_placeholders {
        Unresolved::Keep
    } else {
        UNAVAILABLE
    };

    let rt = Runtime::new()?;
    let text = rt.block_on(async {
        let http = network::http_client(&config.http)?;
        let collector = build_collector(&config, http)?;

        let text = match &opts.market {
            Some(coin) => {
                let report = collector.market_report(coin).await?;
                let body = Template::parse(MARKET_TEMPLATE).render_with(&report.snapshot, missing);
                format!("{} ({})\n{}", report.name, report.coin_url, body)
            }
            None => {
                let snapshot = collector.pool_report().await;
                Template::parse(INFO_TEMPLATE).render_with(&snapshot, missing)
            }
        };
        Ok::<String, BotError>(text)
    })?;

    println!("{}", text);
    Ok(())
}

/// Generates configuration template file
fn generate_config(opts: cli::ConfigOptions) -> Result<(), BotError> {
    std::fs::write(&opts.output, config::generate_template())?;
    println!("Wrote {}", opts.output.display());
    Ok(())
}

/// Wires every service client into a collector
fn build_collector(
    config: &config::Config,
    http: reqwest::Client,
) -> Result<MetricCollector, BotError> {
    Ok(MetricCollector::new(
        Arc::new(ExplorerClient::new(config.explorer.clone(), http.clone())),
        Arc::new(NodeClient::new(&config.node, http.clone())?),
        Arc::new(PoolApiClient::new(config.pool.clone(), http.clone())),
        Arc::new(MarketClient::new(config.market.clone(), http)),
        Arc::new(BlockTimer::new()),
    ))
}
