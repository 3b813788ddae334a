// src/cli/commands.rs
use crate::types::CoinId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pool Status Bot - mining pool statistics for a chat channel
#[derive(Parser, Debug)]
#[command(name = "pool-status-bot")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform (run the bot, print a report, or generate config)
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the bot application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Connect to chat and answer commands
    Run(RunOptions),

    /// Print one report to stdout without connecting to chat
    Report(ReportOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for running the bot
#[derive(Parser, Debug)]
pub struct RunOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Registrations file (overrides config)
    #[arg(short, long)]
    pub registry: Option<PathBuf>,
}

/// Options for a one-shot report
#[derive(Parser, Debug)]
pub struct ReportOptions {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Print the market report for this coin instead of the pool report
    #[arg(short, long)]
    pub market: Option<CoinId>,

    /// Leave unresolved placeholders as `[name]` instead of `unavailable`
    #[arg(long)]
    pub keep_placeholders: bool,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "config.toml")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_with_market() {
        let cli = Commands::try_parse_from(["pool-status-bot", "report", "--market", "garlicoin"])
            .unwrap();
        match cli.action {
            Action::Report(opts) => {
                assert_eq!(opts.market.unwrap().as_str(), "garlicoin");
                assert_eq!(opts.config, PathBuf::from("config.toml"));
                assert!(!opts.keep_placeholders);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_rejects_invalid_coin() {
        assert!(Commands::try_parse_from(["pool-status-bot", "report", "-m", "bit-coin"]).is_err());
    }

    #[test]
    fn test_parse_run() {
        let cli = Commands::try_parse_from(["pool-status-bot", "run", "-c", "bot.toml"]).unwrap();
        assert!(matches!(cli.action, Action::Run(ref o) if o.config == PathBuf::from("bot.toml")));
    }
}
