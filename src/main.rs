//! Volatility-breakout intraday trading bot for KRX equities.
//!
//! Computes per-instrument breakout levels from the prior session's OHLC,
//! buys on a strict upward breakout (at most once per instrument per day),
//! and force-liquidates everything at a fixed time-of-day cutoff.

mod api;
mod models;
mod runner;
mod trading;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{BrokerClient, PaperGateway};
use crate::runner::SessionRunner;
use crate::trading::{
    BreakoutLevelProvider, OrderGateway, PriceSource, SessionConfig, TradingAutomaton,
};

/// Volatility-breakout trading bot CLI.
#[derive(Parser)]
#[command(name = "volbreakout")]
#[command(about = "Intraday volatility-breakout trading with a fixed liquidation cutoff", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a trading session until the cutoff or Ctrl-C
    Run {
        /// Comma-separated instrument codes (e.g. 005930,000660)
        #[arg(short, long)]
        codes: String,

        /// Breakout coefficient k (level = prevClose + k * (prevHigh - prevLow))
        #[arg(short, long)]
        k: f64,

        /// Polling interval in seconds
        #[arg(short, long, default_value = "1")]
        interval: u64,

        /// Liquidation cutoff time of day (HH:MM:SS)
        #[arg(long, default_value = "15:00:00")]
        cutoff: String,

        /// Units per market order
        #[arg(long, default_value = "1")]
        qty: u32,

        /// Inter-request pacing delay in milliseconds
        #[arg(long, default_value = "200")]
        pace_ms: u64,

        /// Skip the best-effort quote before each liquidation sell
        #[arg(long)]
        no_liquidation_quote: bool,

        /// Dry run (log orders instead of submitting them)
        #[arg(long)]
        dry_run: bool,
    },

    /// Compute and print breakout levels once, without trading
    Levels {
        /// Comma-separated instrument codes
        #[arg(short, long)]
        codes: String,

        /// Breakout coefficient k
        #[arg(short, long)]
        k: f64,
    },

    /// One-shot quote lookup
    Quote {
        /// Instrument code
        code: String,
    },

    /// Show the effective session defaults
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            codes,
            k,
            interval,
            cutoff,
            qty,
            pace_ms,
            no_liquidation_quote,
            dry_run,
        } => {
            let codes = parse_codes(&codes)?;
            let k = Decimal::try_from(k).context("k is not a valid decimal")?;
            let cutoff = NaiveTime::parse_from_str(&cutoff, "%H:%M:%S")
                .context("cutoff must be HH:MM:SS")?;

            let broker = Arc::new(BrokerClient::from_env()?);
            let gateway: Arc<dyn OrderGateway> = if dry_run {
                Arc::new(PaperGateway)
            } else {
                broker.clone()
            };

            let config = SessionConfig {
                cutoff,
                pace: Duration::from_millis(pace_ms),
                order_quantity: qty,
                query_before_liquidation: !no_liquidation_quote,
            };

            info!(
                instruments = codes.len(),
                interval,
                dry_run,
                cutoff = %cutoff,
                "Starting session"
            );

            println!("\n=== Volatility Breakout Session ===");
            println!("Instruments: {}", codes.join(", "));
            println!("k:           {k}");
            println!("Cutoff:      {cutoff}");
            println!(
                "Mode:        {}",
                if dry_run { "DRY RUN (no real orders)" } else { "LIVE TRADING" }
            );
            println!("\nPress Ctrl+C to stop.\n");

            let automaton =
                TradingAutomaton::new(config, broker.clone(), broker.clone(), gateway);
            let mut runner = SessionRunner::new(automaton, Duration::from_secs(interval));
            runner.run(&codes, k).await?;
        }

        Commands::Levels { codes, k } => {
            let codes = parse_codes(&codes)?;
            let k = Decimal::try_from(k).context("k is not a valid decimal")?;
            let broker = BrokerClient::from_env()?;

            println!("\n{:<10} {:>14}", "CODE", "LEVEL");
            println!("{}", "-".repeat(25));
            for code in &codes {
                match broker.level_for(code, k).await {
                    Ok(level) => println!("{:<10} {:>14}", code, level),
                    Err(e) => println!("{:<10} {:>14} ({e:#})", code, "error"),
                }
            }
        }

        Commands::Quote { code } => {
            let broker = BrokerClient::from_env()?;
            let quote = broker.lookup(&code).await?;
            println!("[{}] [{}] [{}]", code, quote.name, quote.price);
        }

        Commands::Config => {
            let config = SessionConfig::default();

            println!("\n=== Session Defaults ===\n");
            println!("Cutoff:                  {}", config.cutoff);
            println!("Pacing delay:            {} ms", config.pace.as_millis());
            println!("Order quantity:          {}", config.order_quantity);
            println!(
                "Quote before liquidation: {}",
                config.query_before_liquidation
            );
        }
    }

    Ok(())
}

/// Split a comma-separated code list, dropping empty entries.
fn parse_codes(raw: &str) -> Result<Vec<String>> {
    let codes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if codes.is_empty() {
        anyhow::bail!("no instrument codes given (expected e.g. 005930,000660)");
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_codes() {
        assert_eq!(
            parse_codes("005930, 000660,").unwrap(),
            vec!["005930".to_string(), "000660".to_string()]
        );
        assert!(parse_codes("  ,").is_err());
    }
}
