//! Session runner: owns the polling timer and drives the automaton.
//!
//! The automaton itself is scheduler-agnostic; this is the one place that
//! knows about tokio intervals, Ctrl-C, and the wall clock. It also acts as
//! the presentation layer, rendering newly appended log records after each
//! tick. Ticks run to completion on a single task before the interval is
//! re-armed, so no two ticks ever overlap and `stop` never races an
//! in-flight tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use rust_decimal::Decimal;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use crate::models::{TickOutcome, TickRecord, TradeRecord};
use crate::trading::{SessionState, TradingAutomaton};

/// Drives one trading session from start to cutoff or Ctrl-C.
pub struct SessionRunner {
    automaton: TradingAutomaton,
    poll_interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl SessionRunner {
    pub fn new(automaton: TradingAutomaton, poll_interval: Duration) -> Self {
        Self {
            automaton,
            poll_interval,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shutdown flag for external control.
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Start a session and poll until the cutoff has been handled or a
    /// shutdown is requested. The automaton is reset before returning.
    pub async fn run(&mut self, codes: &[String], k: Decimal) -> Result<()> {
        self.automaton.start(codes, k).await?;

        println!("Breakout levels:");
        for code in self.automaton.watch_list() {
            if let Some(level) = self.automaton.levels().get(code) {
                println!("  [{code}] {level}");
            }
        }
        println!();

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
            shutdown.store(true, Ordering::SeqCst);
        });

        let mut ticker = interval(self.poll_interval);
        // A slow tick just delays the next one; ticks never pile up
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut rendered_ticks = 0;
        let mut rendered_trades = 0;

        while !self.shutdown.load(Ordering::SeqCst) {
            ticker.tick().await;
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            let now = Local::now().naive_local();
            self.automaton.on_tick(now).await;

            rendered_ticks = self.render_ticks(rendered_ticks);
            rendered_trades = self.render_trades(rendered_trades);

            if self.automaton.state() == SessionState::CutoffDone {
                info!("Cutoff handled; session complete");
                break;
            }
        }

        let trades = self.automaton.trade_log().len();
        let observations = self.automaton.tick_log().len();
        self.automaton.stop();

        println!("\nSession closed: {observations} observations, {trades} trades.");
        Ok(())
    }

    /// Print tick records appended since the last render.
    fn render_ticks(&self, from: usize) -> usize {
        let log = self.automaton.tick_log();
        for record in &log[from..] {
            println!("{}", format_tick(record));
        }
        log.len()
    }

    /// Print trade records appended since the last render.
    fn render_trades(&self, from: usize) -> usize {
        let log = self.automaton.trade_log();
        for record in &log[from..] {
            println!("{}", format_trade(record));
        }
        log.len()
    }
}

fn format_tick(record: &TickRecord) -> String {
    let hms = record.timestamp.format("%H:%M:%S");
    match &record.outcome {
        TickOutcome::Quote(q) => {
            format!("[{hms}] [{}] [{}] [{}]", record.code, q.name, q.price)
        }
        TickOutcome::LookupFailed => {
            format!("[{hms}] [{}] [lookup failed] [-]", record.code)
        }
    }
}

fn format_trade(record: &TradeRecord) -> String {
    let hms = record.timestamp.format("%H:%M:%S");
    let price = record
        .price
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "[{hms}] [{}] [{}] [{}] [{}] [{}]",
        record.side.as_str().to_uppercase(),
        record.code,
        record.name,
        price,
        record.quantity
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::models::{OrderSide, Quote};

    use super::*;

    fn ts() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(14, 59, 59)
            .unwrap()
    }

    #[test]
    fn test_format_tick_quote_and_failure() {
        let quote = TickRecord {
            timestamp: ts(),
            code: "005930".to_string(),
            outcome: TickOutcome::Quote(Quote::new("삼성전자", dec!(72500))),
        };
        assert_eq!(format_tick(&quote), "[14:59:59] [005930] [삼성전자] [72500]");

        let failed = TickRecord {
            timestamp: ts(),
            code: "005930".to_string(),
            outcome: TickOutcome::LookupFailed,
        };
        assert_eq!(format_tick(&failed), "[14:59:59] [005930] [lookup failed] [-]");
    }

    #[test]
    fn test_format_trade_with_and_without_price() {
        let buy = TradeRecord {
            timestamp: ts(),
            side: OrderSide::Buy,
            code: "005930".to_string(),
            name: "삼성전자".to_string(),
            price: Some(dec!(72501)),
            quantity: 1,
        };
        assert_eq!(
            format_trade(&buy),
            "[14:59:59] [BUY] [005930] [삼성전자] [72501] [1]"
        );

        let sell = TradeRecord {
            timestamp: ts(),
            side: OrderSide::Sell,
            code: "005930".to_string(),
            name: String::new(),
            price: None,
            quantity: 1,
        };
        assert_eq!(format_trade(&sell), "[14:59:59] [SELL] [005930] [] [-] [1]");
    }
}
