//! Collaborator interfaces the automaton drives.
//!
//! These are the only seams to the outside world: a live price feed, a
//! once-per-session breakout-level computation, and market order submission.
//! Broker-specific wire formats and parsing quirks stay behind these traits.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{OrderSide, Quote};

/// Live price lookup for a single instrument.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current display name and last price for `code`.
    ///
    /// Any error is treated by the automaton as "unavailable this tick":
    /// logged, the instrument skipped, the session continues.
    async fn lookup(&self, code: &str) -> Result<Quote>;
}

/// Breakout-level computation from the prior session's OHLC.
#[async_trait]
pub trait BreakoutLevelProvider: Send + Sync {
    /// Compute `prevClose + k × (prevHigh − prevLow)` for `code`, using the
    /// most recent completed session strictly before today.
    ///
    /// Called once per instrument at session start; an error aborts the
    /// whole start.
    async fn level_for(&self, code: &str, k: Decimal) -> Result<Decimal>;
}

/// Market order submission.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit a market order for `quantity` units of `code`.
    async fn submit(&self, code: &str, side: OrderSide, quantity: u32) -> Result<()>;
}
