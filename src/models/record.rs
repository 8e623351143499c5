//! Log record types appended by the automaton during a session.
//!
//! These are pure data; rendering them is the presentation layer's job.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Quote;

/// Direction of a market order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// Outcome of one per-instrument price poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Lookup succeeded with a live quote
    Quote(Quote),
    /// Lookup failed; the instrument was skipped for this tick
    LookupFailed,
}

/// One price observation, appended per instrument per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Wall-clock time the observation was made
    pub timestamp: NaiveDateTime,

    /// Instrument ticker code
    pub code: String,

    pub outcome: TickOutcome,
}

impl TickRecord {
    /// Whether this record carries a usable price.
    pub fn is_quote(&self) -> bool {
        matches!(self.outcome, TickOutcome::Quote(_))
    }
}

/// One executed (or attempted) buy/sell, appended per order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub timestamp: NaiveDateTime,

    pub side: OrderSide,

    /// Instrument ticker code
    pub code: String,

    /// Display name; empty when the pre-order quote was unavailable
    pub name: String,

    /// Observed price at submission time; `None` when unavailable
    pub price: Option<Decimal>,

    /// Units submitted
    pub quantity: u32,
}
