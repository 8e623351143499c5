//! Data models for quotes, order sides, and the session logs.

mod quote;
mod record;

pub use quote::Quote;
pub use record::{OrderSide, TickOutcome, TickRecord, TradeRecord};
