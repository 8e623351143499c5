//! Live quote snapshot for a single instrument.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display name and last price for an instrument, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Instrument display name (e.g. "삼성전자")
    pub name: String,

    /// Last traded price in KRW
    pub price: Decimal,
}

impl Quote {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}
