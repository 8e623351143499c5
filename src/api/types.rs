//! Wire types for the broker REST API.
//!
//! The broker reports prices as display strings that may carry a sign
//! prefix and thousands separators (e.g. `"-72,500"`); parsing them is this
//! module's concern, nothing upstream ever sees the raw strings.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response from `GET /v1/quote/{code}`.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    /// Instrument display name
    pub name: String,

    /// Last price as a display string, possibly signed and comma-grouped
    pub price: String,
}

/// One daily OHLC candle from `GET /v1/daily/{code}`.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyCandle {
    /// Session date, `YYYYMMDD`
    pub date: String,

    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
}

/// Body for `POST /v1/orders`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub account: String,
    pub code: String,
    /// "buy" or "sell"
    pub side: String,
    pub quantity: u32,
    /// "0" for market orders
    pub price: String,
    pub order_type: String,
}

/// Response from `POST /v1/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order_id: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Parse a broker price string into an absolute decimal.
///
/// The broker signs prices by direction of the last move; the sign is not
/// part of the price itself.
pub fn parse_price(raw: &str) -> Result<Decimal> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '+')
        .collect();
    let value: Decimal = cleaned
        .parse()
        .with_context(|| format!("unparseable price string: {raw:?}"))?;
    Ok(value.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_price_strips_sign_and_commas() {
        assert_eq!(parse_price("-72,500").unwrap(), dec!(72500));
        assert_eq!(parse_price("+1,234,500").unwrap(), dec!(1234500));
        assert_eq!(parse_price(" 68000 ").unwrap(), dec!(68000));
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(parse_price("").is_err());
        assert!(parse_price("조회실패").is_err());
    }
}
