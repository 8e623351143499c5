//! Session configuration.

use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Configuration for one trading session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Time of day at which all open positions are force-liquidated and
    /// polling stops for the rest of the session
    pub cutoff: NaiveTime,

    /// Delay applied after each per-instrument broker interaction, to
    /// respect broker rate limits
    #[serde(with = "duration_millis")]
    pub pace: Duration,

    /// Units per market order
    pub order_quantity: u32,

    /// Fetch a best-effort quote for each held instrument right before its
    /// liquidation sell. When off, sells are submitted without a quote and
    /// the trade record carries no name or price.
    pub query_before_liquidation: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            // KRX closes at 15:30; liquidate at 15:00 sharp
            cutoff: NaiveTime::from_hms_opt(15, 0, 0).expect("valid cutoff time"),
            pace: Duration::from_millis(200),
            order_quantity: 1,
            query_before_liquidation: true,
        }
    }
}

/// Serialize the pacing delay as plain milliseconds.
mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.cutoff, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert_eq!(config.pace, Duration::from_millis(200));
        assert_eq!(config.order_quantity, 1);
        assert!(config.query_before_liquidation);
    }

    #[test]
    fn test_pace_roundtrips_as_millis() {
        let config = SessionConfig {
            pace: Duration::from_millis(350),
            ..SessionConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"pace\":350"));

        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pace, Duration::from_millis(350));
    }
}
