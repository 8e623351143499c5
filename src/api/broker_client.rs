//! Broker REST client implementing all three collaborator interfaces.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{OrderSide, Quote};
use crate::trading::{BreakoutLevelProvider, OrderGateway, PriceSource};

use super::types::{parse_price, DailyCandle, OrderRequest, OrderResponse, QuoteResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the broker's REST API.
pub struct BrokerClient {
    client: Client,
    base_url: String,
    app_key: String,
    account: String,
}

impl BrokerClient {
    /// Build a client from `BROKER_BASE_URL`, `BROKER_APP_KEY`, and
    /// `BROKER_ACCOUNT` environment variables.
    ///
    /// `BROKER_ACCOUNT` may hold a semicolon-delimited list of accounts; the
    /// first non-empty entry is used.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("BROKER_BASE_URL").context("BROKER_BASE_URL not set")?;
        let app_key = std::env::var("BROKER_APP_KEY").context("BROKER_APP_KEY not set")?;
        let accounts = std::env::var("BROKER_ACCOUNT").context("BROKER_ACCOUNT not set")?;

        let account = first_account(&accounts)
            .context("BROKER_ACCOUNT contains no usable account number")?;

        Self::new(base_url, app_key, account)
    }

    pub fn new(
        base_url: impl Into<String>,
        app_key: impl Into<String>,
        account: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            app_key: app_key.into(),
            account: account.into(),
        })
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Fetch recent daily candles for an instrument, most recent first.
    async fn daily_candles(&self, code: &str, count: u32) -> Result<Vec<DailyCandle>> {
        let url = format!("{}/v1/daily/{}?count={}", self.base_url, code, count);
        debug!(url = %url, "Fetching daily candles");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.app_key)
            .send()
            .await
            .with_context(|| format!("Failed to fetch daily candles for {code}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Daily candle request failed: {} - {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse daily candle response")
    }
}

#[async_trait]
impl PriceSource for BrokerClient {
    async fn lookup(&self, code: &str) -> Result<Quote> {
        let url = format!("{}/v1/quote/{}", self.base_url, code);
        debug!(url = %url, "Fetching quote");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.app_key)
            .send()
            .await
            .with_context(|| format!("Failed to fetch quote for {code}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Quote request failed: {} - {}", status, body);
        }

        let quote: QuoteResponse = response
            .json()
            .await
            .context("Failed to parse quote response")?;

        if quote.name.is_empty() {
            anyhow::bail!("Quote for {code} carries no instrument name");
        }
        let price = parse_price(&quote.price)?;

        Ok(Quote::new(quote.name, price))
    }
}

#[async_trait]
impl BreakoutLevelProvider for BrokerClient {
    async fn level_for(&self, code: &str, k: Decimal) -> Result<Decimal> {
        let candles = self.daily_candles(code, 10).await?;
        let today = Local::now().format("%Y%m%d").to_string();

        // Most recent completed session strictly before today
        let prev = candles
            .iter()
            .filter(|c| c.date < today)
            .max_by(|a, b| a.date.cmp(&b.date))
            .with_context(|| format!("No prior session data for {code}"))?;

        let high = parse_price(&prev.high)?;
        let low = parse_price(&prev.low)?;
        let close = parse_price(&prev.close)?;

        Ok(close + k * (high - low))
    }
}

#[async_trait]
impl OrderGateway for BrokerClient {
    async fn submit(&self, code: &str, side: OrderSide, quantity: u32) -> Result<()> {
        let url = format!("{}/v1/orders", self.base_url);
        let request = OrderRequest {
            account: self.account.clone(),
            code: code.to_string(),
            side: side.as_str().to_string(),
            quantity,
            price: "0".to_string(),
            order_type: "market".to_string(),
        };

        debug!(code = %code, side = side.as_str(), quantity, "Submitting market order");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.app_key)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to submit {} order for {code}", side.as_str()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Order request failed: {} - {}", status, body);
        }

        let order: OrderResponse = response
            .json()
            .await
            .context("Failed to parse order response")?;

        if !order.success {
            anyhow::bail!("Order rejected by broker: {}", order.message);
        }

        debug!(order_id = ?order.order_id, "Order accepted");
        Ok(())
    }
}

/// Pick the first usable account from a semicolon-delimited list.
fn first_account(raw: &str) -> Option<String> {
    raw.split(';')
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
