//! Broker connectivity: REST client and the paper (dry-run) gateway.

mod broker_client;
mod paper;
mod types;

pub use broker_client::BrokerClient;
pub use paper::PaperGateway;
pub use types::{DailyCandle, OrderRequest, OrderResponse, QuoteResponse};
