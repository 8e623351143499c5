//! Dry-run order gateway.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::models::OrderSide;
use crate::trading::OrderGateway;

/// Order gateway that logs instead of submitting. Lets a session run
/// end-to-end against live prices without placing real orders.
#[derive(Debug, Default)]
pub struct PaperGateway;

#[async_trait]
impl OrderGateway for PaperGateway {
    async fn submit(&self, code: &str, side: OrderSide, quantity: u32) -> Result<()> {
        info!(
            code = %code,
            side = side.as_str(),
            quantity,
            "[DRY RUN] Would submit market order"
        );
        Ok(())
    }
}
