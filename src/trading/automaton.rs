//! The intraday breakout trading automaton.
//!
//! A scheduler-agnostic state machine: any timer or event loop drives it by
//! calling [`TradingAutomaton::on_tick`] with the current wall-clock time.
//! Per tick it evaluates the liquidation cutoff first, then breakout entries
//! per watched instrument, driving the collaborator interfaces sequentially
//! with a pacing delay between broker interactions. All session state is
//! in-memory and owned exclusively by the automaton.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::models::{OrderSide, Quote, TickOutcome, TickRecord, TradeRecord};

use super::{BreakoutLevelProvider, OrderGateway, PriceSource, SessionConfig, StartError};

/// Where the session is in its daily lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session; ticks are ignored
    Idle,
    /// Watching prices and entering on breakouts
    Running,
    /// Draining held positions at the cutoff
    CutoffLiquidating,
    /// Cutoff handled; every further tick is a no-op until `stop`
    CutoffDone,
}

/// The breakout trading state machine for one session.
pub struct TradingAutomaton {
    config: SessionConfig,
    price_source: Arc<dyn PriceSource>,
    level_provider: Arc<dyn BreakoutLevelProvider>,
    order_gateway: Arc<dyn OrderGateway>,

    state: SessionState,
    watch_list: Vec<String>,
    levels: HashMap<String, Decimal>,
    bought: HashSet<String>,
    tick_log: Vec<TickRecord>,
    trade_log: Vec<TradeRecord>,
}

impl TradingAutomaton {
    pub fn new(
        config: SessionConfig,
        price_source: Arc<dyn PriceSource>,
        level_provider: Arc<dyn BreakoutLevelProvider>,
        order_gateway: Arc<dyn OrderGateway>,
    ) -> Self {
        Self {
            config,
            price_source,
            level_provider,
            order_gateway,
            state: SessionState::Idle,
            watch_list: Vec::new(),
            levels: HashMap::new(),
            bought: HashSet::new(),
            tick_log: Vec::new(),
            trade_log: Vec::new(),
        }
    }

    /// Start a session: validate input, clear prior state, and compute one
    /// breakout level per instrument before any tick runs.
    ///
    /// A failed level computation aborts the whole start; no partial levels
    /// are retained and the automaton stays `Idle`.
    pub async fn start(&mut self, instruments: &[String], k: Decimal) -> Result<(), StartError> {
        if self.state != SessionState::Idle {
            return Err(StartError::SessionActive);
        }

        // Dedupe while preserving first-occurrence order
        let mut seen = HashSet::new();
        let watch_list: Vec<String> = instruments
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && seen.insert(c.clone()))
            .collect();

        if watch_list.is_empty() {
            return Err(StartError::InvalidInput(
                "watch list must contain at least one instrument".to_string(),
            ));
        }
        if k <= Decimal::ZERO {
            return Err(StartError::InvalidInput(format!(
                "coefficient k must be positive, got {k}"
            )));
        }

        let mut levels = HashMap::new();
        for code in &watch_list {
            let level = self
                .level_provider
                .level_for(code, k)
                .await
                .map_err(|source| StartError::LevelComputation {
                    code: code.clone(),
                    source,
                })?;
            debug!(code = %code, level = %level, "Breakout level computed");
            levels.insert(code.clone(), level);
        }

        self.watch_list = watch_list;
        self.levels = levels;
        self.bought.clear();
        self.tick_log.clear();
        self.trade_log.clear();
        self.state = SessionState::Running;

        info!(
            instruments = self.watch_list.len(),
            k = %k,
            cutoff = %self.config.cutoff,
            "Session started"
        );

        Ok(())
    }

    /// Stop the session and reset all state. Idempotent, safe in any state.
    pub fn stop(&mut self) {
        if self.state != SessionState::Idle {
            info!("Session stopped");
        }
        self.state = SessionState::Idle;
        self.watch_list.clear();
        self.levels.clear();
        self.bought.clear();
        self.tick_log.clear();
        self.trade_log.clear();
    }

    /// One evaluation cycle at wall-clock time `now`.
    ///
    /// Runs the cutoff check first; once the cutoff has been handled every
    /// further tick is a no-op, so no live price query can happen after
    /// liquidation. Entry evaluation runs only pre-cutoff.
    pub async fn on_tick(&mut self, now: NaiveDateTime) {
        match self.state {
            SessionState::Idle | SessionState::CutoffDone => return,
            SessionState::Running | SessionState::CutoffLiquidating => {}
        }

        if now.time() >= self.config.cutoff {
            self.liquidate(now).await;
            return;
        }

        self.evaluate_entries(now).await;
    }

    /// Force-sell every held instrument, then suppress further polling.
    ///
    /// Sells the exact set held when the cutoff is reached, in watch-list
    /// order. Quote and submission failures are tolerated; each position is
    /// considered handled once its sell has been attempted.
    async fn liquidate(&mut self, now: NaiveDateTime) {
        self.state = SessionState::CutoffLiquidating;

        let held: Vec<String> = self
            .watch_list
            .iter()
            .filter(|c| self.bought.contains(*c))
            .cloned()
            .collect();

        info!(positions = held.len(), "Cutoff reached, liquidating");

        for code in held {
            let quote = if self.config.query_before_liquidation {
                match self.price_source.lookup(&code).await {
                    Ok(q) => Some(q),
                    Err(e) => {
                        warn!(code = %code, error = %e, "Pre-liquidation quote failed");
                        None
                    }
                }
            } else {
                None
            };

            let quantity = self.config.order_quantity;
            if let Err(e) = self
                .order_gateway
                .submit(&code, OrderSide::Sell, quantity)
                .await
            {
                // Best effort: the position counts as handled either way,
                // retry-after-cutoff is out of scope
                error!(code = %code, error = %e, "Sell submission failed");
            } else {
                info!(code = %code, quantity, "Liquidation sell submitted");
            }

            let (name, price) = match quote {
                Some(q) => (q.name, Some(q.price)),
                None => (String::new(), None),
            };
            self.trade_log.push(TradeRecord {
                timestamp: now,
                side: OrderSide::Sell,
                code: code.clone(),
                name,
                price,
                quantity,
            });
            self.bought.remove(&code);

            self.pace().await;
        }

        self.state = SessionState::CutoffDone;
    }

    /// Poll each unheld instrument and buy on a strict breakout.
    async fn evaluate_entries(&mut self, now: NaiveDateTime) {
        let watch_list = self.watch_list.clone();
        for code in watch_list {
            // At most one entry per instrument per session
            if self.bought.contains(&code) {
                continue;
            }

            let quote = match self.price_source.lookup(&code).await {
                Ok(q) => q,
                Err(e) => {
                    warn!(code = %code, error = %e, "Price lookup failed");
                    self.tick_log.push(TickRecord {
                        timestamp: now,
                        code: code.clone(),
                        outcome: TickOutcome::LookupFailed,
                    });
                    self.pace().await;
                    continue;
                }
            };

            self.tick_log.push(TickRecord {
                timestamp: now,
                code: code.clone(),
                outcome: TickOutcome::Quote(quote.clone()),
            });

            if now.time() < self.config.cutoff {
                if let Some(level) = self.levels.get(&code).copied() {
                    // Strictly above: a price exactly at the level is not a breakout
                    if quote.price > level {
                        self.enter(&code, &quote, now).await;
                    }
                }
            }

            self.pace().await;
        }
    }

    /// Submit a market buy and flag the position.
    ///
    /// A failed submission leaves the flag unset, so the instrument stays
    /// eligible on later ticks.
    async fn enter(&mut self, code: &str, quote: &Quote, now: NaiveDateTime) {
        let quantity = self.config.order_quantity;
        match self
            .order_gateway
            .submit(code, OrderSide::Buy, quantity)
            .await
        {
            Ok(()) => {
                info!(
                    code = %code,
                    name = %quote.name,
                    price = %quote.price,
                    quantity,
                    "Breakout buy submitted"
                );
                self.trade_log.push(TradeRecord {
                    timestamp: now,
                    side: OrderSide::Buy,
                    code: code.to_string(),
                    name: quote.name.clone(),
                    price: Some(quote.price),
                    quantity,
                });
                self.bought.insert(code.to_string());
            }
            Err(e) => {
                error!(code = %code, error = %e, "Buy submission failed");
            }
        }
    }

    async fn pace(&self) {
        if !self.config.pace.is_zero() {
            tokio::time::sleep(self.config.pace).await;
        }
    }

    // ==================== Read accessors ====================

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn watch_list(&self) -> &[String] {
        &self.watch_list
    }

    /// Breakout levels computed at session start.
    pub fn levels(&self) -> &HashMap<String, Decimal> {
        &self.levels
    }

    /// Instruments currently flagged as bought today.
    pub fn positions(&self) -> &HashSet<String> {
        &self.bought
    }

    /// Price observations for the current session, in tick order.
    pub fn tick_log(&self) -> &[TickRecord] {
        &self.tick_log
    }

    /// Executed buy/sell events for the current session, in order.
    pub fn trade_log(&self) -> &[TradeRecord] {
        &self.trade_log
    }
}
