//! Trading core: collaborator interfaces, session config, and the automaton.

mod automaton;
mod config;
mod error;
mod interfaces;

pub use automaton::{SessionState, TradingAutomaton};
pub use config::SessionConfig;
pub use error::StartError;
pub use interfaces::{BreakoutLevelProvider, OrderGateway, PriceSource};
