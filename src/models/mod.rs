//! Data models for journal rows and wizard session state.

mod journal_row;
mod session;

pub use journal_row::{JournalRow, Trend, TrendChecks};
pub use session::{Screen, Session, TradeSetup};
