//! Per-session wizard state: current screen, captured inputs, journal mirror.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{JournalRow, TrendChecks};

/// The six wizard screens, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Welcome,
    Capital,
    TradeSetup,
    Analyzing,
    Results,
    Vault,
}

impl Screen {
    /// One-based step number (1..=6).
    pub fn step(&self) -> u8 {
        match self {
            Screen::Welcome => 1,
            Screen::Capital => 2,
            Screen::TradeSetup => 3,
            Screen::Analyzing => 4,
            Screen::Results => 5,
            Screen::Vault => 6,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Welcome => "StockPro Analysis",
            Screen::Capital => "Capital Management",
            Screen::TradeSetup => "Trade Setup",
            Screen::Analyzing => "Analyzing...",
            Screen::Results => "Analysis Results",
            Screen::Vault => "Trade Vault",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{} ({})", self.step(), self.title())
    }
}

/// Inputs captured on the trade setup screen.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeSetup {
    /// Upper-cased stock symbol
    pub stock: String,
    pub entry_price: Decimal,
    pub trade_date: NaiveDate,
    pub stop_loss_orig: Decimal,
    pub trends: TrendChecks,
}

impl TradeSetup {
    pub fn new(
        stock: &str,
        entry_price: Decimal,
        trade_date: NaiveDate,
        stop_loss_orig: Decimal,
        trends: TrendChecks,
    ) -> Self {
        Self {
            stock: stock.trim().to_uppercase(),
            entry_price,
            trade_date,
            stop_loss_orig,
            trends,
        }
    }

    /// True when all four trend checks are ticked.
    pub fn checks(&self) -> bool {
        self.trends.all_up()
    }
}

/// State owned by one wizard session.
#[derive(Debug, Clone)]
pub struct Session {
    pub screen: Screen,

    /// Capital entered on the capital screen
    pub total_inv: Option<Decimal>,

    /// Trade inputs entered on the setup screen
    pub setup: Option<TradeSetup>,

    /// Rows saved during this session, in save order
    pub journal: Vec<JournalRow>,

    /// Message from the last failed save, shown on the results screen
    pub last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            screen: Screen::Welcome,
            total_inv: None,
            setup: None,
            journal: Vec::new(),
            last_error: None,
        }
    }

    pub fn step(&self) -> u8 {
        self.screen.step()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_session_starts_on_welcome() {
        let session = Session::new();
        assert_eq!(session.step(), 1);
        assert!(session.journal.is_empty());
        assert!(session.total_inv.is_none());
    }

    #[test]
    fn test_setup_normalizes_symbol() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let setup = TradeSetup::new(" reliance ", dec!(2500), date, dec!(2450), TrendChecks::default());
        assert_eq!(setup.stock, "RELIANCE");
        assert!(!setup.checks());
    }
}
