//! Journal row model: one saved trade, laid out in worksheet column order.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a market/sector/stock trend check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "UP",
            Trend::Down => "DOWN",
        }
    }
}

impl From<bool> for Trend {
    fn from(checked: bool) -> Self {
        if checked {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

impl FromStr for Trend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UP" => Ok(Trend::Up),
            "DOWN" => Ok(Trend::Down),
            other => anyhow::bail!("Unknown trend flag: {}", other),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four trend checks captured on the trade setup screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrendChecks {
    pub nifty: bool,
    pub sensex: bool,
    pub industry: bool,
    pub stock: bool,
}

impl TrendChecks {
    /// True when every trend check is ticked.
    pub fn all_up(&self) -> bool {
        self.nifty && self.sensex && self.industry && self.stock
    }
}

/// A single journal entry.
///
/// Field order is the worksheet column order; serde renames carry the
/// column headers. Money goes through its decimal text form so values read
/// back exactly as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRow {
    #[serde(rename = "Email")]
    pub email: String,

    #[serde(rename = "Date")]
    pub date: NaiveDate,

    #[serde(rename = "Total_Capital", with = "rust_decimal::serde::str")]
    pub total_capital: Decimal,

    #[serde(rename = "Stock")]
    pub stock: String,

    #[serde(rename = "Entry Price", with = "rust_decimal::serde::str")]
    pub entry_price: Decimal,

    #[serde(rename = "SL_Original", with = "rust_decimal::serde::str")]
    pub stop_loss_orig: Decimal,

    #[serde(rename = "Target_50", with = "rust_decimal::serde::str")]
    pub target: Decimal,

    #[serde(rename = "Trailing_SL1", with = "rust_decimal::serde::str")]
    pub trailing_sl1: Decimal,

    #[serde(rename = "No. of Shares")]
    pub shares: i64,

    #[serde(rename = "Investment_Value", with = "rust_decimal::serde::str")]
    pub investment: Decimal,

    #[serde(rename = "Nifty 50 Trend")]
    pub nifty_trend: Trend,

    #[serde(rename = "Sensex Trend")]
    pub sensex_trend: Trend,

    #[serde(rename = "Industry Trend")]
    pub industry_trend: Trend,

    #[serde(rename = "Stock Trend")]
    pub stock_trend: Trend,
}

impl JournalRow {
    /// Worksheet headers, in column order.
    pub const HEADERS: [&'static str; 14] = [
        "Email",
        "Date",
        "Total_Capital",
        "Stock",
        "Entry Price",
        "SL_Original",
        "Target_50",
        "Trailing_SL1",
        "No. of Shares",
        "Investment_Value",
        "Nifty 50 Trend",
        "Sensex Trend",
        "Industry Trend",
        "Stock Trend",
    ];

    /// Trend flags in column order.
    pub fn trends(&self) -> [Trend; 4] {
        [
            self.nifty_trend,
            self.sensex_trend,
            self.industry_trend,
            self.stock_trend,
        ]
    }
}
