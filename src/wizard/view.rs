//! Text rendering of wizard screens.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use super::flow::sizing_for;
use crate::models::{JournalRow, Screen, Session};
use crate::trading::{PositionSizer, SizingError, WizardConfig, RISK_FRACTION};

/// A rendered screen: title plus body lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub title: String,
    pub lines: Vec<String>,
}

impl View {
    fn new(screen: Screen) -> Self {
        Self {
            title: screen.title().to_string(),
            lines: Vec::new(),
        }
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{:=^60}", format!(" {} ", self.title))?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Render the session's current screen.
pub fn render(session: &Session, config: &WizardConfig) -> View {
    let mut view = View::new(session.screen);

    match session.screen {
        Screen::Welcome => {
            view.line("Record a trade setup, size it to a fixed risk budget,");
            view.line("and keep it in your journal.");
        }
        Screen::Capital => {
            view.line(format!(
                "Risk per trade: {}% of capital",
                (RISK_FRACTION * Decimal::from(100)).normalize()
            ));
        }
        Screen::TradeSetup => {
            if let Some(capital) = session.total_inv {
                view.line(format!("Capital: {}", format_money(&config.currency_symbol, capital)));
            }
        }
        Screen::Analyzing => {}
        Screen::Results => render_results(&mut view, session, config),
        Screen::Vault => render_vault(&mut view, &session.journal, config),
    }

    view
}

fn render_results(view: &mut View, session: &Session, config: &WizardConfig) {
    let symbol = &config.currency_symbol;

    match sizing_for(session) {
        Ok(sizing) => {
            view.line(format!("{:<12} {}", "Quantity", sizing.shares));
            view.line(format!("{:<12} {}", "Investment", format_money(symbol, sizing.investment)));
            view.line(format!("{:<12} {}", "Target", format_money(symbol, sizing.target)));
            view.line(format!("{:<12} {}", "SL1", format_money(symbol, sizing.trailing_sl1)));
        }
        Err(e) => view.line(format!("Nothing to show: {}", e)),
    }

    if let Some(setup) = &session.setup {
        view.line(format!(
            "{:<12} {}",
            "Trends",
            if setup.checks() { "All aligned" } else { "Not aligned" }
        ));
    }

    if let Some(err) = &session.last_error {
        view.line(format!("Error: {}", err));
    }
}

fn render_vault(view: &mut View, journal: &[JournalRow], config: &WizardConfig) {
    if journal.is_empty() {
        view.line("No trades saved in this session.");
        return;
    }
    view.lines.extend(journal_table(journal, &config.currency_symbol));
}

/// Journal rows as an aligned text table with a header.
pub fn journal_table(rows: &[JournalRow], symbol: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{:<10} {:<12} {:>12} {:>12} {:>12} {:>12} {:>6} {:>14}  {}",
        "DATE", "STOCK", "ENTRY", "SL", "TARGET", "SL1", "QTY", "INVESTMENT", "TRENDS"
    ));
    lines.push("-".repeat(112));

    for row in rows {
        let trends: Vec<_> = row.trends().iter().map(|t| t.as_str()).collect();
        lines.push(format!(
            "{:<10} {:<12} {:>12} {:>12} {:>12} {:>12} {:>6} {:>14}  {}",
            row.date.format("%Y-%m-%d"),
            row.stock,
            format_money(symbol, row.entry_price),
            format_money(symbol, row.stop_loss_orig),
            format_money(symbol, row.target),
            format_money(symbol, row.trailing_sl1),
            row.shares,
            format_money(symbol, row.investment),
            trends.join("/")
        ));
    }
    lines
}

/// Sizing breakdown for one trade, as printed by `stockpro calc`.
pub fn sizing_report(
    capital: Decimal,
    entry_price: Decimal,
    stop_loss: Decimal,
    symbol: &str,
) -> Result<Vec<String>, SizingError> {
    let sizing = PositionSizer::calculate(capital, entry_price, stop_loss)?;
    let money = |value| format_money(symbol, value);

    let mut lines = vec![
        "=== Position Sizing ===".to_string(),
        String::new(),
        format!("{:<14}{}", "Capital:", money(capital)),
        format!("{:<14}{}", "Entry:", money(entry_price)),
        format!("{:<14}{}", "Stop Loss:", money(stop_loss)),
        format!("{:<14}{}", "Gap:", money(sizing.gap)),
        format!("{:<14}{}", "Risk (1%):", money(sizing.risk)),
        String::new(),
        "--- Results ---".to_string(),
        format!("{:<14}{}", "Quantity:", sizing.shares),
        format!("{:<14}{}", "Investment:", money(sizing.investment)),
        format!("{:<14}{}", "Target:", money(sizing.target)),
        format!("{:<14}{}", "SL1:", money(sizing.trailing_sl1)),
    ];

    if sizing.gap <= Decimal::ZERO {
        lines.push(String::new());
        lines.push("Stop loss is not below entry; no position sized.".to_string());
    }
    Ok(lines)
}

/// Format money with a currency symbol, thousands separators and two decimals.
pub fn format_money(symbol: &str, value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };

    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    format!("{}{}{}.{}", symbol, sign, group_thousands(whole), frac)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
