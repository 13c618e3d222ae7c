//! Wizard configuration: screen defaults, display and pacing.

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Configuration for the journal wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Currency symbol prefixed to money figures
    pub currency_symbol: String,

    /// Capital pre-filled on the capital screen
    pub default_capital: Decimal,

    /// Stock symbol pre-filled on the trade setup screen
    pub default_stock: String,

    /// Entry price pre-filled on the trade setup screen
    pub default_entry_price: Decimal,

    /// Stop loss pre-filled on the trade setup screen
    pub default_stop_loss: Decimal,

    /// Number of progress ticks on the analyzing screen
    pub analysis_ticks: u32,

    /// Pause between progress ticks (milliseconds)
    pub analysis_tick_ms: u64,

    /// Pause after a successful save before showing the vault (milliseconds)
    pub confirm_delay_ms: u64,

    /// Placeholder identity used when no user email is known
    pub fallback_email: String,
}

impl WizardConfig {
    /// Same defaults with every simulated delay removed.
    pub fn without_delays(self) -> Self {
        Self {
            analysis_tick_ms: 0,
            confirm_delay_ms: 0,
            ..self
        }
    }

    pub fn analysis_tick(&self) -> Duration {
        Duration::from_millis(self.analysis_tick_ms)
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            default_capital: dec!(100000),
            default_stock: "RELIANCE".to_string(),
            default_entry_price: dec!(2500.0),
            default_stop_loss: dec!(2450.0),
            analysis_ticks: 100,
            analysis_tick_ms: 10,      // ~1s total
            confirm_delay_ms: 1000,
            fallback_email: "Local Test User".to_string(),
        }
    }
}
