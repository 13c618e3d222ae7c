//! Trading logic: risk-budgeted position sizing and wizard configuration.

mod config;
mod position_sizer;

pub use config::WizardConfig;
pub use position_sizer::{PositionSizer, PositionSizing, SizingError, REWARD_MULTIPLE, RISK_FRACTION};
