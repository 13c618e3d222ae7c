//! Fixed-risk position sizing: share quantity, 2:1 target and trailing SL1.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Fraction of capital put at risk on a single trade.
pub const RISK_FRACTION: Decimal = dec!(0.01);

/// Reward-to-risk multiple used for the target price.
pub const REWARD_MULTIPLE: Decimal = dec!(2);

/// Flat adjustment added to the locked-in profit when computing SL1.
const SL1_FLAT_ADJUSTMENT: Decimal = dec!(50);

/// Per-unit-of-turnover adjustment used when computing SL1.
const SL1_TURNOVER_RATE: Decimal = dec!(0.0001);

/// Figures derived from capital, entry price and original stop loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSizing {
    /// Entry price minus original stop loss
    pub gap: Decimal,

    /// Capital at risk on this trade
    pub risk: Decimal,

    /// Whole shares to buy (zero when the gap is not positive)
    pub shares: i64,

    /// Exit price at 2:1 reward-to-risk
    pub target: Decimal,

    /// Half of the position, booked at target
    pub half: Decimal,

    /// Trailing stop for the remaining half
    pub trailing_sl1: Decimal,

    /// Cash needed for the full position
    pub investment: Decimal,
}

/// Inputs whose figures do not fit the decimal or share-count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SizingError {
    #[error("{0} is out of range for these prices and capital")]
    OutOfRange(&'static str),
}

fn in_range(value: Option<Decimal>, figure: &'static str) -> Result<Decimal, SizingError> {
    value.ok_or(SizingError::OutOfRange(figure))
}

/// Calculator for risk-budgeted position sizes.
pub struct PositionSizer;

impl PositionSizer {
    /// Size a trade risking 1% of `capital` between `entry_price` and `stop_loss`.
    ///
    /// A non-positive gap is not an error: shares and SL1 come out as zero
    /// while the target is still evaluated. Inputs so extreme that a figure
    /// overflows, or that call for more than `i64::MAX` shares, are rejected.
    pub fn calculate(
        capital: Decimal,
        entry_price: Decimal,
        stop_loss: Decimal,
    ) -> Result<PositionSizing, SizingError> {
        let gap = in_range(entry_price.checked_sub(stop_loss), "gap")?;
        let risk = in_range(RISK_FRACTION.checked_mul(capital), "risk")?;

        let shares = if gap > Decimal::ZERO {
            in_range(risk.checked_div(gap), "share count")?
                .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
                .to_i64()
                .ok_or(SizingError::OutOfRange("share count"))?
        } else {
            0
        };
        let shares_dec = Decimal::from(shares);

        let target = in_range(
            REWARD_MULTIPLE
                .checked_mul(gap)
                .and_then(|reward| entry_price.checked_add(reward)),
            "target",
        )?;
        let half = shares_dec / dec!(2);

        let trailing_sl1 = if half > Decimal::ZERO {
            in_range(Self::trailing_sl1(entry_price, stop_loss, shares_dec, half, target), "SL1")?
        } else {
            Decimal::ZERO
        };

        let investment = in_range(shares_dec.checked_mul(entry_price), "investment")?;

        Ok(PositionSizing {
            gap,
            risk,
            shares,
            target,
            half,
            trailing_sl1,
            investment,
        })
    }

    /// `((target - entry) * half + 50 + 0.0001 * turnover) / half + stop_loss`,
    /// where turnover is `shares * entry + half * target`.
    fn trailing_sl1(
        entry_price: Decimal,
        stop_loss: Decimal,
        shares: Decimal,
        half: Decimal,
        target: Decimal,
    ) -> Option<Decimal> {
        let turnover = shares
            .checked_mul(entry_price)?
            .checked_add(half.checked_mul(target)?)?;
        let locked = target.checked_sub(entry_price)?.checked_mul(half)?;

        locked
            .checked_add(SL1_FLAT_ADJUSTMENT)?
            .checked_add(SL1_TURNOVER_RATE.checked_mul(turnover)?)?
            .checked_div(half)?
            .checked_add(stop_loss)
    }
}
