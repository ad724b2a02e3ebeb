//! Monetary rounding and overflow reporting.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::EngineError;

/// Number of decimal places money is reported with.
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to centavos, half away from zero.
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("10.125").unwrap()).to_string(), "10.13");
/// assert_eq!(round_money(Decimal::from_str("-10.125").unwrap()).to_string(), "-10.13");
/// assert_eq!(round_money(Decimal::from(50)).to_string(), "50.00");
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// The error for an amount that does not fit in a `Decimal`.
pub(crate) fn overflow(what: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} is outside the supported decimal range", what),
    }
}
