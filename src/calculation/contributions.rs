//! SSS, PhilHealth and Pag-IBIG contribution formulas.
//!
//! All three work on the monthly-equivalent gross and return monthly amounts.
//! Conversion to weekly amounts happens in the statutory deduction calculator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{PagIbigConfig, PhilHealthConfig, SssConfig};

/// Weeks per month used to convert weekly gross into a monthly equivalent.
///
/// A fixed four-week month is the payroll convention for weekly runs, not a
/// calendar average.
pub const WEEKS_PER_MONTH: Decimal = Decimal::from_parts(4, 0, 0, false, 0);

/// Months per year.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// The monthly SSS contribution and the salary credit it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SssContribution {
    /// Monthly salary credit: the clamped income rounded up to the credit step.
    pub monthly_salary_credit: Decimal,
    /// Monthly employee contribution.
    pub monthly: Decimal,
}

/// Converts a weekly amount into its monthly equivalent.
///
/// Returns `None` if the result does not fit in a `Decimal`.
pub fn monthly_equivalent(weekly: Decimal) -> Option<Decimal> {
    weekly.checked_mul(WEEKS_PER_MONTH)
}

fn clamp(value: Decimal, floor: Decimal, ceiling: Decimal) -> Decimal {
    value.max(floor).min(ceiling)
}

/// Computes the monthly SSS contribution.
///
/// The monthly salary credit is the monthly gross clamped to
/// `[msc_floor, msc_ceiling]`, then rounded up to the next multiple of `msc_step`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::sss_contribution;
/// use payroll_engine::config::StatutorySchedule;
/// use rust_decimal::Decimal;
///
/// let config = StatutorySchedule::default().contributions.sss;
/// let sss = sss_contribution(Decimal::from(12_345), &config);
/// assert_eq!(sss.monthly_salary_credit, Decimal::from(12_500));
/// assert_eq!(sss.monthly, Decimal::from(625));
/// ```
pub fn sss_contribution(monthly_gross: Decimal, config: &SssConfig) -> SssContribution {
    let clamped = clamp(monthly_gross, config.msc_floor, config.msc_ceiling);
    let monthly_salary_credit = (clamped / config.msc_step).ceil() * config.msc_step;
    SssContribution {
        monthly_salary_credit,
        monthly: monthly_salary_credit * config.rate,
    }
}

/// Computes the monthly PhilHealth contribution on income clamped to
/// `[income_floor, income_ceiling]`.
pub fn philhealth_contribution(monthly_gross: Decimal, config: &PhilHealthConfig) -> Decimal {
    clamp(monthly_gross, config.income_floor, config.income_ceiling) * config.rate
}

/// Computes the monthly Pag-IBIG contribution, capped at `monthly_cap`.
pub fn pagibig_contribution(monthly_gross: Decimal, config: &PagIbigConfig) -> Decimal {
    // An overflowing product is far above any cap.
    monthly_gross
        .checked_mul(config.rate)
        .map_or(config.monthly_cap, |amount| amount.min(config.monthly_cap))
}
