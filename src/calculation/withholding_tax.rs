//! Progressive withholding tax on annual taxable income.

use rust_decimal::Decimal;

use crate::config::TaxBracket;
use crate::error::{EngineError, EngineResult};

use super::money::overflow;

/// Finds the bracket that applies to `income`.
///
/// Brackets are checked in ascending order and the first one whose upper
/// bound is not exceeded wins, so an income exactly on a threshold is taxed in
/// the lower bracket.
pub fn find_bracket(income: Decimal, brackets: &[TaxBracket]) -> Option<(usize, &TaxBracket)> {
    brackets
        .iter()
        .enumerate()
        .find(|(_, bracket)| bracket.up_to.is_none_or(|upper| income <= upper))
}

/// Computes the annual withholding tax on `annual_taxable` income.
///
/// Negative income is taxed as zero income. The result is not rounded.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::annual_withholding_tax;
/// use payroll_engine::config::StatutorySchedule;
/// use rust_decimal::Decimal;
///
/// let brackets = StatutorySchedule::default().brackets;
/// assert_eq!(annual_withholding_tax(Decimal::from(250_000), &brackets).unwrap(), Decimal::ZERO);
/// assert_eq!(annual_withholding_tax(Decimal::from(500_000), &brackets).unwrap(), Decimal::from(42_500));
/// ```
pub fn annual_withholding_tax(
    annual_taxable: Decimal,
    brackets: &[TaxBracket],
) -> EngineResult<Decimal> {
    let income = annual_taxable.max(Decimal::ZERO);
    let (_, bracket) =
        find_bracket(income, brackets).ok_or_else(|| EngineError::CalculationError {
            message: format!("no tax bracket covers annual taxable income {}", income),
        })?;
    let tax = bracket
        .tax_for(income)
        .ok_or_else(|| overflow("annual withholding tax"))?;
    Ok(tax.max(Decimal::ZERO))
}
