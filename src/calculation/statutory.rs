//! Statutory deduction calculation.
//!
//! Converts a weekly gross pay figure into the four mandated weekly
//! deductions: SSS, PhilHealth, Pag-IBIG and withholding tax.

use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StatutorySchedule;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, StatutoryDeductions};

use super::contributions::{
    MONTHS_PER_YEAR, WEEKS_PER_MONTH, monthly_equivalent, pagibig_contribution,
    philhealth_contribution, sss_contribution,
};
use super::money::{overflow, round_money};
use super::withholding_tax::{annual_withholding_tax, find_bracket};

/// Number of audit steps [`calculate_statutory_deductions`] records.
pub const STATUTORY_AUDIT_STEPS: u32 = 5;

/// The result of a statutory deduction calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryResult {
    /// The weekly deductions, each rounded to 2 decimal places.
    pub deductions: StatutoryDeductions,
    /// Weekly gross times four.
    pub monthly_equivalent: Decimal,
    /// Annual income the tax brackets were applied to, floored at zero.
    pub annual_taxable: Decimal,
    /// One step per derived figure, in calculation order.
    pub audit_steps: Vec<AuditStep>,
}

fn default_schedule() -> &'static StatutorySchedule {
    static SCHEDULE: OnceLock<StatutorySchedule> = OnceLock::new();
    SCHEDULE.get_or_init(StatutorySchedule::default)
}

/// Computes the weekly statutory deductions for `weekly_gross` under the
/// built-in Philippine schedule.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_statutory_deductions;
/// use rust_decimal::Decimal;
///
/// let deductions = compute_statutory_deductions(Decimal::from(1000)).unwrap();
/// assert_eq!(deductions.sss.to_string(), "50.00");
/// assert_eq!(deductions.philhealth.to_string(), "62.50");
/// assert_eq!(deductions.pagibig.to_string(), "20.00");
/// assert_eq!(deductions.withholding_tax.to_string(), "0.00");
/// ```
pub fn compute_statutory_deductions(weekly_gross: Decimal) -> EngineResult<StatutoryDeductions> {
    calculate_statutory_deductions(weekly_gross, default_schedule(), 1)
        .map(|result| result.deductions)
}

/// Computes the weekly statutory deductions for `weekly_gross` under `schedule`.
///
/// The steps are applied in order:
/// 1. the monthly equivalent is `weekly_gross * 4`
/// 2. SSS, PhilHealth and Pag-IBIG are computed monthly from it
/// 3. annual taxable income is `12 * (monthly - contributions)`, floored at zero,
///    and the bracket table gives the annual tax
/// 4. contributions are divided by 4 and the tax by 12 then 4; each weekly
///    figure is rounded to 2 decimal places
///
/// # Arguments
///
/// * `weekly_gross` - Gross pay for one weekly period
/// * `schedule` - The statutory schedule to apply
/// * `step_number` - The step number of the first audit step
///
/// # Returns
///
/// A [`StatutoryResult`], `NegativeInput` if `weekly_gross` is negative, or
/// `CalculationError` if an intermediate amount does not fit in a `Decimal`.
pub fn calculate_statutory_deductions(
    weekly_gross: Decimal,
    schedule: &StatutorySchedule,
    step_number: u32,
) -> EngineResult<StatutoryResult> {
    if weekly_gross < Decimal::ZERO {
        return Err(EngineError::NegativeInput {
            field: "gross_pay".to_string(),
            value: weekly_gross,
        });
    }

    let contributions = &schedule.contributions;
    let monthly =
        monthly_equivalent(weekly_gross).ok_or_else(|| overflow("monthly equivalent gross"))?;

    let sss = sss_contribution(monthly, &contributions.sss);
    let philhealth_monthly = philhealth_contribution(monthly, &contributions.philhealth);
    let pagibig_monthly = pagibig_contribution(monthly, &contributions.pagibig);

    let monthly_contributions = sss
        .monthly
        .checked_add(philhealth_monthly)
        .and_then(|sum| sum.checked_add(pagibig_monthly))
        .ok_or_else(|| overflow("monthly contributions"))?;
    let annual_gross = monthly
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| overflow("annual gross"))?;
    let annual_contributions = monthly_contributions
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or_else(|| overflow("annual contributions"))?;
    let annual_taxable = (annual_gross - annual_contributions).max(Decimal::ZERO);
    let annual_tax = annual_withholding_tax(annual_taxable, &schedule.brackets)?;
    let bracket_number = find_bracket(annual_taxable, &schedule.brackets)
        .map(|(index, _)| index + 1)
        .unwrap_or_default();

    let deductions = StatutoryDeductions {
        sss: round_money(sss.monthly / WEEKS_PER_MONTH),
        philhealth: round_money(philhealth_monthly / WEEKS_PER_MONTH),
        pagibig: round_money(pagibig_monthly / WEEKS_PER_MONTH),
        withholding_tax: round_money(annual_tax / MONTHS_PER_YEAR / WEEKS_PER_MONTH),
    };

    debug!(
        weekly_gross = %weekly_gross,
        monthly_equivalent = %monthly,
        annual_taxable = %annual_taxable,
        bracket = bracket_number,
        "Computed statutory deductions"
    );

    let audit_steps = vec![
        AuditStep {
            step_number,
            rule_id: "monthly_equivalent".to_string(),
            rule_name: "Monthly Equivalent Gross".to_string(),
            input: serde_json::json!({ "weekly_gross": weekly_gross.normalize().to_string() }),
            output: serde_json::json!({ "monthly_equivalent": monthly.normalize().to_string() }),
            reasoning: format!(
                "{} x {} weeks = {}",
                weekly_gross.normalize(),
                WEEKS_PER_MONTH,
                monthly.normalize()
            ),
        },
        AuditStep {
            step_number: step_number + 1,
            rule_id: "sss_contribution".to_string(),
            rule_name: "SSS Contribution".to_string(),
            input: serde_json::json!({
                "monthly_equivalent": monthly.normalize().to_string(),
                "msc_floor": contributions.sss.msc_floor.normalize().to_string(),
                "msc_ceiling": contributions.sss.msc_ceiling.normalize().to_string(),
                "msc_step": contributions.sss.msc_step.normalize().to_string()
            }),
            output: serde_json::json!({
                "monthly_salary_credit": sss.monthly_salary_credit.normalize().to_string(),
                "monthly": sss.monthly.normalize().to_string(),
                "weekly": deductions.sss.to_string()
            }),
            reasoning: format!(
                "MSC {} x {} = {} monthly, {} weekly",
                sss.monthly_salary_credit.normalize(),
                contributions.sss.rate.normalize(),
                sss.monthly.normalize(),
                deductions.sss
            ),
        },
        AuditStep {
            step_number: step_number + 2,
            rule_id: "philhealth_contribution".to_string(),
            rule_name: "PhilHealth Contribution".to_string(),
            input: serde_json::json!({
                "monthly_equivalent": monthly.normalize().to_string(),
                "income_floor": contributions.philhealth.income_floor.normalize().to_string(),
                "income_ceiling": contributions.philhealth.income_ceiling.normalize().to_string()
            }),
            output: serde_json::json!({
                "monthly": philhealth_monthly.normalize().to_string(),
                "weekly": deductions.philhealth.to_string()
            }),
            reasoning: format!(
                "clamped income x {} = {} monthly, {} weekly",
                contributions.philhealth.rate.normalize(),
                philhealth_monthly.normalize(),
                deductions.philhealth
            ),
        },
        AuditStep {
            step_number: step_number + 3,
            rule_id: "pagibig_contribution".to_string(),
            rule_name: "Pag-IBIG Contribution".to_string(),
            input: serde_json::json!({
                "monthly_equivalent": monthly.normalize().to_string(),
                "monthly_cap": contributions.pagibig.monthly_cap.normalize().to_string()
            }),
            output: serde_json::json!({
                "monthly": pagibig_monthly.normalize().to_string(),
                "weekly": deductions.pagibig.to_string()
            }),
            reasoning: format!(
                "min({} x {}, {}) = {} monthly, {} weekly",
                monthly.normalize(),
                contributions.pagibig.rate.normalize(),
                contributions.pagibig.monthly_cap.normalize(),
                pagibig_monthly.normalize(),
                deductions.pagibig
            ),
        },
        AuditStep {
            step_number: step_number + 4,
            rule_id: "withholding_tax".to_string(),
            rule_name: "Withholding Tax".to_string(),
            input: serde_json::json!({
                "annual_gross": annual_gross.normalize().to_string(),
                "annual_contributions": (monthly_contributions * MONTHS_PER_YEAR).normalize().to_string()
            }),
            output: serde_json::json!({
                "annual_taxable": annual_taxable.normalize().to_string(),
                "bracket": bracket_number,
                "annual_tax": annual_tax.normalize().to_string(),
                "weekly": deductions.withholding_tax.to_string()
            }),
            reasoning: format!(
                "bracket {} on {} = {} annual, {} weekly",
                bracket_number,
                annual_taxable.normalize(),
                annual_tax.normalize(),
                deductions.withholding_tax
            ),
        },
    ];

    Ok(StatutoryResult {
        deductions,
        monthly_equivalent: monthly,
        annual_taxable,
        audit_steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn compute(gross: &str) -> StatutoryDeductions {
        compute_statutory_deductions(dec(gross)).unwrap()
    }

    // ==========================================================================
    // SD-001: floors apply to a low weekly gross
    // ==========================================================================
    #[test]
    fn test_sd_001_weekly_gross_1000() {
        let d = compute("1000.00");
        assert_eq!(d.sss, dec("50.00"));
        assert_eq!(d.philhealth, dec("62.50"));
        assert_eq!(d.pagibig, dec("20.00"));
        assert_eq!(d.withholding_tax, dec("0.00"));
        assert_eq!(d.sss.to_string(), "50.00");
        assert_eq!(d.withholding_tax.to_string(), "0.00");
    }

    // ==========================================================================
    // SD-002: mid-range weekly gross, taxable
    // ==========================================================================
    #[test]
    fn test_sd_002_weekly_gross_10000() {
        // monthly 40000: MSC caps at 30000 -> 1500; PhilHealth 1000; Pag-IBIG 200
        // annual taxable = 480000 - 2700*12 = 447600 -> 22500 + 47600*0.2 = 32020
        let result =
            calculate_statutory_deductions(dec("10000"), &StatutorySchedule::default(), 1)
                .unwrap();
        let d = result.deductions;
        assert_eq!(result.monthly_equivalent, dec("40000"));
        assert_eq!(result.annual_taxable, dec("447600"));
        assert_eq!(d.sss, dec("375.00"));
        assert_eq!(d.philhealth, dec("250.00"));
        assert_eq!(d.pagibig, dec("50.00"));
        // 32020 / 12 / 4 = 667.0833...
        assert_eq!(d.withholding_tax, dec("667.08"));
    }

    // ==========================================================================
    // SD-003: SSS credit rounds up between steps
    // ==========================================================================
    #[test]
    fn test_sd_003_sss_rounds_credit_up() {
        // monthly 5200 -> MSC 5500 -> 275 monthly -> 68.75 weekly
        assert_eq!(compute("1300").sss, dec("68.75"));
    }

    // ==========================================================================
    // SD-004: zero gross still owes the contribution floors
    // ==========================================================================
    #[test]
    fn test_sd_004_zero_gross() {
        let d = compute("0");
        assert_eq!(d.sss, dec("50.00"));
        assert_eq!(d.philhealth, dec("62.50"));
        assert_eq!(d.pagibig, dec("0.00"));
        assert_eq!(d.withholding_tax, dec("0.00"));
    }

    #[test]
    fn test_negative_gross_is_rejected() {
        match compute_statutory_deductions(dec("-0.01")) {
            Err(EngineError::NegativeInput { field, value }) => {
                assert_eq!(field, "gross_pay");
                assert_eq!(value, dec("-0.01"));
            }
            other => panic!("Expected NegativeInput, got {:?}", other),
        }
    }

    #[test]
    fn test_gross_beyond_decimal_range_is_an_error() {
        match compute_statutory_deductions(Decimal::MAX) {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("monthly equivalent"), "{}", message);
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }

        // The monthly figure fits but twelve months of it do not.
        match compute_statutory_deductions(dec("10000000000000000000000000000")) {
            Err(EngineError::CalculationError { message }) => {
                assert!(message.contains("annual gross"), "{}", message);
            }
            other => panic!("Expected CalculationError, got {:?}", other),
        }

        assert!(compute_statutory_deductions(dec("1000000000000000000000000000")).is_ok());
    }

    #[test]
    fn test_high_earner_reaches_top_bracket() {
        // monthly 800000: contributions 1500 + 2500 + 200 = 4200
        // annual taxable = 9600000 - 50400 = 9549600
        // tax = 2202500 + 1549600*0.35 = 2744860 -> 57184.5833 weekly
        let result =
            calculate_statutory_deductions(dec("200000"), &StatutorySchedule::default(), 1)
                .unwrap();
        assert_eq!(result.annual_taxable, dec("9549600"));
        assert_eq!(result.deductions.withholding_tax, dec("57184.58"));
        assert_eq!(result.audit_steps[4].output["bracket"], 6);
    }

    #[test]
    fn test_all_outputs_have_two_decimal_places() {
        let d = compute("1234.567");
        for (field, value) in d.items() {
            assert_eq!(value.scale(), 2, "{} = {}", field, value);
        }
    }

    #[test]
    fn test_audit_steps_are_numbered_from_step_number() {
        let result =
            calculate_statutory_deductions(dec("5000"), &StatutorySchedule::default(), 3)
                .unwrap();
        assert_eq!(result.audit_steps.len(), STATUTORY_AUDIT_STEPS as usize);
        let numbers: Vec<u32> = result.audit_steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![3, 4, 5, 6, 7]);
        assert_eq!(result.audit_steps[1].rule_id, "sss_contribution");
        assert_eq!(result.audit_steps[1].output["weekly"], "250.00");
    }

    #[test]
    fn test_custom_schedule_is_honoured() {
        let mut schedule = StatutorySchedule::default();
        schedule.contributions.pagibig.monthly_cap = Decimal::from(100);
        let result = calculate_statutory_deductions(dec("10000"), &schedule, 1).unwrap();
        assert_eq!(result.deductions.pagibig, dec("25.00"));
    }
}
