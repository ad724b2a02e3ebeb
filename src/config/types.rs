//! Configuration types for statutory deductions and payroll runs.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. [`StatutorySchedule::default`]
//! is the built-in Philippine schedule the engine uses when no directory is loaded.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Metadata about a statutory schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleMetadata {
    /// Short code of the schedule (e.g., "PH-2025").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Version or effective date.
    pub version: String,
    /// Where the published rates come from.
    pub source_url: String,
}

/// SSS contribution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SssConfig {
    /// Employee share applied to the monthly salary credit.
    pub rate: Decimal,
    /// Lowest monthly salary credit.
    pub msc_floor: Decimal,
    /// Highest monthly salary credit.
    pub msc_ceiling: Decimal,
    /// Salary credits are rounded up to a multiple of this step.
    pub msc_step: Decimal,
}

/// PhilHealth contribution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhilHealthConfig {
    /// Employee share applied to the clamped monthly income.
    pub rate: Decimal,
    /// Monthly income floor.
    pub income_floor: Decimal,
    /// Monthly income ceiling.
    pub income_ceiling: Decimal,
}

/// Pag-IBIG contribution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagIbigConfig {
    /// Employee share applied to monthly income.
    pub rate: Decimal,
    /// Maximum monthly contribution.
    pub monthly_cap: Decimal,
}

/// Contributions configuration file structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionsConfig {
    /// SSS parameters.
    pub sss: SssConfig,
    /// PhilHealth parameters.
    pub philhealth: PhilHealthConfig,
    /// Pag-IBIG parameters.
    pub pagibig: PagIbigConfig,
}

/// One bracket of the annual withholding tax table.
///
/// Tax within the bracket is `base_tax + (income - excess_over) * rate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Inclusive upper bound; `None` for the top bracket.
    #[serde(default)]
    pub up_to: Option<Decimal>,
    /// Tax due at the bottom of the bracket.
    pub base_tax: Decimal,
    /// Marginal rate within the bracket.
    pub rate: Decimal,
    /// Income above which the marginal rate applies.
    pub excess_over: Decimal,
}

impl TaxBracket {
    /// Annual tax for `income` under this bracket's formula, or `None` if it
    /// does not fit in a `Decimal`.
    pub fn tax_for(&self, income: Decimal) -> Option<Decimal> {
        income
            .checked_sub(self.excess_over)?
            .checked_mul(self.rate)?
            .checked_add(self.base_tax)
    }
}

/// Tax brackets configuration file structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracketsConfig {
    /// Brackets in ascending order of upper bound.
    pub brackets: Vec<TaxBracket>,
}

/// How a payroll run treats days without attendance records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoveragePolicy {
    /// Compute the entry and report the gaps as warnings.
    #[default]
    Warn,
    /// Fail the employee with `MissingCoverage`.
    Reject,
}

/// Settings for payroll runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSettings {
    /// Treatment of uncovered days.
    #[serde(default)]
    pub coverage_policy: CoveragePolicy,
}

/// The complete statutory deduction schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutorySchedule {
    /// Schedule metadata.
    pub metadata: ScheduleMetadata,
    /// Contribution parameters.
    pub contributions: ContributionsConfig,
    /// Annual withholding tax brackets, ascending.
    pub brackets: Vec<TaxBracket>,
}

impl StatutorySchedule {
    /// Checks the schedule for internal consistency.
    ///
    /// Brackets must be ascending with exactly one unbounded bracket at the top,
    /// and the tax table must be continuous: each bracket's formula evaluated at
    /// its upper bound equals the next bracket's formula at the same income.
    pub fn validate(&self) -> Result<(), String> {
        let c = &self.contributions;
        for (field, rate) in [
            ("sss.rate", c.sss.rate),
            ("philhealth.rate", c.philhealth.rate),
            ("pagibig.rate", c.pagibig.rate),
        ] {
            if rate < Decimal::ZERO {
                return Err(format!("{} must not be negative", field));
            }
        }
        if c.sss.msc_floor > c.sss.msc_ceiling {
            return Err("sss.msc_floor exceeds sss.msc_ceiling".to_string());
        }
        if c.sss.msc_step <= Decimal::ZERO {
            return Err("sss.msc_step must be positive".to_string());
        }
        if c.philhealth.income_floor > c.philhealth.income_ceiling {
            return Err("philhealth.income_floor exceeds philhealth.income_ceiling".to_string());
        }
        if c.pagibig.monthly_cap < Decimal::ZERO {
            return Err("pagibig.monthly_cap must not be negative".to_string());
        }

        let Some((top, bounded)) = self.brackets.split_last() else {
            return Err("at least one tax bracket is required".to_string());
        };
        if top.up_to.is_some() {
            return Err("the last tax bracket must be unbounded".to_string());
        }

        let mut previous_bound: Option<Decimal> = None;
        for (index, bracket) in bounded.iter().enumerate() {
            let Some(bound) = bracket.up_to else {
                return Err(format!("tax bracket {} is unbounded but not last", index + 1));
            };
            if previous_bound.is_some_and(|p| bound <= p) {
                return Err(format!("tax bracket {} is not in ascending order", index + 1));
            }
            let next = &self.brackets[index + 1];
            let (Some(below), Some(above)) = (bracket.tax_for(bound), next.tax_for(bound)) else {
                return Err(format!("tax at {} is outside the supported decimal range", bound));
            };
            if below != above {
                return Err(format!(
                    "tax table is discontinuous at {}: {} vs {}",
                    bound, below, above
                ));
            }
            previous_bound = Some(bound);
        }

        for (index, bracket) in self.brackets.iter().enumerate() {
            if bracket.rate < Decimal::ZERO || bracket.base_tax < Decimal::ZERO {
                return Err(format!("tax bracket {} has a negative rate or base", index + 1));
            }
        }

        Ok(())
    }
}

impl Default for StatutorySchedule {
    fn default() -> Self {
        let bracket = |up_to: Option<i64>, base_tax: i64, rate: Decimal, excess_over: i64| {
            TaxBracket {
                up_to: up_to.map(Decimal::from),
                base_tax: Decimal::from(base_tax),
                rate,
                excess_over: Decimal::from(excess_over),
            }
        };

        Self {
            metadata: ScheduleMetadata {
                code: "PH-2025".to_string(),
                name: "Philippine statutory deductions (weekly payroll)".to_string(),
                version: "2025-01-01".to_string(),
                source_url: "https://www.bir.gov.ph/income-tax".to_string(),
            },
            contributions: ContributionsConfig {
                sss: SssConfig {
                    rate: Decimal::new(5, 2),
                    msc_floor: Decimal::from(4_000),
                    msc_ceiling: Decimal::from(30_000),
                    msc_step: Decimal::from(500),
                },
                philhealth: PhilHealthConfig {
                    rate: Decimal::new(25, 3),
                    income_floor: Decimal::from(10_000),
                    income_ceiling: Decimal::from(100_000),
                },
                pagibig: PagIbigConfig {
                    rate: Decimal::new(2, 2),
                    monthly_cap: Decimal::from(200),
                },
            },
            brackets: vec![
                bracket(Some(250_000), 0, Decimal::ZERO, 0),
                bracket(Some(400_000), 0, Decimal::new(15, 2), 250_000),
                bracket(Some(800_000), 22_500, Decimal::new(20, 2), 400_000),
                bracket(Some(2_000_000), 102_500, Decimal::new(25, 2), 800_000),
                bracket(Some(8_000_000), 402_500, Decimal::new(30, 2), 2_000_000),
                bracket(None, 2_202_500, Decimal::new(35, 2), 8_000_000),
            ],
        }
    }
}
