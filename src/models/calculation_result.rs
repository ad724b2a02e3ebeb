//! Calculation result models for the Payroll Computation Engine.
//!
//! This module contains the [`GrossPayResult`] produced by the gross pay calculator,
//! the per-day [`DailyPayLine`]s and [`CoverageWarning`]s it is built from, and the
//! [`AuditStep`] records that explain each rule application.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AttendanceStatus;
use crate::error::{EngineError, EngineResult};

/// A single step in an audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Pay earned on a single calendar day.
///
/// Days without an attendance record still get a line, with no status and a zero
/// amount, so the lines always cover the whole period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPayLine {
    /// The calendar day.
    pub date: NaiveDate,
    /// The parsed attendance status, or `None` if the day has no record.
    pub status: Option<AttendanceStatus>,
    /// The daily rate applied (record rate if positive, else the base rate).
    pub rate: Decimal,
    /// The status multiplier.
    pub multiplier: Decimal,
    /// The record's signed adjustment.
    pub adjustment: Decimal,
    /// `rate * multiplier + adjustment`, unrounded.
    pub amount: Decimal,
}

/// A day in the period that has no attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageWarning {
    /// The uncovered day.
    pub date: NaiveDate,
    /// A human-readable description.
    pub message: String,
}

/// Gross pay for one employee over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossPayResult {
    /// The employee paid.
    pub employee_id: String,
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    /// Sum of the daily amounts, rounded to 2 decimal places.
    pub gross_pay: Decimal,
    /// One line per calendar day.
    pub daily_lines: Vec<DailyPayLine>,
    /// Days without a record.
    pub coverage_warnings: Vec<CoverageWarning>,
}

impl GrossPayResult {
    /// Returns true if every day of the range had a record.
    pub fn is_fully_covered(&self) -> bool {
        self.coverage_warnings.is_empty()
    }

    /// Turns coverage warnings into a [`EngineError::MissingCoverage`] error.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{CoverageWarning, GrossPayResult};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    /// let result = GrossPayResult {
    ///     employee_id: "emp_001".to_string(),
    ///     start_date: day,
    ///     end_date: day,
    ///     gross_pay: Decimal::ZERO,
    ///     daily_lines: vec![],
    ///     coverage_warnings: vec![CoverageWarning {
    ///         date: day,
    ///         message: "no attendance record".to_string(),
    ///     }],
    /// };
    /// assert!(result.require_full_coverage().is_err());
    /// ```
    pub fn require_full_coverage(&self) -> EngineResult<()> {
        if self.is_fully_covered() {
            return Ok(());
        }
        Err(EngineError::MissingCoverage {
            employee_id: self.employee_id.clone(),
            dates: self.coverage_warnings.iter().map(|w| w.date).collect(),
        })
    }
}
