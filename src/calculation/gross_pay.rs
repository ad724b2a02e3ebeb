//! Gross pay calculation functionality.
//!
//! This module turns an employee's attendance records over a date range into a
//! gross pay figure, one calendar day at a time.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, CoverageWarning, DailyPayLine, EmployeeProfile,
    GrossPayResult, PayrollPeriod,
};

use super::money::{overflow, round_money};
use super::status_rules::status_multiplier;

/// Computes gross pay for an employee over a payroll period.
///
/// See [`calculate_gross_pay`] for the rules.
pub fn compute_gross_pay(
    profile: &EmployeeProfile,
    period: &PayrollPeriod,
    records: &[AttendanceRecord],
) -> EngineResult<GrossPayResult> {
    calculate_gross_pay(profile, period.start_date, period.end_date, records)
}

/// Computes gross pay for an employee over `[start_date, end_date]`.
///
/// Every record is validated before anything is priced, so the result is
/// all-or-nothing:
/// - a record for another employee, or a second record for the same day, is
///   rejected with `InvalidAttendance`
/// - a status outside the closed set is rejected with `InvalidStatus`
/// - a negative base or record rate is rejected with `NegativeInput`
///
/// Records dated outside the range are ignored. Each day in the range then
/// contributes `rate * multiplier(status) + adjustment`, where `rate` is the
/// record's own rate when it is positive and the profile's base rate otherwise.
/// A day without a record contributes zero and yields a [`CoverageWarning`].
/// The daily amounts are summed exactly and only the total is rounded.
/// A daily amount or total that does not fit in a `Decimal` fails with
/// `CalculationError`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::calculate_gross_pay;
/// use payroll_engine::models::{AttendanceRecord, EmployeeProfile};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let profile = EmployeeProfile {
///     id: "emp_001".to_string(),
///     base_daily_rate: Decimal::from(600),
///     cost_center_flag: false,
/// };
/// let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
/// let records: Vec<AttendanceRecord> = monday
///     .iter_days()
///     .take(7)
///     .map(|work_date| AttendanceRecord {
///         employee_id: "emp_001".to_string(),
///         work_date,
///         status: "Present".to_string(),
///         daily_rate: None,
///         adjustment: Decimal::ZERO,
///     })
///     .collect();
///
/// let sunday = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
/// let result = calculate_gross_pay(&profile, monday, sunday, &records).unwrap();
/// assert_eq!(result.gross_pay.to_string(), "4200.00");
/// assert!(result.coverage_warnings.is_empty());
/// ```
pub fn calculate_gross_pay(
    profile: &EmployeeProfile,
    start_date: NaiveDate,
    end_date: NaiveDate,
    records: &[AttendanceRecord],
) -> EngineResult<GrossPayResult> {
    profile.validate()?;

    if end_date < start_date {
        return Err(EngineError::CalculationError {
            message: format!("date range ends ({}) before it starts ({})", end_date, start_date),
        });
    }

    let by_date = index_records(profile, start_date, end_date, records)?;

    let mut daily_lines = Vec::new();
    let mut coverage_warnings = Vec::new();

    for date in start_date.iter_days().take_while(|d| *d <= end_date) {
        match by_date.get(&date) {
            Some((record, status)) => {
                let rate = match record.daily_rate {
                    Some(rate) if rate > Decimal::ZERO => rate,
                    _ => profile.base_daily_rate,
                };
                let multiplier = status_multiplier(*status);
                let amount = rate
                    .checked_mul(multiplier)
                    .and_then(|pay| pay.checked_add(record.adjustment))
                    .ok_or_else(|| overflow(&format!("pay for {}", date)))?;

                daily_lines.push(DailyPayLine {
                    date,
                    status: Some(*status),
                    rate,
                    multiplier,
                    adjustment: record.adjustment,
                    amount,
                });
            }
            None => {
                coverage_warnings.push(CoverageWarning {
                    date,
                    message: format!("No attendance record for {} on {}", profile.id, date),
                });
                daily_lines.push(DailyPayLine {
                    date,
                    status: None,
                    rate: profile.base_daily_rate,
                    multiplier: Decimal::ZERO,
                    adjustment: Decimal::ZERO,
                    amount: Decimal::ZERO,
                });
            }
        }
    }

    let unrounded = daily_lines
        .iter()
        .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.amount))
        .ok_or_else(|| overflow("gross pay"))?;
    let gross_pay = round_money(unrounded);

    if !coverage_warnings.is_empty() {
        warn!(
            employee_id = %profile.id,
            missing_days = coverage_warnings.len(),
            "Attendance does not cover the whole period"
        );
    }
    debug!(
        employee_id = %profile.id,
        start_date = %start_date,
        end_date = %end_date,
        gross_pay = %gross_pay,
        "Computed gross pay"
    );

    Ok(GrossPayResult {
        employee_id: profile.id.clone(),
        start_date,
        end_date,
        gross_pay,
        daily_lines,
        coverage_warnings,
    })
}

/// Validates the records and indexes the in-range ones by work date.
fn index_records<'a>(
    profile: &EmployeeProfile,
    start_date: NaiveDate,
    end_date: NaiveDate,
    records: &'a [AttendanceRecord],
) -> EngineResult<BTreeMap<NaiveDate, (&'a AttendanceRecord, AttendanceStatus)>> {
    let mut by_date = BTreeMap::new();

    for record in records {
        if record.employee_id != profile.id {
            return Err(EngineError::InvalidAttendance {
                employee_id: profile.id.clone(),
                date: record.work_date,
                message: format!("record belongs to employee '{}'", record.employee_id),
            });
        }

        let status = record.parsed_status()?;

        if let Some(rate) = record.daily_rate.filter(|r| *r < Decimal::ZERO) {
            return Err(EngineError::NegativeInput {
                field: "daily_rate".to_string(),
                value: rate,
            });
        }

        if record.work_date < start_date || record.work_date > end_date {
            debug!(
                employee_id = %profile.id,
                work_date = %record.work_date,
                "Ignoring attendance outside the period"
            );
            continue;
        }

        if by_date.insert(record.work_date, (record, status)).is_some() {
            return Err(EngineError::InvalidAttendance {
                employee_id: profile.id.clone(),
                date: record.work_date,
                message: "more than one attendance record for the day".to_string(),
            });
        }
    }

    Ok(by_date)
}
