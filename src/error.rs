//! Error types for the Payroll Computation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing payroll.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{PeriodStatus, WeekId};

/// The main error type for the Payroll Computation Engine.
///
/// Every validation failure is surfaced through this type. The engine never
/// falls back to a zero amount or a default rate when one of these applies.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
/// use payroll_engine::models::WeekId;
///
/// let error = EngineError::DuplicatePeriod {
///     week_id: WeekId::new(2025, 2).unwrap(),
/// };
/// assert_eq!(error.to_string(), "Payroll period 202502 already exists");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An attendance record carried a status outside the closed status set.
    #[error("Invalid attendance status '{status}' for employee '{employee_id}' on {date}")]
    InvalidStatus {
        /// The employee the record belongs to.
        employee_id: String,
        /// The work date of the record.
        date: NaiveDate,
        /// The unrecognised status label.
        status: String,
    },

    /// One or more days of a period have no attendance record.
    #[error("Missing attendance for employee '{employee_id}' on {} day(s): {}", .dates.len(), format_dates(.dates))]
    MissingCoverage {
        /// The employee with incomplete attendance.
        employee_id: String,
        /// The uncovered dates, in calendar order.
        dates: Vec<NaiveDate>,
    },

    /// A period with the same week id already exists and no overwrite was requested.
    #[error("Payroll period {week_id} already exists")]
    DuplicatePeriod {
        /// The colliding week id.
        week_id: WeekId,
    },

    /// An entry for the same employee and period already exists and no overwrite was requested.
    #[error("Payroll entry for employee '{employee_id}' in period {week_id} already exists")]
    DuplicateEntry {
        /// The employee of the existing entry.
        employee_id: String,
        /// The period of the existing entry.
        week_id: WeekId,
    },

    /// A monetary input that must be non-negative was negative.
    #[error("Negative value {value} supplied for '{field}'")]
    NegativeInput {
        /// The input field that was negative.
        field: String,
        /// The offending value.
        value: Decimal,
    },

    /// An attendance record was inconsistent with the computation it was supplied to.
    #[error("Invalid attendance for employee '{employee_id}' on {date}: {message}")]
    InvalidAttendance {
        /// The employee the computation was for.
        employee_id: String,
        /// The work date of the offending record.
        date: NaiveDate,
        /// A description of the inconsistency.
        message: String,
    },

    /// An ad-hoc deduction was not allowed for the employee.
    #[error("Invalid deduction '{field}': {message}")]
    InvalidDeduction {
        /// The deduction field.
        field: String,
        /// Why the deduction was rejected.
        message: String,
    },

    /// The referenced payroll period does not exist.
    #[error("Payroll period not found: {week_id}")]
    PeriodNotFound {
        /// The week id that was looked up.
        week_id: WeekId,
    },

    /// The period no longer accepts entry writes.
    #[error("Payroll period {week_id} is {status} and no longer accepts entries")]
    PeriodLocked {
        /// The locked period.
        week_id: WeekId,
        /// Its current status.
        status: PeriodStatus,
    },

    /// A period status change is not part of the lifecycle.
    #[error("Payroll period {week_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// The period being updated.
        week_id: WeekId,
        /// The current status.
        from: PeriodStatus,
        /// The requested status.
        to: PeriodStatus,
    },

    /// The employee directory has no profile for the employee.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee id that was looked up.
        employee_id: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

fn format_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(NaiveDate::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
