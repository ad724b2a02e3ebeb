//! Core data models for the Payroll Computation Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod calculation_result;
mod employee;
mod pay_period;
mod payroll_entry;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use calculation_result::{AuditStep, CoverageWarning, DailyPayLine, GrossPayResult};
pub use employee::EmployeeProfile;
pub use pay_period::{PayrollPeriod, PeriodStatus, WeekId};
pub use payroll_entry::{AdHocDeductions, EntryStatus, PayrollEntry, StatutoryDeductions};
