//! Collaborator interfaces and the in-memory payroll ledger.
//!
//! The calculation layer reads attendance, employee profiles and periods
//! through these traits and writes periods and entries back through them.
//! [`PayrollLedger`] implements all four.

mod ledger;

pub use ledger::PayrollLedger;

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, EmployeeProfile, PayrollEntry, PayrollPeriod, PeriodStatus, WeekId,
};

/// Source of attendance records.
pub trait AttendanceSource {
    /// Returns the employee's records dated within the period, ordered by date.
    fn fetch_attendance(
        &self,
        employee_id: &str,
        period: &PayrollPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>>;
}

/// Source of employee profiles.
pub trait EmployeeDirectory {
    /// Returns the profile, or `EmployeeNotFound`.
    fn fetch_employee_profile(&self, employee_id: &str) -> EngineResult<EmployeeProfile>;
}

/// Storage for payroll periods.
///
/// Writes are atomic: the uniqueness check on `week_id` and the write happen
/// under one lock, so two concurrent inserts of the same week cannot both succeed.
pub trait PeriodStore {
    /// Returns the period with the latest end date, if any.
    fn fetch_last_period(&self) -> EngineResult<Option<PayrollPeriod>>;

    /// Looks up a period by week id.
    fn period(&self, week_id: WeekId) -> EngineResult<Option<PayrollPeriod>>;

    /// Inserts a period.
    ///
    /// Fails with `DuplicatePeriod` if the week id is taken and `overwrite` is
    /// false. With `overwrite`, the existing period and all of its entries are
    /// removed and the removed period is returned.
    fn insert_period(
        &self,
        period: PayrollPeriod,
        overwrite: bool,
    ) -> EngineResult<Option<PayrollPeriod>>;

    /// Replaces the period stored under `from` with `period`, moving its entries
    /// to the new week id. The collision policy is the one of [`Self::insert_period`].
    fn reschedule_period(
        &self,
        from: WeekId,
        period: PayrollPeriod,
        overwrite: bool,
    ) -> EngineResult<PayrollPeriod>;

    /// Moves a period to `status`, failing with `InvalidStatusTransition` if the
    /// lifecycle does not allow it.
    fn set_period_status(&self, week_id: WeekId, status: PeriodStatus)
    -> EngineResult<PayrollPeriod>;
}

/// Storage for payroll entries.
pub trait EntryStore {
    /// Inserts an entry.
    ///
    /// Fails with `PeriodNotFound` if the period does not exist, `PeriodLocked`
    /// if it no longer accepts entries, and `DuplicateEntry` if the employee
    /// already has an entry for the period and `overwrite` is false. Returns the
    /// replaced entry, if any.
    fn insert_entry(
        &self,
        entry: PayrollEntry,
        overwrite: bool,
    ) -> EngineResult<Option<PayrollEntry>>;

    /// Looks up the entry for an employee in a period.
    fn entry(&self, employee_id: &str, week_id: WeekId) -> EngineResult<Option<PayrollEntry>>;

    /// Returns all entries of a period, ordered by employee id.
    fn entries_for_period(&self, week_id: WeekId) -> EngineResult<Vec<PayrollEntry>>;
}
