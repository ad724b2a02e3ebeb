//! In-memory payroll ledger.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::{AttendanceSource, EmployeeDirectory, EntryStore, PeriodStore};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, EmployeeProfile, EntryStatus, PayrollEntry, PayrollPeriod, PeriodStatus,
    WeekId,
};

#[derive(Debug, Default)]
struct LedgerState {
    periods: BTreeMap<WeekId, PayrollPeriod>,
    entries: BTreeMap<(WeekId, String), PayrollEntry>,
    employees: BTreeMap<String, EmployeeProfile>,
    attendance: BTreeMap<(String, NaiveDate), AttendanceRecord>,
    /// Periods that have been approved at some point; they stay locked after closing.
    finalized: BTreeSet<WeekId>,
}

impl LedgerState {
    /// Removes a period and every entry that belongs to it.
    fn remove_period(&mut self, week_id: WeekId) -> Option<PayrollPeriod> {
        let removed = self.periods.remove(&week_id)?;
        self.finalized.remove(&week_id);
        let before = self.entries.len();
        self.entries.retain(|(entry_week, _), _| *entry_week != week_id);
        info!(
            week_id = %week_id,
            entries_removed = before - self.entries.len(),
            "Removed payroll period"
        );
        Some(removed)
    }

    fn is_locked(&self, period: &PayrollPeriod) -> bool {
        !period.status.accepts_entries() || self.finalized.contains(&period.week_id)
    }

    fn ensure_unlocked(&self, period: &PayrollPeriod) -> EngineResult<()> {
        if !self.is_locked(period) {
            Ok(())
        } else {
            Err(EngineError::PeriodLocked {
                week_id: period.week_id,
                status: period.status,
            })
        }
    }
}

/// A thread-safe, in-memory store of employees, attendance, periods and entries.
///
/// Every write takes a single lock for both its checks and its mutation, so the
/// uniqueness of periods per week id and of entries per (employee, period) holds
/// under concurrent use.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::period_starting;
/// use payroll_engine::store::{PayrollLedger, PeriodStore};
/// use chrono::NaiveDate;
///
/// let ledger = PayrollLedger::new();
/// let monday = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
/// let period = period_starting(monday, monday).unwrap();
///
/// ledger.insert_period(period.clone(), false).unwrap();
/// assert!(ledger.insert_period(period, false).is_err());
/// ```
#[derive(Debug, Default)]
pub struct PayrollLedger {
    state: Mutex<LedgerState>,
}

impl PayrollLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|_| EngineError::CalculationError {
            message: "payroll ledger lock poisoned".to_string(),
        })
    }

    /// Adds or replaces an employee profile.
    pub fn upsert_employee(&self, profile: EmployeeProfile) -> EngineResult<()> {
        profile.validate()?;
        let mut state = self.lock()?;
        state.employees.insert(profile.id.clone(), profile);
        Ok(())
    }

    /// Records one day of attendance.
    ///
    /// The status label and rate are validated on the way in. A second record for
    /// the same employee and day is rejected with `InvalidAttendance` unless
    /// `overwrite` is set. A day already paid out in an approved or paid entry
    /// cannot be changed.
    pub fn record_attendance(
        &self,
        record: AttendanceRecord,
        overwrite: bool,
    ) -> EngineResult<Option<AttendanceRecord>> {
        record.parsed_status()?;
        if let Some(rate) = record.daily_rate.filter(|r| *r < Decimal::ZERO) {
            return Err(EngineError::NegativeInput {
                field: "daily_rate".to_string(),
                value: rate,
            });
        }

        let mut state = self.lock()?;
        let key = (record.employee_id.clone(), record.work_date);

        if state.attendance.contains_key(&key) && !overwrite {
            return Err(EngineError::InvalidAttendance {
                employee_id: record.employee_id,
                date: record.work_date,
                message: "attendance already recorded for this day".to_string(),
            });
        }

        let finalized = state.periods.values().find(|period| {
            period.contains_date(record.work_date)
                && state.is_locked(period)
                && state
                    .entries
                    .contains_key(&(period.week_id, record.employee_id.clone()))
        });
        if let Some(period) = finalized {
            return Err(EngineError::PeriodLocked {
                week_id: period.week_id,
                status: period.status,
            });
        }

        debug!(
            employee_id = %record.employee_id,
            date = %record.work_date,
            status = %record.status,
            "Recorded attendance"
        );
        Ok(state.attendance.insert(key, record))
    }

    /// Returns all periods ordered by week id.
    pub fn periods(&self) -> EngineResult<Vec<PayrollPeriod>> {
        Ok(self.lock()?.periods.values().cloned().collect())
    }
}

impl AttendanceSource for PayrollLedger {
    fn fetch_attendance(
        &self,
        employee_id: &str,
        period: &PayrollPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let state = self.lock()?;
        let from = (employee_id.to_string(), period.start_date);
        let to = (employee_id.to_string(), period.end_date);
        Ok(state
            .attendance
            .range(from..=to)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

impl EmployeeDirectory for PayrollLedger {
    fn fetch_employee_profile(&self, employee_id: &str) -> EngineResult<EmployeeProfile> {
        self.lock()?
            .employees
            .get(employee_id)
            .cloned()
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }
}

impl PeriodStore for PayrollLedger {
    fn fetch_last_period(&self) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self
            .lock()?
            .periods
            .values()
            .max_by_key(|period| period.end_date)
            .cloned())
    }

    fn period(&self, week_id: WeekId) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self.lock()?.periods.get(&week_id).cloned())
    }

    fn insert_period(
        &self,
        period: PayrollPeriod,
        overwrite: bool,
    ) -> EngineResult<Option<PayrollPeriod>> {
        let mut state = self.lock()?;

        let replaced = match state.periods.get(&period.week_id) {
            Some(_) if !overwrite => {
                return Err(EngineError::DuplicatePeriod {
                    week_id: period.week_id,
                });
            }
            Some(existing) => {
                state.ensure_unlocked(existing)?;
                state.remove_period(period.week_id)
            }
            None => None,
        };

        state.periods.insert(period.week_id, period);
        Ok(replaced)
    }

    fn reschedule_period(
        &self,
        from: WeekId,
        period: PayrollPeriod,
        overwrite: bool,
    ) -> EngineResult<PayrollPeriod> {
        let mut state = self.lock()?;

        let current = state
            .periods
            .get(&from)
            .ok_or(EngineError::PeriodNotFound { week_id: from })?;
        state.ensure_unlocked(current)?;

        let target = period.week_id;
        if target != from {
            if let Some(existing) = state.periods.get(&target) {
                if !overwrite {
                    return Err(EngineError::DuplicatePeriod { week_id: target });
                }
                state.ensure_unlocked(existing)?;
                state.remove_period(target);
            }
        }

        state.periods.remove(&from);
        let moving: Vec<(WeekId, String)> = state
            .entries
            .range((from, String::new())..)
            .take_while(|((week_id, _), _)| *week_id == from)
            .map(|(key, _)| key.clone())
            .collect();
        for key in moving {
            if let Some(mut entry) = state.entries.remove(&key) {
                entry.week_id = target;
                state.entries.insert((target, key.1), entry);
            }
        }

        state.periods.insert(target, period.clone());
        Ok(period)
    }

    fn set_period_status(
        &self,
        week_id: WeekId,
        status: PeriodStatus,
    ) -> EngineResult<PayrollPeriod> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let period = state
            .periods
            .get_mut(&week_id)
            .ok_or(EngineError::PeriodNotFound { week_id })?;
        if !period.status.can_transition_to(status) {
            return Err(EngineError::InvalidStatusTransition {
                week_id,
                from: period.status,
                to: status,
            });
        }
        period.status = status;
        if matches!(status, PeriodStatus::Approved | PeriodStatus::Paid) {
            state.finalized.insert(week_id);
        }

        let entry_status = match status {
            PeriodStatus::Approved => Some(EntryStatus::Approved),
            PeriodStatus::Paid => Some(EntryStatus::Paid),
            PeriodStatus::Rejected => Some(EntryStatus::Pending),
            _ => None,
        };
        if let Some(entry_status) = entry_status {
            state
                .entries
                .iter_mut()
                .filter(|((entry_week, _), _)| *entry_week == week_id)
                .for_each(|(_, entry)| entry.status = entry_status);
        }

        Ok(period.clone())
    }
}

impl EntryStore for PayrollLedger {
    fn insert_entry(
        &self,
        entry: PayrollEntry,
        overwrite: bool,
    ) -> EngineResult<Option<PayrollEntry>> {
        let mut state = self.lock()?;

        let period = state
            .periods
            .get(&entry.week_id)
            .ok_or(EngineError::PeriodNotFound {
                week_id: entry.week_id,
            })?;
        state.ensure_unlocked(period)?;

        let key = (entry.week_id, entry.employee_id.clone());
        if state.entries.contains_key(&key) && !overwrite {
            return Err(EngineError::DuplicateEntry {
                employee_id: entry.employee_id,
                week_id: entry.week_id,
            });
        }

        Ok(state.entries.insert(key, entry))
    }

    fn entry(&self, employee_id: &str, week_id: WeekId) -> EngineResult<Option<PayrollEntry>> {
        Ok(self
            .lock()?
            .entries
            .get(&(week_id, employee_id.to_string()))
            .cloned())
    }

    fn entries_for_period(&self, week_id: WeekId) -> EngineResult<Vec<PayrollEntry>> {
        Ok(self
            .lock()?
            .entries
            .range((week_id, String::new())..)
            .take_while(|((entry_week, _), _)| *entry_week == week_id)
            .map(|(_, entry)| entry.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdHocDeductions, StatutoryDeductions};
    use std::str::FromStr;
    use std::sync::Arc;
    use std::thread;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn period(start_day: u32) -> PayrollPeriod {
        let start = date(1, start_day);
        PayrollPeriod {
            week_id: WeekId::from_date(start).unwrap(),
            start_date: start,
            end_date: start + chrono::Days::new(6),
            payment_date: start + chrono::Days::new(10),
            status: PeriodStatus::Open,
        }
    }

    fn entry(employee_id: &str, week_id: WeekId, net: &str) -> PayrollEntry {
        PayrollEntry {
            employee_id: employee_id.to_string(),
            week_id,
            gross_pay: dec(net),
            statutory: StatutoryDeductions::default(),
            ad_hoc: AdHocDeductions::default(),
            total_deductions: Decimal::ZERO,
            net_pay: dec(net),
            status: EntryStatus::Pending,
        }
    }

    fn record(employee_id: &str, day: u32, status: &str) -> AttendanceRecord {
        AttendanceRecord {
            employee_id: employee_id.to_string(),
            work_date: date(1, day),
            status: status.to_string(),
            daily_rate: None,
            adjustment: Decimal::ZERO,
        }
    }

    #[test]
    fn test_duplicate_period_is_rejected_without_overwrite() {
        let ledger = PayrollLedger::new();
        ledger.insert_period(period(6), false).unwrap();
        assert_eq!(
            ledger.insert_period(period(6), false),
            Err(EngineError::DuplicatePeriod {
                week_id: period(6).week_id
            })
        );
    }

    #[test]
    fn test_period_overwrite_cascades_to_entries() {
        let ledger = PayrollLedger::new();
        let p = period(6);
        ledger.insert_period(p.clone(), false).unwrap();
        ledger.insert_entry(entry("emp_001", p.week_id, "100"), false).unwrap();

        let replaced = ledger.insert_period(p.clone(), true).unwrap();
        assert_eq!(replaced, Some(p.clone()));
        assert!(ledger.entries_for_period(p.week_id).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_entry_leaves_existing_unchanged() {
        let ledger = PayrollLedger::new();
        let p = period(6);
        ledger.insert_period(p.clone(), false).unwrap();
        ledger.insert_entry(entry("emp_001", p.week_id, "100"), false).unwrap();

        let err = ledger
            .insert_entry(entry("emp_001", p.week_id, "999"), false)
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEntry { .. }));
        let stored = ledger.entry("emp_001", p.week_id).unwrap().unwrap();
        assert_eq!(stored.net_pay, dec("100"));
    }

    #[test]
    fn test_entry_overwrite_returns_previous() {
        let ledger = PayrollLedger::new();
        let p = period(6);
        ledger.insert_period(p.clone(), false).unwrap();
        ledger.insert_entry(entry("emp_001", p.week_id, "100"), false).unwrap();

        let previous = ledger
            .insert_entry(entry("emp_001", p.week_id, "150"), true)
            .unwrap()
            .unwrap();
        assert_eq!(previous.net_pay, dec("100"));
        assert_eq!(
            ledger.entry("emp_001", p.week_id).unwrap().unwrap().net_pay,
            dec("150")
        );
    }

    #[test]
    fn test_entry_requires_existing_period() {
        let ledger = PayrollLedger::new();
        let err = ledger
            .insert_entry(entry("emp_001", period(6).week_id, "100"), false)
            .unwrap_err();
        assert!(matches!(err, EngineError::PeriodNotFound { .. }));
    }

    #[test]
    fn test_concurrent_inserts_commit_exactly_once() {
        let ledger = Arc::new(PayrollLedger::new());
        let p = period(6);
        ledger.insert_period(p.clone(), false).unwrap();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let ledger = Arc::clone(&ledger);
                let week_id = p.week_id;
                thread::spawn(move || {
                    ledger.insert_entry(entry("emp_001", week_id, &i.to_string()), false)
                })
            })
            .collect();

        let committed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();
        assert_eq!(committed, 1);
        assert_eq!(ledger.entries_for_period(p.week_id).unwrap().len(), 1);
    }

    #[test]
    fn test_status_lifecycle_and_entry_lock() {
        let ledger = PayrollLedger::new();
        let p = period(6);
        ledger.insert_period(p.clone(), false).unwrap();
        ledger.insert_entry(entry("emp_001", p.week_id, "100"), false).unwrap();

        let err = ledger
            .set_period_status(p.week_id, PeriodStatus::Approved)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStatusTransition { .. }));

        ledger.set_period_status(p.week_id, PeriodStatus::Pending).unwrap();
        ledger.set_period_status(p.week_id, PeriodStatus::Approved).unwrap();
        let stored = ledger.entry("emp_001", p.week_id).unwrap().unwrap();
        assert_eq!(stored.status, EntryStatus::Approved);

        let err = ledger
            .insert_entry(entry("emp_002", p.week_id, "100"), false)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::PeriodLocked {
                week_id: p.week_id,
                status: PeriodStatus::Approved
            }
        );
    }

    #[test]
    fn test_reschedule_moves_entries() {
        let ledger = PayrollLedger::new();
        let old = period(6);
        ledger.insert_period(old.clone(), false).unwrap();
        ledger.insert_entry(entry("emp_001", old.week_id, "100"), false).unwrap();

        let new = period(13);
        ledger.reschedule_period(old.week_id, new.clone(), false).unwrap();

        assert!(ledger.period(old.week_id).unwrap().is_none());
        assert!(ledger.entry("emp_001", old.week_id).unwrap().is_none());
        let moved = ledger.entry("emp_001", new.week_id).unwrap().unwrap();
        assert_eq!(moved.week_id, new.week_id);
    }

    #[test]
    fn test_reschedule_onto_existing_week_needs_overwrite() {
        let ledger = PayrollLedger::new();
        ledger.insert_period(period(6), false).unwrap();
        ledger.insert_period(period(13), false).unwrap();

        let err = ledger
            .reschedule_period(period(6).week_id, period(13), false)
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicatePeriod { .. }));
        assert_eq!(ledger.periods().unwrap().len(), 2);

        ledger
            .reschedule_period(period(6).week_id, period(13), true)
            .unwrap();
        assert_eq!(ledger.periods().unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_last_period_uses_latest_end() {
        let ledger = PayrollLedger::new();
        assert!(ledger.fetch_last_period().unwrap().is_none());
        ledger.insert_period(period(13), false).unwrap();
        ledger.insert_period(period(6), false).unwrap();
        assert_eq!(ledger.fetch_last_period().unwrap(), Some(period(13)));
    }

    #[test]
    fn test_fetch_attendance_is_scoped_and_ordered() {
        let ledger = PayrollLedger::new();
        for day in [8, 6, 13, 7] {
            ledger.record_attendance(record("emp_001", day, "Present"), false).unwrap();
        }
        ledger.record_attendance(record("emp_002", 6, "Present"), false).unwrap();

        let records = ledger.fetch_attendance("emp_001", &period(6)).unwrap();
        let days: Vec<NaiveDate> = records.iter().map(|r| r.work_date).collect();
        assert_eq!(days, vec![date(1, 6), date(1, 7), date(1, 8)]);
    }

    #[test]
    fn test_record_attendance_validates_and_deduplicates() {
        let ledger = PayrollLedger::new();
        let err = ledger
            .record_attendance(record("emp_001", 6, "Sick"), false)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidStatus { .. }));

        ledger.record_attendance(record("emp_001", 6, "Present"), false).unwrap();
        let err = ledger
            .record_attendance(record("emp_001", 6, "Absent"), false)
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAttendance { .. }));

        let previous = ledger
            .record_attendance(record("emp_001", 6, "Absent"), true)
            .unwrap();
        assert_eq!(previous.unwrap().status, "Present");
    }

    #[test]
    fn test_attendance_is_frozen_once_paid() {
        let ledger = PayrollLedger::new();
        let p = period(6);
        ledger.insert_period(p.clone(), false).unwrap();
        ledger.record_attendance(record("emp_001", 6, "Present"), false).unwrap();
        ledger.insert_entry(entry("emp_001", p.week_id, "100"), false).unwrap();
        ledger.set_period_status(p.week_id, PeriodStatus::Pending).unwrap();
        ledger.set_period_status(p.week_id, PeriodStatus::Approved).unwrap();

        let err = ledger
            .record_attendance(record("emp_001", 6, "Absent"), true)
            .unwrap_err();
        assert!(matches!(err, EngineError::PeriodLocked { .. }));
        // other employees without an entry are unaffected
        ledger.record_attendance(record("emp_002", 6, "Absent"), false).unwrap();
    }

    #[test]
    fn test_paid_period_stays_locked_after_closing() {
        let ledger = PayrollLedger::new();
        let p = period(6);
        ledger.insert_period(p.clone(), false).unwrap();
        ledger.record_attendance(record("emp_001", 6, "Present"), false).unwrap();
        ledger.insert_entry(entry("emp_001", p.week_id, "100"), false).unwrap();
        for status in [
            PeriodStatus::Pending,
            PeriodStatus::Approved,
            PeriodStatus::Paid,
            PeriodStatus::Closed,
        ] {
            ledger.set_period_status(p.week_id, status).unwrap();
        }

        let locked = EngineError::PeriodLocked {
            week_id: p.week_id,
            status: PeriodStatus::Closed,
        };
        assert_eq!(
            ledger.insert_entry(entry("emp_001", p.week_id, "999"), true),
            Err(locked.clone())
        );
        let stored = ledger.entry("emp_001", p.week_id).unwrap().unwrap();
        assert_eq!(stored.net_pay, dec("100"));
        assert_eq!(stored.status, EntryStatus::Paid);

        assert_eq!(
            ledger.record_attendance(record("emp_001", 6, "Absent"), true),
            Err(locked.clone())
        );
        assert_eq!(ledger.insert_period(p.clone(), true), Err(locked.clone()));
        assert_eq!(
            ledger.reschedule_period(p.week_id, period(13), true),
            Err(locked)
        );
        assert_eq!(ledger.entries_for_period(p.week_id).unwrap().len(), 1);
    }

    #[test]
    fn test_period_closed_without_approval_accepts_entries() {
        let ledger = PayrollLedger::new();
        let p = period(6);
        ledger.insert_period(p.clone(), false).unwrap();
        ledger.set_period_status(p.week_id, PeriodStatus::Closed).unwrap();

        ledger.insert_entry(entry("emp_001", p.week_id, "100"), false).unwrap();
        ledger.insert_entry(entry("emp_001", p.week_id, "150"), true).unwrap();
    }

    #[test]
    fn test_unknown_employee() {
        let ledger = PayrollLedger::new();
        assert!(matches!(
            ledger.fetch_employee_profile("ghost"),
            Err(EngineError::EmployeeNotFound { .. })
        ));
    }
}
