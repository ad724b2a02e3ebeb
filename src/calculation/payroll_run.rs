//! Batch payroll runs.
//!
//! A run computes one entry per employee for a single period. The computations
//! are independent and run in parallel with [`rayon`]; each result is committed
//! through the store's atomic insert as soon as it is ready. A failure for one
//! employee is recorded in that employee's outcome and never affects the others.

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{CoveragePolicy, RunSettings, StatutorySchedule};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdHocDeductions, AttendanceRecord, CoverageWarning, EmployeeProfile, PayrollEntry,
    PayrollPeriod, WeekId,
};
use crate::store::{AttendanceSource, EmployeeDirectory, EntryStore, PeriodStore};

use super::entry_aggregator::{aggregate_entry, commit_entry};
use super::gross_pay::compute_gross_pay;
use super::money::overflow;
use super::statutory::calculate_statutory_deductions;

/// Everything needed to compute one employee's entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRunInput {
    /// The employee's profile.
    pub profile: EmployeeProfile,
    /// The employee's attendance over the period.
    pub attendance: Vec<AttendanceRecord>,
    /// Ad-hoc deductions for the period.
    #[serde(default)]
    pub ad_hoc: AdHocDeductions,
}

/// An employee to include in a run whose profile and attendance come from
/// the collaborator stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunEmployee {
    /// The employee id.
    pub employee_id: String,
    /// Ad-hoc deductions for the period.
    #[serde(default)]
    pub ad_hoc: AdHocDeductions,
}

/// A computed entry together with the coverage gaps found on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedEntry {
    /// The entry, not yet committed.
    pub entry: PayrollEntry,
    /// Days of the period without attendance.
    pub coverage_warnings: Vec<CoverageWarning>,
}

/// What happened to one employee in a run.
#[derive(Debug, Clone, PartialEq)]
pub enum EmployeeOutcome {
    /// The entry was computed and committed.
    Committed {
        /// The committed entry.
        entry: PayrollEntry,
        /// Days of the period without attendance.
        coverage_warnings: Vec<CoverageWarning>,
    },
    /// Validation, computation or commit failed.
    Failed {
        /// The employee that failed.
        employee_id: String,
        /// Why.
        error: EngineError,
    },
}

impl EmployeeOutcome {
    /// The employee this outcome belongs to.
    pub fn employee_id(&self) -> &str {
        match self {
            EmployeeOutcome::Committed { entry, .. } => &entry.employee_id,
            EmployeeOutcome::Failed { employee_id, .. } => employee_id,
        }
    }

    /// The committed entry, if any.
    pub fn entry(&self) -> Option<&PayrollEntry> {
        match self {
            EmployeeOutcome::Committed { entry, .. } => Some(entry),
            EmployeeOutcome::Failed { .. } => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&EngineError> {
        match self {
            EmployeeOutcome::Committed { .. } => None,
            EmployeeOutcome::Failed { error, .. } => Some(error),
        }
    }
}

/// Sums over the committed entries of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunTotals {
    /// Number of committed entries.
    pub committed: usize,
    /// Number of failed employees.
    pub failed: usize,
    /// Total gross pay.
    pub gross_pay: Decimal,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Total net pay.
    pub net_pay: Decimal,
}

/// The result of a payroll run.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollRunResult {
    /// The period the run was for.
    pub week_id: WeekId,
    /// One outcome per employee, in input order.
    pub outcomes: Vec<EmployeeOutcome>,
    /// Totals over committed entries.
    pub totals: RunTotals,
}

impl PayrollRunResult {
    fn from_outcomes(week_id: WeekId, outcomes: Vec<EmployeeOutcome>) -> EngineResult<Self> {
        let mut totals = RunTotals::default();
        for outcome in &outcomes {
            match outcome.entry() {
                Some(entry) => {
                    totals.committed += 1;
                    totals.gross_pay =
                        add_to_total(totals.gross_pay, entry.gross_pay, "run gross pay")?;
                    totals.total_deductions = add_to_total(
                        totals.total_deductions,
                        entry.total_deductions,
                        "run total deductions",
                    )?;
                    totals.net_pay = add_to_total(totals.net_pay, entry.net_pay, "run net pay")?;
                }
                None => totals.failed += 1,
            }
        }
        Ok(Self {
            week_id,
            outcomes,
            totals,
        })
    }
}

fn add_to_total(total: Decimal, amount: Decimal, what: &str) -> EngineResult<Decimal> {
    total.checked_add(amount).ok_or_else(|| overflow(what))
}

/// Computes one employee's entry for `period` without committing it.
///
/// Under [`CoveragePolicy::Reject`] any day without attendance fails the
/// employee with `MissingCoverage`; under [`CoveragePolicy::Warn`] the gaps are
/// returned alongside the entry.
pub fn compute_entry(
    input: &EmployeeRunInput,
    period: &PayrollPeriod,
    schedule: &StatutorySchedule,
    policy: CoveragePolicy,
) -> EngineResult<ComputedEntry> {
    let gross = compute_gross_pay(&input.profile, period, &input.attendance)?;
    if policy == CoveragePolicy::Reject {
        gross.require_full_coverage()?;
    }

    let statutory = calculate_statutory_deductions(gross.gross_pay, schedule, 1)?;
    let entry = aggregate_entry(
        &input.profile,
        period.week_id,
        gross.gross_pay,
        &statutory.deductions,
        &input.ad_hoc,
    )?;

    Ok(ComputedEntry {
        entry,
        coverage_warnings: gross.coverage_warnings,
    })
}

fn process_employee<S: EntryStore + ?Sized>(
    store: &S,
    employee_id: &str,
    period: &PayrollPeriod,
    computed: EngineResult<ComputedEntry>,
    overwrite: bool,
) -> EmployeeOutcome {
    let committed = computed.and_then(|computed| {
        let entry = commit_entry(store, computed.entry, overwrite)?;
        Ok((entry, computed.coverage_warnings))
    });

    match committed {
        Ok((entry, coverage_warnings)) => EmployeeOutcome::Committed {
            entry,
            coverage_warnings,
        },
        Err(error) => {
            warn!(
                employee_id = %employee_id,
                week_id = %period.week_id,
                error = %error,
                "Payroll entry failed"
            );
            EmployeeOutcome::Failed {
                employee_id: employee_id.to_string(),
                error,
            }
        }
    }
}

fn log_run(result: &PayrollRunResult) {
    info!(
        week_id = %result.week_id,
        committed = result.totals.committed,
        failed = result.totals.failed,
        gross_pay = %result.totals.gross_pay,
        net_pay = %result.totals.net_pay,
        "Payroll run complete"
    );
}

/// Runs payroll for `period` over inputs the caller has already gathered.
///
/// Outcomes are returned in input order.
///
/// # Arguments
///
/// * `store` - Where entries are committed
/// * `period` - The period being paid
/// * `inputs` - One input per employee
/// * `schedule` - The statutory schedule
/// * `settings` - Run settings, including the coverage policy
/// * `overwrite` - Replace existing entries instead of failing with `DuplicateEntry`
///
/// # Errors
///
/// `CalculationError` if the run totals do not fit in a `Decimal`. Entries
/// committed by the run stay committed.
pub fn run_payroll<S: EntryStore + Sync + ?Sized>(
    store: &S,
    period: &PayrollPeriod,
    inputs: &[EmployeeRunInput],
    schedule: &StatutorySchedule,
    settings: &RunSettings,
    overwrite: bool,
) -> EngineResult<PayrollRunResult> {
    let outcomes: Vec<EmployeeOutcome> = inputs
        .par_iter()
        .map(|input| {
            let computed = compute_entry(input, period, schedule, settings.coverage_policy);
            process_employee(store, &input.profile.id, period, computed, overwrite)
        })
        .collect();

    let result = PayrollRunResult::from_outcomes(period.week_id, outcomes)?;
    log_run(&result);
    Ok(result)
}

/// Runs payroll for the stored period `week_id`, reading each employee's
/// profile and attendance from `sources`.
///
/// Fails as a whole only if the period does not exist or the run totals
/// overflow; lookup failures for an individual employee become that
/// employee's outcome.
pub fn run_payroll_from_sources<S>(
    sources: &S,
    week_id: WeekId,
    employees: &[RunEmployee],
    schedule: &StatutorySchedule,
    settings: &RunSettings,
    overwrite: bool,
) -> EngineResult<PayrollRunResult>
where
    S: AttendanceSource + EmployeeDirectory + PeriodStore + EntryStore + Sync + ?Sized,
{
    let period = sources
        .period(week_id)?
        .ok_or(EngineError::PeriodNotFound { week_id })?;

    let outcomes: Vec<EmployeeOutcome> = employees
        .par_iter()
        .map(|employee| {
            let computed = sources
                .fetch_employee_profile(&employee.employee_id)
                .and_then(|profile| {
                    let attendance = sources.fetch_attendance(&employee.employee_id, &period)?;
                    let input = EmployeeRunInput {
                        profile,
                        attendance,
                        ad_hoc: employee.ad_hoc,
                    };
                    compute_entry(&input, &period, schedule, settings.coverage_policy)
                });
            process_employee(sources, &employee.employee_id, &period, computed, overwrite)
        })
        .collect();

    let result = PayrollRunResult::from_outcomes(week_id, outcomes)?;
    log_run(&result);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::period_starting;
    use crate::store::PayrollLedger;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    fn profile(id: &str, rate: &str) -> EmployeeProfile {
        EmployeeProfile {
            id: id.to_string(),
            base_daily_rate: dec(rate),
            cost_center_flag: false,
        }
    }

    fn week_of(employee_id: &str, statuses: [&str; 7]) -> Vec<AttendanceRecord> {
        monday()
            .iter_days()
            .zip(statuses)
            .map(|(work_date, status)| AttendanceRecord {
                employee_id: employee_id.to_string(),
                work_date,
                status: status.to_string(),
                daily_rate: None,
                adjustment: Decimal::ZERO,
            })
            .collect()
    }

    fn input(id: &str, statuses: [&str; 7]) -> EmployeeRunInput {
        EmployeeRunInput {
            profile: profile(id, "600"),
            attendance: week_of(id, statuses),
            ad_hoc: AdHocDeductions::default(),
        }
    }

    fn setup() -> (PayrollLedger, PayrollPeriod) {
        let ledger = PayrollLedger::new();
        let period = period_starting(monday(), monday()).unwrap();
        ledger.insert_period(period.clone(), false).unwrap();
        (ledger, period)
    }

    const FULL_WEEK: [&str; 7] = ["Present"; 7];

    #[test]
    fn test_compute_entry_full_week() {
        let (_, period) = setup();
        let computed = compute_entry(
            &input("emp_001", FULL_WEEK),
            &period,
            &StatutorySchedule::default(),
            CoveragePolicy::Warn,
        )
        .unwrap();

        // 4200 weekly -> 16800 monthly: SSS 850/4, PhilHealth 420/4, Pag-IBIG 200/4
        let entry = computed.entry;
        assert_eq!(entry.gross_pay, dec("4200.00"));
        assert_eq!(entry.statutory.sss, dec("212.50"));
        assert_eq!(entry.statutory.philhealth, dec("105.00"));
        assert_eq!(entry.statutory.pagibig, dec("50.00"));
        assert_eq!(entry.statutory.withholding_tax, dec("0.00"));
        assert_eq!(entry.net_pay, dec("3832.50"));
        assert!(computed.coverage_warnings.is_empty());
    }

    #[test]
    fn test_one_failure_does_not_block_others() {
        let (ledger, period) = setup();
        let inputs = vec![
            input("emp_001", FULL_WEEK),
            input(
                "emp_002",
                ["Present", "Sick", "Present", "Present", "Present", "Present", "Present"],
            ),
            input("emp_003", ["Half Day"; 7]),
        ];

        let result = run_payroll(
            &ledger,
            &period,
            &inputs,
            &StatutorySchedule::default(),
            &RunSettings::default(),
            false,
        )
        .unwrap();

        let ids: Vec<&str> = result.outcomes.iter().map(|o| o.employee_id()).collect();
        assert_eq!(ids, vec!["emp_001", "emp_002", "emp_003"]);
        assert!(matches!(
            result.outcomes[1].error(),
            Some(EngineError::InvalidStatus { .. })
        ));
        assert_eq!(result.totals.committed, 2);
        assert_eq!(result.totals.failed, 1);
        assert_eq!(result.totals.gross_pay, dec("6300.00"));
        assert_eq!(ledger.entries_for_period(period.week_id).unwrap().len(), 2);
    }

    #[test]
    fn test_run_totals_beyond_decimal_range_are_an_error() {
        let (ledger, period) = setup();
        let inputs: Vec<EmployeeRunInput> = (0..60)
            .map(|n| {
                let id = format!("emp_{:03}", n);
                EmployeeRunInput {
                    profile: profile(&id, "200000000000000000000000000"),
                    attendance: week_of(&id, FULL_WEEK),
                    ad_hoc: AdHocDeductions::default(),
                }
            })
            .collect();

        let err = run_payroll(
            &ledger,
            &period,
            &inputs,
            &StatutorySchedule::default(),
            &RunSettings::default(),
            false,
        )
        .unwrap_err();
        assert!(
            matches!(err, EngineError::CalculationError { ref message } if message.contains("run gross pay"))
        );
        assert_eq!(ledger.entries_for_period(period.week_id).unwrap().len(), 60);
    }

    #[test]
    fn test_rerun_without_overwrite_fails_with_duplicates() {
        let (ledger, period) = setup();
        let inputs = vec![input("emp_001", FULL_WEEK)];
        let schedule = StatutorySchedule::default();
        let settings = RunSettings::default();

        run_payroll(&ledger, &period, &inputs, &schedule, &settings, false).unwrap();
        let rerun = run_payroll(&ledger, &period, &inputs, &schedule, &settings, false).unwrap();
        assert!(matches!(
            rerun.outcomes[0].error(),
            Some(EngineError::DuplicateEntry { .. })
        ));

        let forced = run_payroll(&ledger, &period, &inputs, &schedule, &settings, true).unwrap();
        assert_eq!(forced.totals.committed, 1);
    }

    #[test]
    fn test_same_employee_twice_commits_once() {
        let (ledger, period) = setup();
        let inputs = vec![input("emp_001", FULL_WEEK), input("emp_001", FULL_WEEK)];

        let result = run_payroll(
            &ledger,
            &period,
            &inputs,
            &StatutorySchedule::default(),
            &RunSettings::default(),
            false,
        )
        .unwrap();
        assert_eq!(result.totals.committed, 1);
        assert_eq!(result.totals.failed, 1);
    }

    #[test]
    fn test_coverage_policy_reject() {
        let (ledger, period) = setup();
        let mut partial = input("emp_001", FULL_WEEK);
        partial.attendance.truncate(5);
        let reject = RunSettings {
            coverage_policy: CoveragePolicy::Reject,
        };

        let result = run_payroll(
            &ledger,
            &period,
            std::slice::from_ref(&partial),
            &StatutorySchedule::default(),
            &reject,
            false,
        )
        .unwrap();
        assert!(matches!(
            result.outcomes[0].error(),
            Some(EngineError::MissingCoverage { dates, .. }) if dates.len() == 2
        ));

        let result = run_payroll(
            &ledger,
            &period,
            &[partial],
            &StatutorySchedule::default(),
            &RunSettings::default(),
            false,
        )
        .unwrap();
        match &result.outcomes[0] {
            EmployeeOutcome::Committed {
                entry,
                coverage_warnings,
            } => {
                assert_eq!(entry.gross_pay, dec("3000.00"));
                assert_eq!(coverage_warnings.len(), 2);
            }
            other => panic!("Expected Committed, got {:?}", other),
        }
    }

    #[test]
    fn test_run_from_sources() {
        let (ledger, period) = setup();
        ledger.upsert_employee(profile("emp_001", "600")).unwrap();
        for record in week_of("emp_001", FULL_WEEK) {
            ledger.record_attendance(record, false).unwrap();
        }

        let employees = vec![
            RunEmployee {
                employee_id: "emp_001".to_string(),
                ad_hoc: AdHocDeductions {
                    loan: dec("100"),
                    ..Default::default()
                },
            },
            RunEmployee {
                employee_id: "ghost".to_string(),
                ad_hoc: AdHocDeductions::default(),
            },
        ];

        let result = run_payroll_from_sources(
            &ledger,
            period.week_id,
            &employees,
            &StatutorySchedule::default(),
            &RunSettings::default(),
            false,
        )
        .unwrap();

        let entry = result.outcomes[0].entry().unwrap();
        assert_eq!(entry.net_pay, dec("3732.50"));
        assert!(matches!(
            result.outcomes[1].error(),
            Some(EngineError::EmployeeNotFound { .. })
        ));
    }

    #[test]
    fn test_run_from_sources_unknown_period() {
        let ledger = PayrollLedger::new();
        let err = run_payroll_from_sources(
            &ledger,
            WeekId::new(2025, 2).unwrap(),
            &[],
            &StatutorySchedule::default(),
            &RunSettings::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::PeriodNotFound { .. }));
    }
}
