//! Payroll entry aggregation.
//!
//! Combines gross pay, statutory deductions and ad-hoc deductions into a
//! [`PayrollEntry`] and commits it.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdHocDeductions, EmployeeProfile, EntryStatus, PayrollEntry, StatutoryDeductions, WeekId,
};
use crate::store::EntryStore;

use super::money::overflow;

fn ensure_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::NegativeInput {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Validates the inputs of an entry before anything is summed.
fn validate_inputs(
    profile: &EmployeeProfile,
    gross_pay: Decimal,
    statutory: &StatutoryDeductions,
    ad_hoc: &AdHocDeductions,
) -> EngineResult<()> {
    ensure_non_negative("gross_pay", gross_pay)?;
    for (field, value) in statutory.items().into_iter().chain(ad_hoc.items()) {
        ensure_non_negative(field, value)?;
    }
    if !ad_hoc.short.is_zero() && !profile.cost_center_flag {
        return Err(EngineError::InvalidDeduction {
            field: "short".to_string(),
            message: format!(
                "employee '{}' is not in the cost center that carries this deduction",
                profile.id
            ),
        });
    }
    Ok(())
}

/// Builds a payroll entry without storing it.
///
/// `total_deductions` is the exact sum of the nine itemized fields and
/// `net_pay` is `gross_pay - total_deductions`, which may be negative.
///
/// # Errors
///
/// - `NegativeInput` if the gross pay or any deduction is negative
/// - `InvalidDeduction` if `short` is nonzero for an employee outside the cost center
/// - `CalculationError` if the deduction total does not fit in a `Decimal`
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::aggregate_entry;
/// use payroll_engine::models::{AdHocDeductions, EmployeeProfile, StatutoryDeductions, WeekId};
/// use rust_decimal::Decimal;
///
/// let profile = EmployeeProfile {
///     id: "emp_001".to_string(),
///     base_daily_rate: Decimal::from(600),
///     cost_center_flag: false,
/// };
/// let statutory = StatutoryDeductions {
///     sss: Decimal::new(5000, 2),
///     philhealth: Decimal::new(6250, 2),
///     pagibig: Decimal::new(2000, 2),
///     withholding_tax: Decimal::ZERO,
/// };
/// let ad_hoc = AdHocDeductions {
///     loan: Decimal::from(100),
///     ..Default::default()
/// };
///
/// let entry = aggregate_entry(
///     &profile,
///     WeekId::new(2025, 2).unwrap(),
///     Decimal::from(1000),
///     &statutory,
///     &ad_hoc,
/// )
/// .unwrap();
/// assert_eq!(entry.total_deductions, Decimal::new(23250, 2));
/// assert_eq!(entry.net_pay, Decimal::new(76750, 2));
/// ```
pub fn aggregate_entry(
    profile: &EmployeeProfile,
    week_id: WeekId,
    gross_pay: Decimal,
    statutory: &StatutoryDeductions,
    ad_hoc: &AdHocDeductions,
) -> EngineResult<PayrollEntry> {
    validate_inputs(profile, gross_pay, statutory, ad_hoc)?;

    let total_deductions = statutory
        .items()
        .into_iter()
        .chain(ad_hoc.items())
        .try_fold(Decimal::ZERO, |sum, (_, amount)| sum.checked_add(amount))
        .ok_or_else(|| overflow("total deductions"))?;
    let net_pay = gross_pay
        .checked_sub(total_deductions)
        .ok_or_else(|| overflow("net pay"))?;

    if net_pay < Decimal::ZERO {
        debug!(
            employee_id = %profile.id,
            week_id = %week_id,
            net_pay = %net_pay,
            "Deductions exceed gross pay"
        );
    }

    Ok(PayrollEntry {
        employee_id: profile.id.clone(),
        week_id,
        gross_pay,
        statutory: *statutory,
        ad_hoc: *ad_hoc,
        total_deductions,
        net_pay,
        status: EntryStatus::Pending,
    })
}

/// Builds a payroll entry and commits it to `store`.
///
/// The commit is a single atomic check-and-insert: without `overwrite`, an
/// existing entry for the same employee and period fails the call with
/// `DuplicateEntry` and is left untouched.
pub fn build_entry<S: EntryStore + ?Sized>(
    store: &S,
    profile: &EmployeeProfile,
    week_id: WeekId,
    gross_pay: Decimal,
    statutory: &StatutoryDeductions,
    ad_hoc: &AdHocDeductions,
    overwrite: bool,
) -> EngineResult<PayrollEntry> {
    let entry = aggregate_entry(profile, week_id, gross_pay, statutory, ad_hoc)?;
    commit_entry(store, entry, overwrite)
}

/// Commits an already-built entry.
pub(crate) fn commit_entry<S: EntryStore + ?Sized>(
    store: &S,
    entry: PayrollEntry,
    overwrite: bool,
) -> EngineResult<PayrollEntry> {
    let replaced = store.insert_entry(entry.clone(), overwrite)?;
    info!(
        employee_id = %entry.employee_id,
        week_id = %entry.week_id,
        gross_pay = %entry.gross_pay,
        net_pay = %entry.net_pay,
        replaced = replaced.is_some(),
        "Committed payroll entry"
    );
    Ok(entry)
}
