//! Payroll period sequencing.
//!
//! Periods are Monday-to-Sunday weeks paid out on the following Thursday and
//! identified by the ISO year and week of their Monday.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollPeriod, PeriodStatus, WeekId};
use crate::store::PeriodStore;

/// Days from a period's start to its end.
pub const PERIOD_LENGTH_DAYS: u64 = 6;

/// Days from a period's end to its payment date.
pub const PAYMENT_LAG_DAYS: u64 = 4;

fn out_of_range(date: NaiveDate) -> EngineError {
    EngineError::CalculationError {
        message: format!("payroll period starting near {} is outside the supported calendar", date),
    }
}

/// Returns `date` if it is a Monday, otherwise the next Monday after it.
pub fn normalize_to_monday(date: NaiveDate) -> Option<NaiveDate> {
    let offset = (7 - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(u64::from(offset)))
}

/// Returns the first Monday on or after January 1 of `year`.
///
/// ```
/// use payroll_engine::calculation::first_monday_of_year;
/// use chrono::NaiveDate;
///
/// assert_eq!(first_monday_of_year(2025), NaiveDate::from_ymd_opt(2025, 1, 6));
/// assert_eq!(first_monday_of_year(2024), NaiveDate::from_ymd_opt(2024, 1, 1));
/// ```
pub fn first_monday_of_year(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1).and_then(normalize_to_monday)
}

/// Builds the period that starts on `start`, normalized forward to a Monday.
///
/// The period ends six days later and is paid four days after its end. It is
/// `closed` if its payment date is before `today`, `open` otherwise.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::period_starting;
/// use payroll_engine::models::PeriodStatus;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
/// let period = period_starting(start, start).unwrap();
/// assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2025, 1, 12).unwrap());
/// assert_eq!(period.payment_date, NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
/// assert_eq!(period.week_id.to_string(), "202502");
/// assert_eq!(period.status, PeriodStatus::Open);
/// ```
pub fn period_starting(start: NaiveDate, today: NaiveDate) -> EngineResult<PayrollPeriod> {
    let start_date = normalize_to_monday(start).ok_or_else(|| out_of_range(start))?;
    let end_date = start_date
        .checked_add_days(Days::new(PERIOD_LENGTH_DAYS))
        .ok_or_else(|| out_of_range(start))?;
    let payment_date = end_date
        .checked_add_days(Days::new(PAYMENT_LAG_DAYS))
        .ok_or_else(|| out_of_range(start))?;

    let week_id = WeekId::from_date(start_date).ok_or_else(|| out_of_range(start))?;

    let status = if payment_date < today {
        PeriodStatus::Closed
    } else {
        PeriodStatus::Open
    };

    Ok(PayrollPeriod {
        week_id,
        start_date,
        end_date,
        payment_date,
        status,
    })
}

/// Computes the period following one that ended on `last_period_end`.
///
/// With no previous period, the sequence starts on the first Monday of
/// `today`'s year.
pub fn next_period(
    last_period_end: Option<NaiveDate>,
    today: NaiveDate,
) -> EngineResult<PayrollPeriod> {
    let start = match last_period_end {
        Some(end) => end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| out_of_range(end))?,
        None => first_monday_of_year(today.year()).ok_or_else(|| out_of_range(today))?,
    };
    if start.weekday() != Weekday::Mon {
        debug!(start = %start, "Normalizing period start to the next Monday");
    }
    period_starting(start, today)
}

/// Creates and stores a payroll period.
///
/// With a `reference_date` the period starts on that date (normalized to a
/// Monday). Without one it follows the store's last period. The insert is
/// rejected with `DuplicatePeriod` if the week is taken, unless `overwrite` is
/// set, in which case the old period and its entries are replaced.
///
/// # Arguments
///
/// * `store` - Period storage, read for the last period and written atomically
/// * `reference_date` - Explicit start date, or `None` to continue the sequence
/// * `today` - The date used to decide whether the period is already closed
/// * `overwrite` - Replace an existing period with the same week id
pub fn generate_period<S: PeriodStore + ?Sized>(
    store: &S,
    reference_date: Option<NaiveDate>,
    today: NaiveDate,
    overwrite: bool,
) -> EngineResult<PayrollPeriod> {
    let period = match reference_date {
        Some(date) => period_starting(date, today)?,
        None => {
            let last_end = store.fetch_last_period()?.map(|p| p.end_date);
            next_period(last_end, today)?
        }
    };

    let replaced = store.insert_period(period.clone(), overwrite)?;
    info!(
        week_id = %period.week_id,
        start = %period.start_date,
        end = %period.end_date,
        status = %period.status,
        replaced = replaced.is_some(),
        "Generated payroll period"
    );
    Ok(period)
}

/// Moves a stored period to start on `new_start`.
///
/// End, payment date and week id are recomputed and the period keeps its
/// status; its entries move with it. Collisions follow [`generate_period`].
pub fn reschedule_period<S: PeriodStore + ?Sized>(
    store: &S,
    week_id: WeekId,
    new_start: NaiveDate,
    overwrite: bool,
) -> EngineResult<PayrollPeriod> {
    let current = store
        .period(week_id)?
        .ok_or(EngineError::PeriodNotFound { week_id })?;
    let mut moved = period_starting(new_start, new_start)?;
    moved.status = current.status;

    let period = store.reschedule_period(week_id, moved, overwrite)?;
    info!(
        from = %week_id,
        to = %period.week_id,
        start = %period.start_date,
        "Rescheduled payroll period"
    );
    Ok(period)
}

/// Moves a stored period to `status`.
pub fn update_period_status<S: PeriodStore + ?Sized>(
    store: &S,
    week_id: WeekId,
    status: PeriodStatus,
) -> EngineResult<PayrollPeriod> {
    let period = store.set_period_status(week_id, status)?;
    info!(week_id = %week_id, status = %status, "Updated payroll period status");
    Ok(period)
}
