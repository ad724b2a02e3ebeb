//! Payroll period models.
//!
//! This module contains the [`PayrollPeriod`] type, its [`PeriodStatus`] lifecycle and the
//! [`WeekId`] identifier derived from the ISO week of the period's start date.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Identifier of a weekly payroll period: `ISO year * 100 + ISO week`.
///
/// Week ids order chronologically and display as six digits.
///
/// # Example
///
/// ```
/// use payroll_engine::models::WeekId;
/// use chrono::NaiveDate;
///
/// let week_id = WeekId::from_date(NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()).unwrap();
/// assert_eq!(week_id.value(), 202502);
/// assert_eq!(week_id.to_string(), "202502");
/// assert_eq!("202502".parse::<WeekId>().unwrap(), week_id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct WeekId(u32);

impl WeekId {
    /// Builds a week id from an ISO year and week number.
    ///
    /// Returns `None` when the week is outside `1..=53` or the year outside `1..=9999`.
    pub fn new(iso_year: i32, iso_week: u32) -> Option<Self> {
        if !(1..=9999).contains(&iso_year) || !(1..=53).contains(&iso_week) {
            return None;
        }
        Some(Self(iso_year as u32 * 100 + iso_week))
    }

    /// Derives the week id of the ISO week containing `date`.
    ///
    /// Returns `None` when the ISO year is outside `1..=9999`.
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        let iso = date.iso_week();
        Self::new(iso.year(), iso.week())
    }

    /// The ISO year component.
    pub fn iso_year(&self) -> i32 {
        (self.0 / 100) as i32
    }

    /// The ISO week component.
    pub fn iso_week(&self) -> u32 {
        self.0 % 100
    }

    /// The numeric form, e.g. `202502`.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.iso_year(), self.iso_week())
    }
}

impl TryFrom<u32> for WeekId {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new((value / 100) as i32, value % 100)
            .ok_or_else(|| format!("invalid week id: {}", value))
    }
}

impl From<WeekId> for u32 {
    fn from(week_id: WeekId) -> Self {
        week_id.0
    }
}

impl FromStr for WeekId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("invalid week id: {}", s));
        }
        let value: u32 = s.parse().map_err(|_| format!("invalid week id: {}", s))?;
        Self::try_from(value)
    }
}

/// Lifecycle status of a payroll period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Accepting attendance and entries.
    Open,
    /// Entries generated and awaiting approval.
    Pending,
    /// Entries approved for payment.
    Approved,
    /// Payment released.
    Paid,
    /// Approval refused; the period goes back for rework.
    Rejected,
    /// Archived.
    Closed,
}

impl PeriodStatus {
    /// Returns true if the lifecycle allows moving from `self` to `next`.
    ///
    /// ```
    /// use payroll_engine::models::PeriodStatus;
    ///
    /// assert!(PeriodStatus::Open.can_transition_to(PeriodStatus::Pending));
    /// assert!(!PeriodStatus::Open.can_transition_to(PeriodStatus::Paid));
    /// ```
    pub fn can_transition_to(self, next: PeriodStatus) -> bool {
        use PeriodStatus::*;
        matches!(
            (self, next),
            (Open, Pending)
                | (Open, Closed)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (Rejected, Pending)
                | (Approved, Paid)
                | (Paid, Closed)
        )
    }

    /// Returns true if payroll entries may still be created or replaced.
    pub fn accepts_entries(self) -> bool {
        !matches!(self, PeriodStatus::Approved | PeriodStatus::Paid)
    }
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodStatus::Open => "open",
            PeriodStatus::Pending => "pending",
            PeriodStatus::Approved => "approved",
            PeriodStatus::Paid => "paid",
            PeriodStatus::Rejected => "rejected",
            PeriodStatus::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// A Monday-to-Sunday payroll week.
///
/// Periods are built by the period sequencer, which guarantees
/// `end_date = start_date + 6`, `payment_date = end_date + 4` and a
/// `week_id` derived from `start_date`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayrollPeriod, PeriodStatus, WeekId};
/// use chrono::NaiveDate;
///
/// let period = PayrollPeriod {
///     week_id: WeekId::new(2025, 2).unwrap(),
///     start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 1, 12).unwrap(),
///     payment_date: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
///     status: PeriodStatus::Open,
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()));
/// assert_eq!(period.days().count(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// The period identifier.
    pub week_id: WeekId,
    /// The first day of the period (a Monday, inclusive).
    pub start_date: NaiveDate,
    /// The last day of the period (a Sunday, inclusive).
    pub end_date: NaiveDate,
    /// The date wages are paid out.
    pub payment_date: NaiveDate,
    /// The lifecycle status.
    pub status: PeriodStatus,
}

impl PayrollPeriod {
    /// Checks if a given date falls within this period, inclusive of both ends.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Iterates over every calendar day of the period in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start_date
            .iter_days()
            .take_while(move |d| *d <= self.end_date)
    }

    /// Number of calendar days covered by the period.
    pub fn day_count(&self) -> u64 {
        ((self.end_date - self.start_date).num_days() + 1).max(0) as u64
    }

    /// The day after the period ends.
    pub fn next_start(&self) -> Option<NaiveDate> {
        self.end_date.checked_add_days(Days::new(1))
    }
}
