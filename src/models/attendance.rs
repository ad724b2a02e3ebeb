//! Attendance record model.
//!
//! Attendance records are owned by the attendance subsystem. They reach the engine
//! with their status as a raw label, which is only trusted after it has been parsed
//! into an [`AttendanceStatus`].

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The closed set of attendance statuses the engine knows how to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// Worked on site.
    #[serde(rename = "Present")]
    Present,
    /// Worked from home.
    #[serde(rename = "WFH")]
    WorkFromHome,
    /// Assigned to a special project.
    #[serde(rename = "SP")]
    SpecialProject,
    /// Worked half of the day.
    #[serde(rename = "Half Day")]
    HalfDay,
    /// Worked on a holiday.
    #[serde(rename = "Holiday")]
    Holiday,
    /// Did not report for work.
    #[serde(rename = "Absent")]
    Absent,
    /// Scheduled rest day.
    #[serde(rename = "Day Off")]
    DayOff,
    /// On leave.
    #[serde(rename = "Leave")]
    Leave,
}

impl AttendanceStatus {
    /// Every status, in table order.
    pub const ALL: [AttendanceStatus; 8] = [
        AttendanceStatus::Present,
        AttendanceStatus::WorkFromHome,
        AttendanceStatus::SpecialProject,
        AttendanceStatus::HalfDay,
        AttendanceStatus::Holiday,
        AttendanceStatus::Absent,
        AttendanceStatus::DayOff,
        AttendanceStatus::Leave,
    ];

    /// The canonical label used by the attendance subsystem.
    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::WorkFromHome => "WFH",
            AttendanceStatus::SpecialProject => "SP",
            AttendanceStatus::HalfDay => "Half Day",
            AttendanceStatus::Holiday => "Holiday",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::DayOff => "Day Off",
            AttendanceStatus::Leave => "Leave",
        }
    }

    /// Parses a status label.
    ///
    /// Only the canonical labels are accepted. Matching ignores case and
    /// collapses runs of whitespace, so `" half  day "` is `"Half Day"`, but
    /// `"half_day"` or `"Work From Home"` are not statuses. There is no fallback.
    ///
    /// ```
    /// use payroll_engine::models::AttendanceStatus;
    ///
    /// assert_eq!(AttendanceStatus::parse("half day"), Some(AttendanceStatus::HalfDay));
    /// assert_eq!(AttendanceStatus::parse("wfh"), Some(AttendanceStatus::WorkFromHome));
    /// assert_eq!(AttendanceStatus::parse("half_day"), None);
    /// assert_eq!(AttendanceStatus::parse("Sick"), None);
    /// ```
    pub fn parse(label: &str) -> Option<Self> {
        let key = label.split_whitespace().collect::<Vec<_>>().join(" ");
        AttendanceStatus::ALL
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(&key))
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One employee's attendance on one calendar day.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AttendanceRecord, AttendanceStatus};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = AttendanceRecord {
///     employee_id: "emp_001".to_string(),
///     work_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
///     status: "Half Day".to_string(),
///     daily_rate: None,
///     adjustment: Decimal::ZERO,
/// };
/// assert_eq!(record.parsed_status().unwrap(), AttendanceStatus::HalfDay);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The calendar day worked (or not worked).
    pub work_date: NaiveDate,
    /// The status label as recorded by the attendance subsystem.
    pub status: String,
    /// A per-day rate overriding the employee's base rate when positive.
    #[serde(default)]
    pub daily_rate: Option<Decimal>,
    /// A signed amount added to the day's pay.
    #[serde(default)]
    pub adjustment: Decimal,
}

impl AttendanceRecord {
    /// Parses the record's status label, rejecting anything outside the closed set.
    pub fn parsed_status(&self) -> EngineResult<AttendanceStatus> {
        AttendanceStatus::parse(&self.status).ok_or_else(|| EngineError::InvalidStatus {
            employee_id: self.employee_id.clone(),
            date: self.work_date,
            status: self.status.clone(),
        })
    }
}
