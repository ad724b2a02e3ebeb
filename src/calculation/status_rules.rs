//! Attendance status pay multipliers.
//!
//! This is the single table mapping an [`AttendanceStatus`] to the fraction of
//! the daily rate it earns. Every place that prices a day goes through
//! [`status_multiplier`].

use rust_decimal::Decimal;

use crate::models::AttendanceStatus;

const FULL_DAY: Decimal = Decimal::from_parts(1, 0, 0, false, 0);
const HALF_DAY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
const DOUBLE_DAY: Decimal = Decimal::from_parts(2, 0, 0, false, 0);
const UNPAID: Decimal = Decimal::from_parts(0, 0, 0, false, 0);

/// The status rule table, in [`AttendanceStatus::ALL`] order.
pub const STATUS_RULES: [(AttendanceStatus, Decimal); 8] = [
    (AttendanceStatus::Present, FULL_DAY),
    (AttendanceStatus::WorkFromHome, FULL_DAY),
    (AttendanceStatus::SpecialProject, FULL_DAY),
    (AttendanceStatus::HalfDay, HALF_DAY),
    (AttendanceStatus::Holiday, DOUBLE_DAY),
    (AttendanceStatus::Absent, UNPAID),
    (AttendanceStatus::DayOff, UNPAID),
    (AttendanceStatus::Leave, UNPAID),
];

/// Returns the pay multiplier for an attendance status.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::status_multiplier;
/// use payroll_engine::models::AttendanceStatus;
/// use rust_decimal::Decimal;
///
/// assert_eq!(status_multiplier(AttendanceStatus::HalfDay), Decimal::new(5, 1));
/// assert_eq!(status_multiplier(AttendanceStatus::Holiday), Decimal::from(2));
/// assert_eq!(status_multiplier(AttendanceStatus::Leave), Decimal::ZERO);
/// ```
pub fn status_multiplier(status: AttendanceStatus) -> Decimal {
    // Rows follow declaration order, so the discriminant is the row index.
    STATUS_RULES[status as usize].1
}
