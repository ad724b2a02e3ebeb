//! Request types for the Payroll Computation Engine API.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::RunEmployee;
use crate::models::{AdHocDeductions, AttendanceRecord, EmployeeProfile, PeriodStatus, WeekId};

/// Request body for `POST /periods`.
///
/// Without a `reference_date` the new period follows the latest stored one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePeriodRequest {
    /// Start date of the period; normalized forward to a Monday.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
    /// Replace an existing period for the same week, with its entries.
    #[serde(default)]
    pub overwrite: bool,
}

/// Request body for `PUT /periods/:week_id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodStatusRequest {
    /// The status to move to.
    pub status: PeriodStatus,
}

/// Request body for `PUT /periods/:week_id/schedule`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReschedulePeriodRequest {
    /// New start date; normalized forward to a Monday.
    pub start_date: NaiveDate,
    /// Replace a period already occupying the target week.
    #[serde(default)]
    pub overwrite: bool,
}

/// Request body for `POST /gross-pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrossPayRequest {
    /// The employee being paid.
    pub employee: EmployeeProfile,
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    /// The employee's attendance records.
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

/// Request body for `POST /deductions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeductionsRequest {
    /// Weekly gross pay.
    pub gross_pay: Decimal,
}

/// Request body for `POST /entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRequest {
    /// The employee being paid; the profile is read from the employee directory.
    pub employee_id: String,
    /// The period paid for.
    pub week_id: WeekId,
    /// Weekly gross pay; statutory deductions are derived from it.
    pub gross_pay: Decimal,
    /// Ad-hoc deductions.
    #[serde(default)]
    pub ad_hoc: AdHocDeductions,
    /// Replace an existing entry for the same employee and period.
    #[serde(default)]
    pub overwrite: bool,
}

/// Request body for `POST /payroll-runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    /// The stored period to run.
    pub week_id: WeekId,
    /// Employees to include; profiles and attendance come from the ledger.
    pub employees: Vec<RunEmployee>,
    /// Replace existing entries.
    #[serde(default)]
    pub overwrite: bool,
}

/// Request body for `POST /attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRequest {
    /// Records to store, applied in order.
    pub records: Vec<AttendanceRecord>,
    /// Replace records already stored for the same employee and day.
    #[serde(default)]
    pub overwrite: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_period_request_defaults() {
        let request: CreatePeriodRequest = serde_json::from_str("{}").unwrap();
        assert!(request.reference_date.is_none());
        assert!(!request.overwrite);
    }

    #[test]
    fn test_entry_request_parses_week_id_and_decimals() {
        let json = r#"{
            "employee_id": "emp_001",
            "week_id": 202502,
            "gross_pay": "4200.00",
            "ad_hoc": {"loan": "100"}
        }"#;
        let request: EntryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.employee_id, "emp_001");
        assert_eq!(request.week_id.to_string(), "202502");
        assert_eq!(request.ad_hoc.loan, Decimal::from(100));
        assert_eq!(request.ad_hoc.cash_advance, Decimal::ZERO);
        assert!(!request.overwrite);
    }

    #[test]
    fn test_status_request_uses_snake_case() {
        let request: PeriodStatusRequest =
            serde_json::from_str(r#"{"status": "approved"}"#).unwrap();
        assert_eq!(request.status, PeriodStatus::Approved);
        assert!(serde_json::from_str::<PeriodStatusRequest>(r#"{"status": "done"}"#).is_err());
    }
}
