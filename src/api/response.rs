//! Response types for the Payroll Computation Engine API.
//!
//! This module defines the error response structures, the mapping from
//! [`EngineError`] to HTTP status codes, and the response bodies that have no
//! direct domain counterpart.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::calculation::{EmployeeOutcome, PayrollRunResult, RunTotals};
use crate::error::EngineError;
use crate::models::{CoverageWarning, PayrollEntry, PayrollPeriod, WeekId};

/// API error response structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid week id error response.
    pub fn invalid_week_id(raw: &str) -> Self {
        Self::with_details(
            "INVALID_WEEK_ID",
            format!("Invalid week id: {}", raw),
            "Week ids are six digits: ISO year followed by the two-digit ISO week",
        )
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match &error {
            EngineError::InvalidStatus { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details(
                    "INVALID_STATUS",
                    message,
                    "Valid statuses: Present, WFH, SP, Half Day, Holiday, Absent, Day Off, Leave",
                ),
            ),
            EngineError::MissingCoverage { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("MISSING_COVERAGE", message),
            ),
            EngineError::DuplicatePeriod { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "DUPLICATE_PERIOD",
                    message,
                    "Resubmit with overwrite to replace the period and its entries",
                ),
            ),
            EngineError::DuplicateEntry { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "DUPLICATE_ENTRY",
                    message,
                    "Resubmit with overwrite to replace the entry",
                ),
            ),
            EngineError::NegativeInput { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("NEGATIVE_INPUT", message),
            ),
            EngineError::InvalidAttendance { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INVALID_ATTENDANCE", message),
            ),
            EngineError::InvalidDeduction { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("INVALID_DEDUCTION", message),
            ),
            EngineError::PeriodNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("PERIOD_NOT_FOUND", message),
            ),
            EngineError::PeriodLocked { .. } => (
                StatusCode::LOCKED,
                ApiError::new("PERIOD_LOCKED", message),
            ),
            EngineError::InvalidStatusTransition { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "INVALID_STATUS_TRANSITION",
                    message,
                    "open -> pending|closed, pending -> approved|rejected, rejected -> pending, approved -> paid, paid -> closed",
                ),
            ),
            EngineError::EmployeeNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("EMPLOYEE_NOT_FOUND", message),
            ),
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::CalculationError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

/// Response body for `GET /periods/:week_id/entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodEntriesResponse {
    /// The period.
    pub period: PayrollPeriod,
    /// Its entries, ordered by employee id.
    pub entries: Vec<PayrollEntry>,
}

/// Response body for `POST /attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceResponse {
    /// Number of records stored.
    pub recorded: usize,
    /// Number of stored records that replaced an earlier one.
    pub replaced: usize,
}

/// One employee's result in a payroll run response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcomeResponse {
    /// The entry was committed.
    Committed {
        /// The committed entry.
        entry: PayrollEntry,
        /// Days of the period without attendance.
        coverage_warnings: Vec<CoverageWarning>,
    },
    /// The employee failed.
    Failed {
        /// The employee that failed.
        employee_id: String,
        /// The failure, in the same shape as a request error.
        error: ApiError,
    },
}

impl From<EmployeeOutcome> for RunOutcomeResponse {
    fn from(outcome: EmployeeOutcome) -> Self {
        match outcome {
            EmployeeOutcome::Committed {
                entry,
                coverage_warnings,
            } => RunOutcomeResponse::Committed {
                entry,
                coverage_warnings,
            },
            EmployeeOutcome::Failed { employee_id, error } => RunOutcomeResponse::Failed {
                employee_id,
                error: ApiErrorResponse::from(error).error,
            },
        }
    }
}

/// Response body for `POST /payroll-runs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollRunResponse {
    /// The period the run was for.
    pub week_id: WeekId,
    /// One outcome per requested employee, in request order.
    pub outcomes: Vec<RunOutcomeResponse>,
    /// Totals over committed entries.
    pub totals: RunTotals,
}

impl From<PayrollRunResult> for PayrollRunResponse {
    fn from(result: PayrollRunResult) -> Self {
        Self {
            week_id: result.week_id,
            outcomes: result.outcomes.into_iter().map(Into::into).collect(),
            totals: result.totals,
        }
    }
}
