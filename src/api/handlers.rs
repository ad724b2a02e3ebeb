//! HTTP request handlers for the Payroll Computation Engine API.
//!
//! Every handler tags its request with a correlation id, parses its JSON body
//! into a request type, calls the calculation layer and maps [`EngineError`]s
//! to JSON error bodies.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    build_entry, calculate_gross_pay, calculate_statutory_deductions, generate_period,
    reschedule_period, run_payroll_from_sources, update_period_status,
};
use crate::error::EngineError;
use crate::models::{EmployeeProfile, WeekId};
use crate::store::{EmployeeDirectory, EntryStore, PeriodStore};

use super::request::{
    AttendanceRequest, CreatePeriodRequest, DeductionsRequest, EntryRequest, GrossPayRequest,
    PayrollRunRequest, PeriodStatusRequest, ReschedulePeriodRequest,
};
use super::response::{
    ApiError, ApiErrorResponse, AttendanceResponse, PayrollRunResponse, PeriodEntriesResponse,
};
use super::state::AppState;

type JsonBody<T> = Result<Json<T>, JsonRejection>;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/periods", post(create_period_handler))
        .route("/periods/:week_id/status", put(period_status_handler))
        .route("/periods/:week_id/schedule", put(reschedule_period_handler))
        .route("/periods/:week_id/entries", get(period_entries_handler))
        .route("/employees", post(upsert_employee_handler))
        .route("/attendance", post(record_attendance_handler))
        .route("/gross-pay", post(gross_pay_handler))
        .route("/deductions", post(deductions_handler))
        .route("/entries", post(create_entry_handler))
        .route("/payroll-runs", post(payroll_run_handler))
        .with_state(state)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, error: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "Request failed"
    );
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

fn parse_body<T>(correlation_id: Uuid, payload: JsonBody<T>) -> Result<T, Response> {
    let rejection = match payload {
        Ok(Json(request)) => return Ok(request),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") || body_text.contains("unknown variant") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(json_response(StatusCode::BAD_REQUEST, error))
}

fn parse_week_id(correlation_id: Uuid, raw: &str) -> Result<WeekId, Response> {
    raw.parse().map_err(|_| {
        warn!(correlation_id = %correlation_id, week_id = %raw, "Invalid week id");
        json_response(StatusCode::BAD_REQUEST, ApiError::invalid_week_id(raw))
    })
}

/// Handler for `POST /periods`.
async fn create_period_handler(
    State(state): State<AppState>,
    payload: JsonBody<CreatePeriodRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing period request");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match generate_period(
        state.ledger(),
        request.reference_date,
        today(),
        request.overwrite,
    ) {
        Ok(period) => json_response(StatusCode::CREATED, period),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `PUT /periods/:week_id/status`.
async fn period_status_handler(
    State(state): State<AppState>,
    Path(raw_week_id): Path<String>,
    payload: JsonBody<PeriodStatusRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let week_id = match parse_week_id(correlation_id, &raw_week_id) {
        Ok(week_id) => week_id,
        Err(response) => return response,
    };
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match update_period_status(state.ledger(), week_id, request.status) {
        Ok(period) => json_response(StatusCode::OK, period),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `PUT /periods/:week_id/schedule`.
async fn reschedule_period_handler(
    State(state): State<AppState>,
    Path(raw_week_id): Path<String>,
    payload: JsonBody<ReschedulePeriodRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let week_id = match parse_week_id(correlation_id, &raw_week_id) {
        Ok(week_id) => week_id,
        Err(response) => return response,
    };
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match reschedule_period(state.ledger(), week_id, request.start_date, request.overwrite) {
        Ok(period) => json_response(StatusCode::OK, period),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `GET /periods/:week_id/entries`.
async fn period_entries_handler(
    State(state): State<AppState>,
    Path(raw_week_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let week_id = match parse_week_id(correlation_id, &raw_week_id) {
        Ok(week_id) => week_id,
        Err(response) => return response,
    };

    let ledger = state.ledger();
    let result = ledger
        .period(week_id)
        .and_then(|period| period.ok_or(EngineError::PeriodNotFound { week_id }))
        .and_then(|period| {
            let entries = ledger.entries_for_period(week_id)?;
            Ok(PeriodEntriesResponse { period, entries })
        });

    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /employees`.
async fn upsert_employee_handler(
    State(state): State<AppState>,
    payload: JsonBody<EmployeeProfile>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let profile = match parse_body(correlation_id, payload) {
        Ok(profile) => profile,
        Err(response) => return response,
    };

    match state.ledger().upsert_employee(profile.clone()) {
        Ok(()) => json_response(StatusCode::OK, profile),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /attendance`.
///
/// Records are applied in order; the first failure stops the batch and the
/// records before it stay stored.
async fn record_attendance_handler(
    State(state): State<AppState>,
    payload: JsonBody<AttendanceRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let mut response = AttendanceResponse {
        recorded: 0,
        replaced: 0,
    };
    for record in request.records {
        match state.ledger().record_attendance(record, request.overwrite) {
            Ok(previous) => {
                response.recorded += 1;
                response.replaced += usize::from(previous.is_some());
            }
            Err(err) => return error_response(correlation_id, err),
        }
    }

    info!(
        correlation_id = %correlation_id,
        recorded = response.recorded,
        replaced = response.replaced,
        "Recorded attendance"
    );
    json_response(StatusCode::OK, response)
}

/// Handler for `POST /gross-pay`.
async fn gross_pay_handler(payload: JsonBody<GrossPayRequest>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing gross pay request");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let start_time = Instant::now();
    match calculate_gross_pay(
        &request.employee,
        request.start_date,
        request.end_date,
        &request.attendance,
    ) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %result.employee_id,
                gross_pay = %result.gross_pay,
                missing_days = result.coverage_warnings.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Gross pay calculated"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /deductions`.
async fn deductions_handler(
    State(state): State<AppState>,
    payload: JsonBody<DeductionsRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match calculate_statutory_deductions(request.gross_pay, state.config().schedule(), 1) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /entries`.
///
/// Reads the employee's profile from the directory, derives the statutory
/// deductions from `gross_pay` and commits the entry.
async fn create_entry_handler(
    State(state): State<AppState>,
    payload: JsonBody<EntryRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing entry request");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let result = state
        .ledger()
        .fetch_employee_profile(&request.employee_id)
        .and_then(|profile| {
            let statutory =
                calculate_statutory_deductions(request.gross_pay, state.config().schedule(), 1)?;
            build_entry(
                state.ledger(),
                &profile,
                request.week_id,
                request.gross_pay,
                &statutory.deductions,
                &request.ad_hoc,
                request.overwrite,
            )
        });

    match result {
        Ok(entry) => json_response(StatusCode::CREATED, entry),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for `POST /payroll-runs`.
///
/// The run is CPU-bound and parallel, so it is moved off the async runtime.
async fn payroll_run_handler(
    State(state): State<AppState>,
    payload: JsonBody<PayrollRunRequest>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll run request");
    let request = match parse_body(correlation_id, payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let ledger = state.ledger_handle();
    let schedule = state.config().schedule().clone();
    let settings = *state.config().settings();
    let start_time = Instant::now();

    let joined = tokio::task::spawn_blocking(move || {
        run_payroll_from_sources(
            &*ledger,
            request.week_id,
            &request.employees,
            &schedule,
            &settings,
            request.overwrite,
        )
    })
    .await;

    let result = joined.unwrap_or_else(|err| {
        Err(EngineError::CalculationError {
            message: format!("payroll run did not complete: {}", err),
        })
    });

    match result {
        Ok(run) => {
            info!(
                correlation_id = %correlation_id,
                week_id = %run.week_id,
                committed = run.totals.committed,
                failed = run.totals.failed,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll run completed"
            );
            json_response(StatusCode::OK, PayrollRunResponse::from(run))
        }
        Err(err) => error_response(correlation_id, err),
    }
}
