//! HTTP API module for the Payroll Computation Engine.
//!
//! This module exposes period generation, gross pay, statutory deductions,
//! entry building and payroll runs as JSON endpoints over an in-memory ledger.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AttendanceRequest, CreatePeriodRequest, DeductionsRequest, EntryRequest, GrossPayRequest,
    PayrollRunRequest, PeriodStatusRequest, ReschedulePeriodRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, AttendanceResponse, PayrollRunResponse, PeriodEntriesResponse,
    RunOutcomeResponse,
};
pub use state::AppState;
