//! Calculation logic for the Payroll Computation Engine.
//!
//! This module contains the status multiplier table, gross pay aggregation,
//! SSS, PhilHealth, Pag-IBIG and withholding tax formulas, weekly period
//! sequencing, payroll entry aggregation and parallel payroll runs.

mod contributions;
mod entry_aggregator;
mod gross_pay;
mod money;
mod payroll_run;
mod period_sequencer;
mod statutory;
mod status_rules;
mod withholding_tax;

pub use contributions::{
    MONTHS_PER_YEAR, SssContribution, WEEKS_PER_MONTH, monthly_equivalent, pagibig_contribution,
    philhealth_contribution, sss_contribution,
};
pub use entry_aggregator::{aggregate_entry, build_entry};
pub use gross_pay::{calculate_gross_pay, compute_gross_pay};
pub use money::{MONEY_SCALE, round_money};
pub use payroll_run::{
    ComputedEntry, EmployeeOutcome, EmployeeRunInput, PayrollRunResult, RunEmployee, RunTotals,
    compute_entry, run_payroll, run_payroll_from_sources,
};
pub use period_sequencer::{
    PAYMENT_LAG_DAYS, PERIOD_LENGTH_DAYS, first_monday_of_year, generate_period, next_period,
    normalize_to_monday, period_starting, reschedule_period, update_period_status,
};
pub use statutory::{
    STATUTORY_AUDIT_STEPS, StatutoryResult, calculate_statutory_deductions,
    compute_statutory_deductions,
};
pub use status_rules::{STATUS_RULES, status_multiplier};
pub use withholding_tax::{annual_withholding_tax, find_bracket};
