//! Performance benchmarks for the Payroll Computation Engine.
//!
//! Covers the pure calculators, a single HTTP request, and parallel payroll
//! runs over growing employee counts.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use payroll_engine::api::{AppState, create_router};
use payroll_engine::calculation::{
    EmployeeRunInput, calculate_gross_pay, compute_statutory_deductions, period_starting,
    run_payroll,
};
use payroll_engine::config::{ConfigLoader, RunSettings, StatutorySchedule};
use payroll_engine::models::{AdHocDeductions, AttendanceRecord, EmployeeProfile};
use payroll_engine::store::{PayrollLedger, PeriodStore};
use rust_decimal::Decimal;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

const STATUSES: [&str; 7] = [
    "Present", "WFH", "Half Day", "Present", "SP", "Holiday", "Day Off",
];

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).expect("valid date")
}

fn create_profile(i: usize) -> EmployeeProfile {
    EmployeeProfile {
        id: format!("emp_{:04}", i),
        base_daily_rate: Decimal::from(500 + (i % 50) as i64 * 20),
        cost_center_flag: false,
    }
}

fn create_week(employee_id: &str) -> Vec<AttendanceRecord> {
    monday()
        .iter_days()
        .zip(STATUSES)
        .map(|(work_date, status)| AttendanceRecord {
            employee_id: employee_id.to_string(),
            work_date,
            status: status.to_string(),
            daily_rate: None,
            adjustment: Decimal::new(-2550, 2),
        })
        .collect()
}

fn create_inputs(count: usize) -> Vec<EmployeeRunInput> {
    (0..count)
        .map(|i| {
            let profile = create_profile(i);
            let attendance = create_week(&profile.id);
            EmployeeRunInput {
                profile,
                attendance,
                ad_hoc: AdHocDeductions::default(),
            }
        })
        .collect()
}

/// Benchmark: statutory deductions for one weekly gross.
fn bench_statutory_deductions(c: &mut Criterion) {
    let gross = Decimal::new(1_234_567, 2);
    c.bench_function("statutory_deductions", |b| {
        b.iter(|| black_box(compute_statutory_deductions(black_box(gross))))
    });
}

/// Benchmark: gross pay for one seven-day week.
fn bench_gross_pay_week(c: &mut Criterion) {
    let profile = create_profile(1);
    let records = create_week(&profile.id);
    let start = monday();
    let end = NaiveDate::from_ymd_opt(2025, 1, 12).expect("valid date");

    c.bench_function("gross_pay_week", |b| {
        b.iter(|| black_box(calculate_gross_pay(&profile, start, end, black_box(&records))))
    });
}

/// Benchmark: a single `/deductions` request through the router.
fn bench_deductions_request(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let config = ConfigLoader::load("./config/ph_2025").expect("Failed to load config");
    let router = create_router(AppState::new(config));
    let body = serde_json::json!({ "gross_pay": "4200.00" }).to_string();

    c.bench_function("deductions_request", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/deductions")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .expect("request"),
                )
                .await
                .expect("response");
            black_box(response)
        })
    });
}

/// Benchmark: parallel payroll runs over growing employee counts.
fn bench_payroll_run_scaling(c: &mut Criterion) {
    let schedule = StatutorySchedule::default();
    let settings = RunSettings::default();
    let period = period_starting(monday(), monday()).expect("period");

    let mut group = c.benchmark_group("payroll_run");
    group.sample_size(10);

    for count in [10usize, 100, 1000] {
        let inputs = create_inputs(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("employees", count), &inputs, |b, inputs| {
            b.iter(|| {
                let ledger = PayrollLedger::new();
                ledger
                    .insert_period(period.clone(), false)
                    .expect("insert period");
                black_box(run_payroll(&ledger, &period, inputs, &schedule, &settings, false))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_statutory_deductions,
    bench_gross_pay_week,
    bench_deductions_request,
    bench_payroll_run_scaling,
);
criterion_main!(benches);
