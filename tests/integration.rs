//! End-to-end tests for the payroll engine.
//!
//! This test suite drives the engine through an in-memory store:
//! - Shift ingestion from heterogeneous timestamp shapes
//! - Daily reconciliation
//! - Task status refresh and operator completion
//! - Monthly payroll with EPF/ETF and ledger adjustments
//! - Retry and failure reporting
//! - Error cases

use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use payroll_engine::config::ConfigLoader;
use payroll_engine::error::EngineError;
use payroll_engine::models::{EmployeePayProfile, IncomeExpenseEntry, Shift, Task, TaskStatus};
use payroll_engine::reconciliation::WorkHoursService;
use payroll_engine::store::{InMemoryStore, TaskFilter};
use tokio::sync::mpsc;

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn load_config() -> ConfigLoader {
    ConfigLoader::load("./config/default").expect("Failed to load config")
}

fn create_service(store: &Arc<InMemoryStore>) -> WorkHoursService {
    let store: Arc<InMemoryStore> = Arc::clone(store);
    WorkHoursService::new(store, load_config())
}

fn shift_from(value: Value) -> Shift {
    serde_json::from_value(value).expect("Failed to parse shift")
}

/// An 8-hour day shift on the given date, in RFC 3339.
fn day_shift(id: &str, employee_id: &str, date: &str, task_id: Option<&str>) -> Shift {
    shift_from(json!({
        "id": id,
        "employee_id": employee_id,
        "task_id": task_id,
        "start": format!("{}T09:00:00Z", date),
        "end": format!("{}T17:00:00Z", date)
    }))
}

fn profile(employee_id: &str, salary: &str, rate: Option<&str>, enrolled: bool) -> EmployeePayProfile {
    serde_json::from_value(json!({
        "employee_id": employee_id,
        "basic_salary": salary,
        "overtime_hourly_rate": rate,
        "epf_etf_enrolled": enrolled
    }))
    .expect("Failed to parse pay profile")
}

fn ledger_entry(id: &str, entry_type: &str, amount: &str, created_at: &str) -> IncomeExpenseEntry {
    serde_json::from_value(json!({
        "id": id,
        "employee_id": "emp_001",
        "type": entry_type,
        "amount": amount,
        "note": "",
        "created_at": created_at
    }))
    .expect("Failed to parse ledger entry")
}

/// Seeds a March 2026 month of `days` 8-hour shifts for emp_001.
fn seed_month(store: &InMemoryStore, days: u32) {
    for day in 1..=days {
        let date = format!("2026-03-{:02}", day);
        store.insert_shift(day_shift(&format!("shift_{:03}", day), "emp_001", &date, None));
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Shift Ingestion
// =============================================================================

/// INT-001: mixed timestamp shapes aggregate to the same day
#[tokio::test]
async fn test_mixed_timestamp_shapes() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_shift(shift_from(json!({
        "id": "shift_epoch",
        "employee_id": "emp_001",
        "start": {"seconds": 1_773_133_200, "nanoseconds": 0},
        "end": {"seconds": 1_773_136_800, "nanoseconds": 0}
    })));
    store.insert_shift(shift_from(json!({
        "id": "shift_millis",
        "employee_id": "emp_001",
        "start": 1_773_140_400_000_i64,
        "end": 1_773_147_600_000_i64
    })));
    store.insert_shift(shift_from(json!({
        "id": "shift_text",
        "employee_id": "emp_001",
        "start": "2026-03-10 15:00:00",
        "end": "2026-03-10T21:30:00+05:30"
    })));
    store.insert_shift(shift_from(json!({
        "id": "shift_precomputed",
        "employee_id": "emp_001",
        "start": "2026-03-10T18:00:00Z",
        "total_spent_seconds": 1800
    })));

    let outcome = create_service(&store).reconcile_day(date(2026, 3, 10)).await.unwrap();

    // 1h + 2h + 1h + 0.5h
    assert_eq!(outcome.pushed, 1);
    assert!(outcome.warnings.is_empty());
    assert_eq!(
        store.daily_work_hours("emp_001", date(2026, 3, 10)),
        Some(4 * 3600 + 1800)
    );
}

/// INT-002: a bad shift contributes zero with a warning
#[tokio::test]
async fn test_negative_interval_contributes_zero() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_shift(day_shift("shift_ok", "emp_001", "2026-03-10", None));
    store.insert_shift(shift_from(json!({
        "id": "shift_backwards",
        "employee_id": "emp_001",
        "start": "2026-03-10T17:00:00Z",
        "end": "2026-03-10T09:00:00Z"
    })));

    let outcome = create_service(&store).reconcile_day(date(2026, 3, 10)).await.unwrap();

    assert_eq!(
        store.daily_work_hours("emp_001", date(2026, 3, 10)),
        Some(8 * 3600)
    );
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].code, "NEGATIVE_INTERVAL");
    assert!(outcome.warnings[0].message.contains("shift_backwards"));
}

/// INT-003: a shift past midnight counts toward its start day
#[tokio::test]
async fn test_overnight_shift_attributed_to_start_day() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_shift(shift_from(json!({
        "id": "shift_night",
        "employee_id": "emp_001",
        "start": "2026-03-10T22:00:00Z",
        "end": "2026-03-11T06:00:00Z"
    })));
    let service = create_service(&store);

    service.reconcile_day(date(2026, 3, 10)).await.unwrap();
    let next_day = service.reconcile_day(date(2026, 3, 11)).await.unwrap();

    assert_eq!(
        store.daily_work_hours("emp_001", date(2026, 3, 10)),
        Some(8 * 3600)
    );
    assert_eq!(next_day.pushed, 0);
    assert_eq!(store.daily_work_hours("emp_001", date(2026, 3, 11)), None);
}

// =============================================================================
// Task Status
// =============================================================================

fn seed_task(store: &InMemoryStore, id: &str, hours: &str) {
    store.insert_task(Task {
        id: id.to_string(),
        employee_id: "emp_001".to_string(),
        total_allocated_hours: decimal(hours),
        status: TaskStatus::NotStarted,
        remaining_time_seconds: 0,
    });
}

/// INT-004: 48h against a 40h task is overtime and stays overtime
#[tokio::test]
async fn test_task_goes_overtime_and_stays() {
    let store = Arc::new(InMemoryStore::new());
    seed_task(&store, "task_001", "40");
    for day in 2..=7 {
        let date = format!("2026-03-{:02}", day);
        store.insert_shift(day_shift(&format!("s{}", day), "emp_001", &date, Some("task_001")));
    }
    let service = create_service(&store);

    let batch = service.refresh_task_statuses(&TaskFilter::default()).await.unwrap();
    let task = store.task("task_001").unwrap();
    assert_eq!(batch.resolutions.len(), 1);
    assert_eq!(task.status, TaskStatus::Overtime);
    assert_eq!(task.remaining_time_seconds, 40 * 3600 - 48 * 3600);

    store.insert_shift(day_shift("s_late", "emp_001", "2026-03-09", Some("task_001")));
    service.refresh_task_statuses(&TaskFilter::default()).await.unwrap();
    let task = store.task("task_001").unwrap();
    assert_eq!(task.status, TaskStatus::Overtime);
    assert_eq!(task.remaining_time_seconds, -16 * 3600);
}

/// INT-005: operator completion is terminal
#[tokio::test]
async fn test_completed_task_is_not_reopened() {
    let store = Arc::new(InMemoryStore::new());
    seed_task(&store, "task_001", "40");
    store.insert_shift(day_shift("s1", "emp_001", "2026-03-02", Some("task_001")));
    let service = create_service(&store);

    service.refresh_task_statuses(&TaskFilter::default()).await.unwrap();
    assert_eq!(store.task("task_001").unwrap().status, TaskStatus::InProgress);

    service.complete_task("task_001").await.unwrap();
    for day in 3..=9 {
        let date = format!("2026-03-{:02}", day);
        store.insert_shift(day_shift(&format!("s{}", day), "emp_001", &date, Some("task_001")));
    }
    service.refresh_task_statuses(&TaskFilter::default()).await.unwrap();

    let task = store.task("task_001").unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.remaining_time_seconds, -24 * 3600);

    match service.complete_task("task_001").await {
        Err(EngineError::IllegalTransition { status, .. }) => {
            assert_eq!(status, TaskStatus::Completed)
        }
        other => panic!("Expected IllegalTransition, got {:?}", other),
    }
}

// =============================================================================
// Monthly Payroll
// =============================================================================

/// INT-006: prorated, enrolled, with ledger adjustments
#[tokio::test]
async fn test_monthly_payroll_end_to_end() {
    let store = Arc::new(InMemoryStore::new());
    // 18 days x 8h = 144h, plus a 6h shift = 150h
    seed_month(&store, 18);
    store.insert_shift(shift_from(json!({
        "id": "shift_extra",
        "employee_id": "emp_001",
        "start": "2026-03-20T09:00:00Z",
        "end": "2026-03-20T15:00:00Z"
    })));
    store.insert_pay_profile(profile("emp_001", "30000", Some("100"), true));
    store.insert_income_expense(ledger_entry("ie_001", "income", "500", "2026-03-05T08:00:00Z"));
    store.insert_income_expense(ledger_entry("ie_002", "expense", "200", "2026-03-25T08:00:00Z"));
    store.insert_income_expense(ledger_entry("ie_003", "income", "999", "2026-04-01T08:00:00Z"));

    let run = create_service(&store)
        .run_monthly_payroll("emp_001", 2026, 3)
        .await
        .unwrap();
    run.persistence.await.unwrap().unwrap();

    let statement = run.statement;
    assert_eq!(statement.month_record.total_worked_seconds, 150 * 3600);
    assert_eq!(statement.result.total_hours, decimal("150"));
    assert_eq!(statement.result.overtime_hours, decimal("0"));
    assert_eq!(statement.result.employee_epf_deduction, decimal("1800"));
    assert_eq!(statement.result.company_epf_contribution, decimal("2700"));
    assert_eq!(statement.result.company_etf_contribution, decimal("675"));
    assert_eq!(statement.result.payroll_salary, decimal("20700"));
    assert_eq!(statement.result.total_cost_to_company, decimal("24075"));
    assert_eq!(statement.adjustments.entries_applied, 2);
    assert_eq!(statement.final_total, decimal("21000"));
    assert_eq!(statement.audit_trace.steps.len(), 7);

    assert_eq!(store.monthly_payroll("emp_001", 2026, 3), Some(statement.clone()));
    assert_eq!(
        store.month_record("emp_001", 2026, 3),
        Some(statement.month_record.clone())
    );
}

/// INT-007: overtime month
#[tokio::test]
async fn test_monthly_payroll_with_overtime() {
    let store = Arc::new(InMemoryStore::new());
    // 26 x 8h = 208h, plus 2h = 210h
    seed_month(&store, 26);
    store.insert_shift(shift_from(json!({
        "id": "shift_extra",
        "employee_id": "emp_001",
        "start": "2026-03-28T09:00:00Z",
        "end": "2026-03-28T11:00:00Z"
    })));
    store.insert_pay_profile(profile("emp_001", "30000", Some("100"), false));

    let run = create_service(&store)
        .run_monthly_payroll("emp_001", 2026, 3)
        .await
        .unwrap();

    assert_eq!(run.statement.result.total_hours, decimal("210"));
    assert_eq!(run.statement.result.overtime_hours, decimal("10"));
    assert_eq!(run.statement.result.overtime_salary, decimal("1000"));
    assert_eq!(run.statement.result.total_monthly_salary, decimal("31000"));
    assert_eq!(run.statement.final_total, decimal("31000"));
}

/// INT-008: recomputation replaces the stored statement
#[tokio::test]
async fn test_recomputation_replaces_statement() {
    let store = Arc::new(InMemoryStore::new());
    seed_month(&store, 10);
    store.insert_pay_profile(profile("emp_001", "30000", None, false));
    let service = create_service(&store);

    let first = service.run_monthly_payroll("emp_001", 2026, 3).await.unwrap();
    first.persistence.await.unwrap().unwrap();

    store.insert_income_expense(ledger_entry("ie_001", "income", "500", "2026-03-05T08:00:00Z"));
    let second = service.run_monthly_payroll("emp_001", 2026, 3).await.unwrap();
    second.persistence.await.unwrap().unwrap();

    let stored = store.monthly_payroll("emp_001", 2026, 3).unwrap();
    assert_ne!(first.statement.calculation_id, second.statement.calculation_id);
    assert_eq!(stored.calculation_id, second.statement.calculation_id);
    assert_eq!(stored.final_total, first.statement.final_total + decimal("500"));
}

// =============================================================================
// Retry and Failure Reporting
// =============================================================================

/// INT-009: two failures then success writes once
#[tokio::test(start_paused = true)]
async fn test_retry_recovers_from_transient_failures() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_shift(day_shift("s1", "emp_001", "2026-03-10", None));
    store.fail_next("upsert_daily_work_hours", 2);

    let outcome = create_service(&store).reconcile_day(date(2026, 3, 10)).await.unwrap();

    assert_eq!(outcome.pushed, 1);
    assert_eq!(store.attempts("upsert_daily_work_hours"), 3);
    assert_eq!(store.writes("upsert_daily_work_hours"), 1);
}

/// INT-010: one employee's failure does not block another's
#[tokio::test(start_paused = true)]
async fn test_failure_is_isolated_per_employee() {
    let store = Arc::new(InMemoryStore::new());
    store.insert_shift(day_shift("s1", "emp_001", "2026-03-10", None));
    store.insert_shift(day_shift("s2", "emp_002", "2026-03-10", None));
    store.reject_next("upsert_daily_work_hours");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let service = create_service(&store).with_failure_channel(tx);
    let outcome = service.reconcile_day(date(2026, 3, 10)).await.unwrap();

    assert_eq!(outcome.pushed, 1);
    assert_eq!(outcome.failed, 1);
    let failure = rx.recv().await.unwrap();
    assert!(matches!(failure.error, EngineError::StoreRejected { .. }));
    assert_eq!(store.writes("upsert_daily_work_hours"), 1);
}

// =============================================================================
// Error Cases
// =============================================================================

/// INT-011: zero baseline is rejected for the single computation
#[tokio::test]
async fn test_zero_baseline_rejected() {
    let store = Arc::new(InMemoryStore::new());
    seed_month(&store, 5);
    store.insert_pay_profile(profile("emp_001", "30000", None, false));
    let service = create_service(&store);

    let built = service
        .month_record("emp_001", 2026, 3, Some(Decimal::ZERO))
        .await
        .unwrap();
    let result = payroll_engine::calculation::compute_payroll(
        &profile("emp_001", "30000", None, false),
        &built.record,
    );

    assert!(matches!(result, Err(EngineError::InvalidBaseline { .. })));
}

/// INT-012: listing failures surface as TransientIo after retries
#[tokio::test(start_paused = true)]
async fn test_listing_failure_is_transient_io() {
    let store = Arc::new(InMemoryStore::new());
    store.fail_next("list_shifts", 3);

    let result = create_service(&store).reconcile_day(date(2026, 3, 10)).await;

    match result {
        Err(EngineError::TransientIo {
            operation,
            attempts,
            ..
        }) => {
            assert_eq!(operation, "list_shifts");
            assert_eq!(attempts, 3);
        }
        other => panic!("Expected TransientIo, got {:?}", other),
    }
}
