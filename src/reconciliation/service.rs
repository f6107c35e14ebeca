//! Store-facing orchestration of the pure calculators.
//!
//! [`WorkHoursService`] reads snapshots from a [`WorkHoursStore`], runs the
//! calculators over them and pushes the derived caches back. Every store call
//! goes through the retry policy.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::calculation::{
    GroupBy, MonthRecordResult, Period, PeriodBucket, TaskBatchResolution, aggregate,
    apply_adjustments, build_month_record, calculate_payroll, mark_task_completed, resolve_tasks,
};
use crate::config::{ConfigLoader, RetryPolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, AuditWarning, DateRange, PayrollStatement, Task, TaskStatusUpdate,
};
use crate::store::{IncomeExpenseFilter, ShiftFilter, TaskFilter, WorkHoursStore};

use super::retry::with_retry;

/// A store write that failed after retries, reported on the failure channel.
#[derive(Debug)]
pub struct ReconciliationFailure {
    /// The store operation that failed.
    pub operation: String,
    /// The record the write was for (an employee or task id).
    pub subject: String,
    /// The final error.
    pub error: EngineError,
    /// When the failure was reported.
    pub occurred_at: DateTime<Utc>,
}

/// The outcome of pushing one day's totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReconciliation {
    /// The day that was reconciled.
    pub date: NaiveDate,
    /// Employees whose totals were written.
    pub pushed: usize,
    /// Employees whose write failed.
    pub failed: usize,
    /// Data-quality warnings from the aggregation.
    pub warnings: Vec<AuditWarning>,
}

/// A computed payroll statement and its in-flight persistence.
#[derive(Debug)]
pub struct PayrollRun {
    /// The statement, valid whether or not persistence succeeds.
    pub statement: PayrollStatement,
    /// Resolves once the statement has been written or the write failed.
    pub persistence: JoinHandle<EngineResult<()>>,
}

/// Runs the calculators against a store.
///
/// Cheap to clone; clones share the store, the configuration and the
/// failure channel.
#[derive(Clone)]
pub struct WorkHoursService {
    store: Arc<dyn WorkHoursStore>,
    config: Arc<ConfigLoader>,
    failures: Option<mpsc::UnboundedSender<ReconciliationFailure>>,
}

impl WorkHoursService {
    /// Creates a service over the given store and configuration.
    pub fn new(store: Arc<dyn WorkHoursStore>, config: ConfigLoader) -> Self {
        Self {
            store,
            config: Arc::new(config),
            failures: None,
        }
    }

    /// Reports failed background writes on the given channel.
    pub fn with_failure_channel(
        mut self,
        failures: mpsc::UnboundedSender<ReconciliationFailure>,
    ) -> Self {
        self.failures = Some(failures);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Aggregates every employee's shifts for a day and upserts the totals.
    ///
    /// Each employee's write runs as its own task, so one failure does not
    /// block the others. Failed writes are logged and reported on the
    /// failure channel.
    ///
    /// # Errors
    ///
    /// Returns an error only if the shifts cannot be listed.
    pub async fn reconcile_day(&self, date: NaiveDate) -> EngineResult<DayReconciliation> {
        let policy = self.config.config().reconciliation.retry;
        let filter = ShiftFilter::default().within(DateRange::single_day(date));
        let shifts = with_retry(&policy, "list_shifts", || self.store.list_shifts(&filter)).await?;

        let aggregation = aggregate(&shifts, &GroupBy::all(Period::Day));

        let mut writes = JoinSet::new();
        for (key, seconds) in aggregation.totals {
            if key.bucket != PeriodBucket::Day(date) {
                continue;
            }
            let store = Arc::clone(&self.store);
            let employee_id = key.employee_id;
            writes.spawn(async move {
                let result = with_retry(&policy, "upsert_daily_work_hours", || {
                    store.upsert_daily_work_hours(&employee_id, date, seconds)
                })
                .await;
                (employee_id, seconds, result)
            });
        }

        let mut pushed = 0;
        let mut failed = 0;
        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((employee_id, seconds, Ok(()))) => {
                    debug!(employee_id = %employee_id, %date, seconds, "Daily total pushed");
                    pushed += 1;
                }
                Ok((employee_id, _, Err(err))) => {
                    failed += 1;
                    self.report_failure("upsert_daily_work_hours", &employee_id, err);
                }
                Err(join_err) => {
                    failed += 1;
                    error!(error = %join_err, "Daily total push task aborted");
                }
            }
        }

        Ok(DayReconciliation {
            date,
            pushed,
            failed,
            warnings: aggregation.warnings,
        })
    }

    /// Regenerates an employee's month record from shifts and upserts it.
    ///
    /// `baseline_hours` defaults to the configured monthly baseline.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidConfiguration`] if the month is out of range
    /// - store errors from listing shifts or writing the record
    pub async fn month_record(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        baseline_hours: Option<Decimal>,
    ) -> EngineResult<MonthRecordResult> {
        let built = self
            .regenerate_month_record(employee_id, year, month, baseline_hours)
            .await?;
        let policy = self.config.config().reconciliation.retry;
        with_retry(&policy, "upsert_month_record", || {
            self.store.upsert_month_record(&built.record)
        })
        .await?;

        Ok(built)
    }

    async fn regenerate_month_record(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        baseline_hours: Option<Decimal>,
    ) -> EngineResult<MonthRecordResult> {
        let range = DateRange::for_month(year, month).ok_or_else(|| {
            EngineError::InvalidConfiguration {
                field: "month".to_string(),
                message: format!("{}-{:02} is not a valid calendar month", year, month),
            }
        })?;
        let policy = self.config.config().reconciliation.retry;
        let baseline = baseline_hours
            .unwrap_or(self.config.config().payroll.default_monthly_baseline_hours);

        let filter = ShiftFilter::employee(employee_id).within(range);
        let shifts = with_retry(&policy, "list_shifts", || self.store.list_shifts(&filter)).await?;

        Ok(build_month_record(employee_id, year, month, &shifts, baseline))
    }

    /// Computes an employee's monthly payroll statement.
    ///
    /// The month record is regenerated from shifts and cached in the store.
    /// A failed cache write is reported on the failure channel and the
    /// statement is computed from the regenerated record regardless.
    ///
    /// The statement is returned as soon as it is computed. Persisting it
    /// runs in the background; a failed write is reported on the failure
    /// channel and through [`PayrollRun::persistence`], and does not
    /// invalidate the statement.
    ///
    /// # Errors
    ///
    /// Returns an error if shifts, the pay profile or ledger entries cannot
    /// be read, or if the payroll calculation rejects its inputs.
    pub async fn run_monthly_payroll(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> EngineResult<PayrollRun> {
        let start_time = Instant::now();
        let policy = self.config.config().reconciliation.retry;

        let built = self
            .regenerate_month_record(employee_id, year, month, None)
            .await?;
        if let Err(err) = with_retry(&policy, "upsert_month_record", || {
            self.store.upsert_month_record(&built.record)
        })
        .await
        {
            self.report_failure("upsert_month_record", employee_id, err);
        }

        let profile = with_retry(&policy, "get_employee_pay_profile", || {
            self.store.get_employee_pay_profile(employee_id)
        })
        .await?;

        let calculation =
            calculate_payroll(&profile, &built.record, self.config.statutory_rates(), 1)?;

        let ledger_filter = IncomeExpenseFilter {
            employee_id: employee_id.to_string(),
            year,
            month,
        };
        let entries = with_retry(&policy, "list_income_expense", || {
            self.store.list_income_expense(&ledger_filter)
        })
        .await?;

        let next_step = calculation.audit_steps.len() as u32 + 1;
        let adjustments = apply_adjustments(
            &entries,
            calculation.result.total_monthly_salary,
            next_step,
        );

        let mut steps = calculation.audit_steps;
        steps.push(adjustments.audit_step);
        let mut warnings = built.warnings;
        warnings.extend(adjustments.warnings);

        let statement = PayrollStatement {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            employee_id: employee_id.to_string(),
            year,
            month,
            month_record: built.record,
            result: calculation.result,
            final_total: adjustments.summary.final_total,
            adjustments: adjustments.summary,
            audit_trace: AuditTrace {
                steps,
                warnings,
                duration_us: start_time.elapsed().as_micros() as u64,
            },
        };

        info!(
            calculation_id = %statement.calculation_id,
            employee_id = %employee_id,
            year,
            month,
            final_total = %statement.final_total,
            warnings = statement.audit_trace.warnings.len(),
            duration_us = statement.audit_trace.duration_us,
            "Monthly payroll computed"
        );

        let persistence = self.spawn_payroll_write(statement.clone(), policy);
        Ok(PayrollRun {
            statement,
            persistence,
        })
    }

    fn spawn_payroll_write(
        &self,
        statement: PayrollStatement,
        policy: RetryPolicy,
    ) -> JoinHandle<EngineResult<()>> {
        let service = self.clone();
        tokio::spawn(async move {
            let result = with_retry(&policy, "upsert_monthly_payroll", || {
                service.store.upsert_monthly_payroll(
                    &statement.employee_id,
                    statement.year,
                    statement.month,
                    &statement,
                )
            })
            .await;

            if let Err(err) = &result {
                service.report_failure("upsert_monthly_payroll", &statement.employee_id, err.clone());
            }
            result
        })
    }

    /// Re-resolves tasks against current shifts and pushes every resolution.
    ///
    /// Run after every ingestion batch. Failed pushes are reported on the
    /// failure channel; the resolutions are returned regardless.
    ///
    /// # Errors
    ///
    /// Returns an error only if tasks or shifts cannot be listed.
    pub async fn refresh_task_statuses(
        &self,
        filter: &TaskFilter,
    ) -> EngineResult<TaskBatchResolution> {
        let policy = self.config.config().reconciliation.retry;
        let tasks = with_retry(&policy, "list_tasks", || self.store.list_tasks(filter)).await?;

        // Colleagues may book time on the same task, so shifts are never
        // narrowed by employee here.
        let shift_filter = ShiftFilter::default();
        let shifts =
            with_retry(&policy, "list_shifts", || self.store.list_shifts(&shift_filter)).await?;

        let batch = resolve_tasks(&tasks, &shifts);

        let mut writes = JoinSet::new();
        for resolution in &batch.resolutions {
            let store = Arc::clone(&self.store);
            let task_id = resolution.task_id.clone();
            let update = resolution.update();
            writes.spawn(async move {
                let result = with_retry(&policy, "upsert_task_status", || {
                    store.upsert_task_status(&task_id, &update)
                })
                .await;
                (task_id, result)
            });
        }

        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((task_id, Err(err))) => self.report_failure("upsert_task_status", &task_id, err),
                Err(join_err) => error!(error = %join_err, "Task status push task aborted"),
            }
        }

        let changed = batch
            .resolutions
            .iter()
            .filter(|r| r.status_changed())
            .count();
        info!(
            tasks = batch.resolutions.len(),
            changed,
            warnings = batch.warnings.len(),
            "Task statuses refreshed"
        );

        Ok(batch)
    }

    /// Marks a task completed on behalf of an operator and persists it.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the task does not exist
    /// - [`EngineError::IllegalTransition`] if it is already terminal
    /// - store errors from the write
    pub async fn complete_task(&self, task_id: &str) -> EngineResult<Task> {
        let policy = self.config.config().reconciliation.retry;
        let filter = TaskFilter::default();
        let tasks = with_retry(&policy, "list_tasks", || self.store.list_tasks(&filter)).await?;

        let task = tasks
            .into_iter()
            .find(|task| task.id == task_id)
            .ok_or_else(|| EngineError::NotFound {
                entity: "task".to_string(),
                id: task_id.to_string(),
            })?;

        let completed = mark_task_completed(&task)?;
        let update = TaskStatusUpdate {
            status: completed.status,
            remaining_time_seconds: completed.remaining_time_seconds,
        };
        with_retry(&policy, "upsert_task_status", || {
            self.store.upsert_task_status(task_id, &update)
        })
        .await?;

        info!(task_id = %task_id, "Task marked completed");
        Ok(completed)
    }

    fn report_failure(&self, operation: &str, subject: &str, error: EngineError) {
        error!(
            operation,
            subject = %subject,
            error = %error,
            "Store write failed after retries"
        );

        if let Some(failures) = &self.failures {
            let failure = ReconciliationFailure {
                operation: operation.to_string(),
                subject: subject.to_string(),
                error,
                occurred_at: Utc::now(),
            };
            if failures.send(failure).is_err() {
                warn!(operation, "Failure channel closed; dropping report");
            }
        }
    }
}
