//! An in-process [`WorkHoursStore`].
//!
//! Backs tests and local runs. Failures can be injected per operation to
//! exercise the retry policy and the reconciliation loop's error path.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{
    EmployeePayProfile, IncomeExpenseEntry, MonthRecord, PayrollStatement, Shift, Task,
    TaskStatusUpdate,
};

use super::{IncomeExpenseFilter, ShiftFilter, StoreError, TaskFilter, WorkHoursStore};

type MonthKey = (String, i32, u32);

#[derive(Debug, Default)]
struct State {
    shifts: Vec<Shift>,
    tasks: BTreeMap<String, Task>,
    profiles: HashMap<String, EmployeePayProfile>,
    ledger: Vec<IncomeExpenseEntry>,
    daily_work_hours: BTreeMap<(String, NaiveDate), i64>,
    month_records: BTreeMap<MonthKey, MonthRecord>,
    payroll: BTreeMap<MonthKey, PayrollStatement>,
    injected: HashMap<String, Vec<StoreError>>,
    attempts: HashMap<String, u32>,
    writes: HashMap<String, u32>,
}

/// A [`WorkHoursStore`] held in memory.
///
/// # Example
///
/// ```
/// use payroll_engine::store::{InMemoryStore, ShiftFilter, WorkHoursStore};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryStore::new();
/// store.fail_next("list_shifts", 1);
///
/// assert!(store.list_shifts(&ShiftFilter::default()).await.is_err());
/// assert!(store.list_shifts(&ShiftFilter::default()).await.is_ok());
/// assert_eq!(store.attempts("list_shifts"), 2);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a shift.
    pub fn insert_shift(&self, shift: Shift) {
        self.state().shifts.push(shift);
    }

    /// Adds or replaces a task.
    pub fn insert_task(&self, task: Task) {
        self.state().tasks.insert(task.id.clone(), task);
    }

    /// Adds or replaces a pay profile.
    pub fn insert_pay_profile(&self, profile: EmployeePayProfile) {
        self.state()
            .profiles
            .insert(profile.employee_id.clone(), profile);
    }

    /// Adds a ledger entry.
    pub fn insert_income_expense(&self, entry: IncomeExpenseEntry) {
        self.state().ledger.push(entry);
    }

    /// Makes the next `times` calls to `operation` fail with
    /// [`StoreError::Unavailable`].
    pub fn fail_next(&self, operation: &str, times: u32) {
        let errors = (0..times)
            .map(|_| StoreError::Unavailable(format!("injected failure in {}", operation)));
        self.inject(operation, errors);
    }

    /// Makes the next call to `operation` fail with [`StoreError::Rejected`].
    pub fn reject_next(&self, operation: &str) {
        self.inject(
            operation,
            std::iter::once(StoreError::Rejected(format!(
                "injected rejection in {}",
                operation
            ))),
        );
    }

    fn inject(&self, operation: &str, errors: impl Iterator<Item = StoreError>) {
        self.state()
            .injected
            .entry(operation.to_string())
            .or_default()
            .extend(errors);
    }

    /// How many times `operation` has been called, failed calls included.
    pub fn attempts(&self, operation: &str) -> u32 {
        self.state().attempts.get(operation).copied().unwrap_or(0)
    }

    /// How many times `operation` has successfully written.
    pub fn writes(&self, operation: &str) -> u32 {
        self.state().writes.get(operation).copied().unwrap_or(0)
    }

    /// The stored worked seconds for an employee and day.
    pub fn daily_work_hours(&self, employee_id: &str, date: NaiveDate) -> Option<i64> {
        self.state()
            .daily_work_hours
            .get(&(employee_id.to_string(), date))
            .copied()
    }

    /// The stored task.
    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.state().tasks.get(task_id).cloned()
    }

    /// The stored month record.
    pub fn month_record(&self, employee_id: &str, year: i32, month: u32) -> Option<MonthRecord> {
        self.state()
            .month_records
            .get(&(employee_id.to_string(), year, month))
            .cloned()
    }

    /// The stored payroll statement.
    pub fn monthly_payroll(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
    ) -> Option<PayrollStatement> {
        self.state()
            .payroll
            .get(&(employee_id.to_string(), year, month))
            .cloned()
    }

    /// Counts the call and pops an injected failure if one is queued.
    fn begin(&self, operation: &str) -> Result<MutexGuard<'_, State>, StoreError> {
        let mut state = self.state();
        *state.attempts.entry(operation.to_string()).or_insert(0) += 1;
        if let Some(queue) = state.injected.get_mut(operation) {
            if !queue.is_empty() {
                return Err(queue.remove(0));
            }
        }
        Ok(state)
    }
}

fn record_write(state: &mut State, operation: &str) {
    *state.writes.entry(operation.to_string()).or_insert(0) += 1;
}

#[async_trait]
impl WorkHoursStore for InMemoryStore {
    async fn list_shifts(&self, filter: &ShiftFilter) -> Result<Vec<Shift>, StoreError> {
        let state = self.begin("list_shifts")?;
        Ok(state
            .shifts
            .iter()
            .filter(|shift| filter.matches(shift))
            .cloned()
            .collect())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let state = self.begin("list_tasks")?;
        Ok(state
            .tasks
            .values()
            .filter(|task| {
                filter
                    .employee_id
                    .as_ref()
                    .is_none_or(|id| &task.employee_id == id)
            })
            .cloned()
            .collect())
    }

    async fn get_employee_pay_profile(
        &self,
        employee_id: &str,
    ) -> Result<EmployeePayProfile, StoreError> {
        let state = self.begin("get_employee_pay_profile")?;
        state
            .profiles
            .get(employee_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "pay profile".to_string(),
                id: employee_id.to_string(),
            })
    }

    async fn list_income_expense(
        &self,
        filter: &IncomeExpenseFilter,
    ) -> Result<Vec<IncomeExpenseEntry>, StoreError> {
        let state = self.begin("list_income_expense")?;
        Ok(state
            .ledger
            .iter()
            .filter(|entry| {
                entry.employee_id == filter.employee_id
                    && entry.created_at.year() == filter.year
                    && entry.created_at.month() == filter.month
            })
            .cloned()
            .collect())
    }

    async fn upsert_daily_work_hours(
        &self,
        employee_id: &str,
        date: NaiveDate,
        total_seconds: i64,
    ) -> Result<(), StoreError> {
        let mut state = self.begin("upsert_daily_work_hours")?;
        state
            .daily_work_hours
            .insert((employee_id.to_string(), date), total_seconds);
        record_write(&mut state, "upsert_daily_work_hours");
        Ok(())
    }

    async fn upsert_task_status(
        &self,
        task_id: &str,
        update: &TaskStatusUpdate,
    ) -> Result<(), StoreError> {
        let mut state = self.begin("upsert_task_status")?;
        let task = state
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "task".to_string(),
                id: task_id.to_string(),
            })?;
        task.status = update.status;
        task.remaining_time_seconds = update.remaining_time_seconds;
        record_write(&mut state, "upsert_task_status");
        Ok(())
    }

    async fn upsert_month_record(&self, record: &MonthRecord) -> Result<(), StoreError> {
        let mut state = self.begin("upsert_month_record")?;
        state.month_records.insert(
            (record.employee_id.clone(), record.year, record.month),
            record.clone(),
        );
        record_write(&mut state, "upsert_month_record");
        Ok(())
    }

    async fn upsert_monthly_payroll(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        statement: &PayrollStatement,
    ) -> Result<(), StoreError> {
        let mut state = self.begin("upsert_monthly_payroll")?;
        state
            .payroll
            .insert((employee_id.to_string(), year, month), statement.clone());
        record_write(&mut state, "upsert_monthly_payroll");
        Ok(())
    }
}
