//! The external system-of-record contract.
//!
//! The engine never owns storage. It reads shifts, tasks, pay profiles and
//! ledger entries through [`WorkHoursStore`] and pushes derived totals back
//! through the same trait. Every write is an idempotent upsert keyed by
//! employee and period, so the retry policy may repeat it safely.

mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    DateRange, EmployeePayProfile, IncomeExpenseEntry, MonthRecord, PayrollStatement, Shift, Task,
    TaskStatusUpdate,
};

pub use memory::InMemoryStore;

/// Errors reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// The requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record.
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },
    /// The store refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Returns true if repeating the call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Selects shifts by employee and by the calendar date of their start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftFilter {
    /// Only shifts for this employee.
    pub employee_id: Option<String>,
    /// Only shifts starting within this range.
    pub date_range: Option<DateRange>,
}

impl ShiftFilter {
    /// All shifts for one employee.
    pub fn employee(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: Some(employee_id.into()),
            date_range: None,
        }
    }

    /// Restricts the filter to a date range.
    pub fn within(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Returns true if the shift passes the filter.
    ///
    /// A shift whose start cannot be read fails any date-range filter.
    pub fn matches(&self, shift: &Shift) -> bool {
        if let Some(employee_id) = &self.employee_id {
            if &shift.employee_id != employee_id {
                return false;
            }
        }
        match &self.date_range {
            Some(range) => shift
                .start_instant()
                .is_some_and(|start| range.contains_date(start.date_naive())),
            None => true,
        }
    }
}

/// Selects tasks by employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    /// Only tasks for this employee.
    pub employee_id: Option<String>,
}

/// Selects one employee's ledger entries for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeExpenseFilter {
    /// The employee.
    pub employee_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-based.
    pub month: u32,
}

/// The operations the engine needs from the system of record.
#[async_trait]
pub trait WorkHoursStore: Send + Sync {
    /// Lists shifts matching the filter.
    async fn list_shifts(&self, filter: &ShiftFilter) -> Result<Vec<Shift>, StoreError>;

    /// Lists tasks matching the filter.
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError>;

    /// Fetches an employee's pay profile.
    async fn get_employee_pay_profile(
        &self,
        employee_id: &str,
    ) -> Result<EmployeePayProfile, StoreError>;

    /// Lists an employee's ledger entries for a month.
    async fn list_income_expense(
        &self,
        filter: &IncomeExpenseFilter,
    ) -> Result<Vec<IncomeExpenseEntry>, StoreError>;

    /// Sets an employee's worked seconds for a day.
    async fn upsert_daily_work_hours(
        &self,
        employee_id: &str,
        date: NaiveDate,
        total_seconds: i64,
    ) -> Result<(), StoreError>;

    /// Sets a task's cached status and remaining time.
    async fn upsert_task_status(
        &self,
        task_id: &str,
        update: &TaskStatusUpdate,
    ) -> Result<(), StoreError>;

    /// Sets an employee's month record.
    async fn upsert_month_record(&self, record: &MonthRecord) -> Result<(), StoreError>;

    /// Sets an employee's payroll statement for a month.
    async fn upsert_monthly_payroll(
        &self,
        employee_id: &str,
        year: i32,
        month: u32,
        statement: &PayrollStatement,
    ) -> Result<(), StoreError>;
}
