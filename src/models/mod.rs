//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod date_range;
mod employee;
mod income_expense;
mod month_record;
mod payroll_result;
mod shift;
mod task;

pub use date_range::DateRange;
pub use employee::EmployeePayProfile;
pub use income_expense::{AdjustmentSummary, EntryType, IncomeExpenseEntry};
pub use month_record::MonthRecord;
pub use payroll_result::{AuditStep, AuditTrace, AuditWarning, PayrollResult, PayrollStatement};
pub use shift::{RawTimestamp, Shift};
pub use task::{Task, TaskStatus, TaskStatusUpdate};
