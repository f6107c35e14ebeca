//! Calculation logic for the payroll engine.
//!
//! Everything in this module is a synchronous pure function over immutable
//! snapshots: timestamp normalisation, shift aggregation by employee and
//! calendar period, task status resolution, monthly payroll with EPF/ETF,
//! and income/expense adjustments.

mod adjustments;
mod payroll;
mod rounding;
mod shift_aggregation;
mod task_status;
mod time_interval;

pub use adjustments::{AdjustmentResult, apply_adjustments};
pub use payroll::{PayrollCalculation, calculate_payroll, compute_payroll};
pub use rounding::round_half_away;
pub use shift_aggregation::{
    Aggregation, GroupBy, MonthRecordResult, Period, PeriodBucket, PeriodKey, TaskAggregation,
    aggregate, aggregate_by_task, build_month_record,
};
pub use task_status::{
    TaskBatchResolution, TaskResolution, allocated_seconds, mark_task_completed,
    resolve_task_status, resolve_tasks,
};
pub use time_interval::{checked_duration_seconds, duration_seconds, to_instant};
