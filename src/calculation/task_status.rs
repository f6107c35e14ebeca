//! Task status resolution.
//!
//! The persisted status and remaining time of a task are caches. This module
//! regenerates them from consumed seconds:
//!
//! ```text
//! not_started ──► in_progress ──► overtime
//!                      │
//!                      └────────► completed   (operator action only)
//! ```
//!
//! `completed` and `overtime` are terminal. Resolution still recomputes the
//! remaining time of a terminal task, but never changes its status.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, Shift, Task, TaskStatus, TaskStatusUpdate};

use super::rounding::to_whole_seconds;
use super::shift_aggregation::aggregate_by_task;

const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);

/// The regenerated status cache for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResolution {
    /// The task that was resolved.
    pub task_id: String,
    /// The status the task had before resolution.
    pub previous_status: TaskStatus,
    /// The resolved status.
    pub status: TaskStatus,
    /// Seconds consumed across the task's shifts.
    pub consumed_seconds: i64,
    /// Allocated seconds minus consumed seconds; negative once over budget.
    pub remaining_time_seconds: i64,
    /// The audit step recording this resolution.
    pub audit_step: AuditStep,
}

impl TaskResolution {
    /// Returns true if resolution moved the task to a different status.
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.status
    }

    /// The fields to push back to the store.
    pub fn update(&self) -> TaskStatusUpdate {
        TaskStatusUpdate {
            status: self.status,
            remaining_time_seconds: self.remaining_time_seconds,
        }
    }

    /// Writes the resolved cache fields onto a task.
    pub fn apply_to(&self, task: &mut Task) {
        task.status = self.status;
        task.remaining_time_seconds = self.remaining_time_seconds;
    }
}

/// Resolutions for a batch of tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBatchResolution {
    /// One resolution per input task, in input order.
    pub resolutions: Vec<TaskResolution>,
    /// Data-quality warnings from the per-task aggregation.
    pub warnings: Vec<AuditWarning>,
}

/// Returns a task's allocation in whole seconds, saturating at the `i64`
/// bounds.
pub fn allocated_seconds(task: &Task) -> i64 {
    match task.total_allocated_hours.checked_mul(SECONDS_PER_HOUR) {
        Some(seconds) => to_whole_seconds(seconds),
        None if task.total_allocated_hours.is_sign_negative() => i64::MIN,
        None => i64::MAX,
    }
}

/// Resolves a task's status and remaining time from its consumed seconds.
///
/// Negative `consumed_seconds` are clamped to zero.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::resolve_task_status;
/// use payroll_engine::models::{Task, TaskStatus};
/// use rust_decimal::Decimal;
///
/// let task = Task {
///     id: "task_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     total_allocated_hours: Decimal::new(40, 0),
///     status: TaskStatus::InProgress,
///     remaining_time_seconds: 0,
/// };
///
/// let resolution = resolve_task_status(&task, 45 * 3600, 1);
/// assert_eq!(resolution.status, TaskStatus::Overtime);
/// assert_eq!(resolution.remaining_time_seconds, -18_000);
/// ```
pub fn resolve_task_status(task: &Task, consumed_seconds: i64, step_number: u32) -> TaskResolution {
    let consumed = consumed_seconds.max(0);
    let allocated = allocated_seconds(task);
    let remaining = allocated.saturating_sub(consumed);

    let (status, reasoning) = if task.status.is_terminal() {
        (
            task.status,
            format!(
                "Task is {} which is terminal; remaining time recomputed to {}s",
                task.status, remaining
            ),
        )
    } else if consumed == 0 {
        (
            TaskStatus::NotStarted,
            "No time consumed against the task".to_string(),
        )
    } else if remaining >= 0 {
        (
            TaskStatus::InProgress,
            format!(
                "{}s consumed of {}s allocated, {}s remaining",
                consumed, allocated, remaining
            ),
        )
    } else {
        (
            TaskStatus::Overtime,
            format!(
                "{}s consumed exceeds {}s allocated by {}s",
                consumed, allocated, -remaining
            ),
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "task_status_resolution".to_string(),
        rule_name: "Task Status Resolution".to_string(),
        input: serde_json::json!({
            "task_id": task.id,
            "previous_status": task.status,
            "total_allocated_hours": task.total_allocated_hours.normalize().to_string(),
            "consumed_seconds": consumed
        }),
        output: serde_json::json!({
            "status": status,
            "remaining_time_seconds": remaining
        }),
        reasoning,
    };

    TaskResolution {
        task_id: task.id.clone(),
        previous_status: task.status,
        status,
        consumed_seconds: consumed,
        remaining_time_seconds: remaining,
        audit_step,
    }
}

/// Resolves every task against the consumed time in a shift snapshot.
///
/// Every task gets a resolution, including those whose status did not
/// change, because remaining time moves with every ingestion batch.
pub fn resolve_tasks(tasks: &[Task], shifts: &[Shift]) -> TaskBatchResolution {
    let consumed = aggregate_by_task(shifts);

    let resolutions: Vec<TaskResolution> = tasks
        .iter()
        .enumerate()
        .map(|(index, task)| {
            let resolution =
                resolve_task_status(task, consumed.consumed(&task.id), index as u32 + 1);
            if resolution.status_changed() {
                debug!(
                    task_id = %task.id,
                    from = %resolution.previous_status,
                    to = %resolution.status,
                    "Task status changed"
                );
            }
            resolution
        })
        .collect();

    TaskBatchResolution {
        resolutions,
        warnings: consumed.warnings,
    }
}

/// Marks a task completed on behalf of an operator.
///
/// # Errors
///
/// Returns [`EngineError::IllegalTransition`] if the task is already
/// completed or overtime; the task is left unchanged.
pub fn mark_task_completed(task: &Task) -> EngineResult<Task> {
    if task.status.is_terminal() {
        warn!(task_id = %task.id, status = %task.status, "Rejected completion of terminal task");
        return Err(EngineError::IllegalTransition {
            task_id: task.id.clone(),
            status: task.status,
        });
    }

    Ok(Task {
        status: TaskStatus::Completed,
        ..task.clone()
    })
}
