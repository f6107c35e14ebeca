//! Task model and status state machine states.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The lifecycle status of a task.
///
/// `Completed` and `Overtime` are terminal: automatic aggregation never moves
/// a task out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// No time has been booked against the task.
    NotStarted,
    /// Time has been booked and the allocation is not exhausted.
    InProgress,
    /// An operator marked the task done.
    Completed,
    /// Booked time exceeded the allocation.
    Overtime,
}

impl TaskStatus {
    /// Returns true for statuses that aggregation must never overwrite.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Overtime)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::NotStarted => "not started",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overtime => "overtime",
        };
        f.write_str(label)
    }
}

/// A unit of work with an hour allocation, assigned to one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for the task.
    pub id: String,
    /// The assignee.
    pub employee_id: String,
    /// Hours budgeted for the task.
    pub total_allocated_hours: Decimal,
    /// Cached status, regenerated from shift data.
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    /// Cached remaining time in seconds; negative once over budget.
    #[serde(default)]
    pub remaining_time_seconds: i64,
}

fn default_status() -> TaskStatus {
    TaskStatus::NotStarted
}

/// The cached task fields pushed back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusUpdate {
    /// The resolved status.
    pub status: TaskStatus,
    /// The resolved remaining time in seconds.
    pub remaining_time_seconds: i64,
}
