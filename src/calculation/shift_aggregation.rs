//! Shift aggregation by employee, task and calendar period.
//!
//! Aggregation is a pure fold over a snapshot of shift records: running it
//! twice over the same shifts yields the same totals. Shifts are attributed
//! entirely to the period containing their start instant's UTC date, even
//! when they run across a period boundary.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DataQualityIssue;
use crate::models::{AuditWarning, DateRange, MonthRecord, Shift};

/// The calendar granularity to bucket shifts by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// One bucket per UTC calendar day.
    Day,
    /// One bucket per calendar month.
    Month,
    /// One bucket per calendar year.
    Year,
}

/// A single calendar bucket at some granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodBucket {
    /// A calendar day.
    Day(NaiveDate),
    /// A calendar month.
    Month {
        /// Calendar year.
        year: i32,
        /// Calendar month, 1-based.
        month: u32,
    },
    /// A calendar year.
    Year(i32),
}

impl Period {
    /// Returns the bucket an instant falls into, using its UTC calendar date.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::calculation::{Period, PeriodBucket};
    /// use chrono::{TimeZone, Utc};
    ///
    /// let instant = Utc.with_ymd_and_hms(2026, 3, 31, 23, 30, 0).unwrap();
    /// assert_eq!(
    ///     Period::Month.bucket_for(instant),
    ///     PeriodBucket::Month { year: 2026, month: 3 }
    /// );
    /// ```
    pub fn bucket_for(self, instant: DateTime<Utc>) -> PeriodBucket {
        let date = instant.date_naive();
        match self {
            Period::Day => PeriodBucket::Day(date),
            Period::Month => PeriodBucket::Month {
                year: date.year(),
                month: date.month(),
            },
            Period::Year => PeriodBucket::Year(date.year()),
        }
    }
}

/// Aggregation key: one employee in one calendar bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey {
    /// The employee the seconds belong to.
    pub employee_id: String,
    /// The calendar bucket.
    pub bucket: PeriodBucket,
}

/// How to group shifts in [`aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBy {
    /// Restrict aggregation to one employee. `None` aggregates everyone.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// The calendar granularity.
    pub period: Period,
}

impl GroupBy {
    /// Groups every employee's shifts at the given granularity.
    pub fn all(period: Period) -> Self {
        Self {
            employee_id: None,
            period,
        }
    }

    /// Groups one employee's shifts at the given granularity.
    pub fn employee(employee_id: impl Into<String>, period: Period) -> Self {
        Self {
            employee_id: Some(employee_id.into()),
            period,
        }
    }
}

/// The totals produced by [`aggregate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    /// Worked seconds per employee and bucket.
    pub totals: BTreeMap<PeriodKey, i64>,
    /// Data-quality warnings raised while folding.
    pub warnings: Vec<AuditWarning>,
    /// Number of shifts that were attributed to a bucket.
    pub shifts_counted: usize,
}

impl Aggregation {
    /// Returns the seconds recorded for one employee in one bucket.
    pub fn total_for(&self, employee_id: &str, bucket: PeriodBucket) -> i64 {
        self.totals
            .get(&PeriodKey {
                employee_id: employee_id.to_string(),
                bucket,
            })
            .copied()
            .unwrap_or(0)
    }

    /// Returns the seconds recorded for one employee across all buckets.
    pub fn employee_total(&self, employee_id: &str) -> i64 {
        self.totals
            .iter()
            .filter(|(key, _)| key.employee_id == employee_id)
            .fold(0i64, |sum, (_, seconds)| sum.saturating_add(*seconds))
    }
}

/// Per-task consumed seconds produced by [`aggregate_by_task`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskAggregation {
    /// Worked seconds per task id.
    pub totals: BTreeMap<String, i64>,
    /// Data-quality warnings raised while folding.
    pub warnings: Vec<AuditWarning>,
}

impl TaskAggregation {
    /// Returns the seconds consumed by a task, zero if it has no shifts.
    pub fn consumed(&self, task_id: &str) -> i64 {
        self.totals.get(task_id).copied().unwrap_or(0)
    }
}

/// Sums worked seconds per employee and calendar bucket.
///
/// A precomputed `total_spent_seconds` on a shift is preferred over its
/// instants. Shifts with an unusable interval still register their bucket
/// with zero seconds. Shifts without a usable start instant cannot be
/// bucketed and are skipped. Both cases are reported as warnings. Totals
/// saturate at `i64::MAX`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{aggregate, GroupBy, Period, PeriodBucket};
/// use payroll_engine::models::Shift;
/// use chrono::NaiveDate;
///
/// let shift = Shift {
///     id: "shift_001".to_string(),
///     employee_id: "emp_001".to_string(),
///     task_id: None,
///     start: Some("2026-01-15T09:00:00Z".into()),
///     end: Some("2026-01-15T17:00:00Z".into()),
///     total_spent_seconds: None,
///     location: None,
/// };
///
/// let aggregation = aggregate(&[shift], &GroupBy::all(Period::Day));
/// let day = PeriodBucket::Day(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
/// assert_eq!(aggregation.total_for("emp_001", day), 28_800);
/// ```
pub fn aggregate(shifts: &[Shift], group_by: &GroupBy) -> Aggregation {
    let mut aggregation = Aggregation::default();

    for shift in shifts {
        if let Some(employee_id) = &group_by.employee_id {
            if &shift.employee_id != employee_id {
                continue;
            }
        }

        let Some(start) = shift.start_instant() else {
            let issue = match &shift.start {
                None => DataQualityIssue::MissingStart,
                Some(raw) => DataQualityIssue::UnparseableTimestamp {
                    raw: format!("{:?}", raw),
                },
            };
            aggregation.warnings.push(report(shift, &issue));
            continue;
        };

        let seconds = match shift.worked_seconds() {
            Ok(seconds) => seconds,
            Err(issue) => {
                aggregation.warnings.push(report(shift, &issue));
                0
            }
        };

        let key = PeriodKey {
            employee_id: shift.employee_id.clone(),
            bucket: group_by.period.bucket_for(start),
        };
        let total = aggregation.totals.entry(key).or_insert(0);
        *total = total.saturating_add(seconds);
        aggregation.shifts_counted += 1;
    }

    aggregation
}

/// Sums worked seconds per task across all shifts that reference a task.
///
/// Task totals are not bucketed by period, so a missing start instant does
/// not matter here as long as a duration can be derived.
pub fn aggregate_by_task(shifts: &[Shift]) -> TaskAggregation {
    let mut aggregation = TaskAggregation::default();

    for shift in shifts {
        let Some(task_id) = &shift.task_id else {
            continue;
        };

        let seconds = match shift.worked_seconds() {
            Ok(seconds) => seconds,
            Err(issue) => {
                aggregation.warnings.push(report(shift, &issue));
                0
            }
        };

        let total = aggregation.totals.entry(task_id.clone()).or_insert(0);
        *total = total.saturating_add(seconds);
    }

    aggregation
}

/// A month record together with the warnings raised while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthRecordResult {
    /// The regenerated month record.
    pub record: MonthRecord,
    /// Data-quality warnings from the underlying aggregation.
    pub warnings: Vec<AuditWarning>,
}

/// Regenerates an employee's month record from raw shifts.
///
/// Shifts belonging to other employees or starting outside the month are
/// ignored, so callers may pass a wider snapshot. Only shifts inside the
/// month contribute warnings.
pub fn build_month_record(
    employee_id: &str,
    year: i32,
    month: u32,
    shifts: &[Shift],
    monthly_baseline_hours: Decimal,
) -> MonthRecordResult {
    let in_month: Vec<Shift> = match DateRange::for_month(year, month) {
        Some(range) => shifts
            .iter()
            .filter(|shift| {
                shift.employee_id == employee_id
                    && shift
                        .start_instant()
                        .is_some_and(|start| range.contains_date(start.date_naive()))
            })
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    let aggregation = aggregate(&in_month, &GroupBy::employee(employee_id, Period::Month));
    let total_worked_seconds =
        aggregation.total_for(employee_id, PeriodBucket::Month { year, month });

    MonthRecordResult {
        record: MonthRecord {
            employee_id: employee_id.to_string(),
            year,
            month,
            total_worked_seconds,
            monthly_baseline_hours,
        },
        warnings: aggregation.warnings,
    }
}

fn report(shift: &Shift, issue: &DataQualityIssue) -> AuditWarning {
    warn!(
        shift_id = %shift.id,
        employee_id = %shift.employee_id,
        code = issue.code(),
        issue = %issue,
        "Shift contributes zero seconds"
    );
    AuditWarning::from_issue(&format!("shift '{}'", shift.id), issue)
}
