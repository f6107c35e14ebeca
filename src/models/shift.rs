//! Shift model and raw timestamp representation.
//!
//! Shift records arrive from an external time-tracking system whose
//! timestamps come in several shapes. [`RawTimestamp`] captures all of them
//! so that a single record with a bad timestamp never fails deserialization
//! of a whole batch.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculation::{checked_duration_seconds, to_instant};
use crate::error::DataQualityIssue;

/// A timestamp as received from the time-tracking source.
///
/// Deserialization is untagged and tried in declaration order, so an
/// RFC 3339 string becomes [`RawTimestamp::Instant`] while any other string
/// is kept verbatim as [`RawTimestamp::Text`] and parsed leniently later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// An already-canonical UTC instant.
    Instant(DateTime<Utc>),
    /// An epoch seconds/nanoseconds pair.
    Epoch {
        /// Whole seconds since the Unix epoch.
        seconds: i64,
        /// Sub-second nanoseconds.
        #[serde(default)]
        nanoseconds: u32,
    },
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// Any other textual form (ISO date-time without offset, bare date, garbage).
    Text(String),
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        RawTimestamp::Instant(value)
    }
}

impl From<NaiveDateTime> for RawTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        RawTimestamp::Instant(value.and_utc())
    }
}

impl From<&str> for RawTimestamp {
    fn from(value: &str) -> Self {
        RawTimestamp::Text(value.to_string())
    }
}

/// One recorded continuous work interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: String,
    /// The employee who worked the shift.
    pub employee_id: String,
    /// The task the time was booked against, if any.
    #[serde(default)]
    pub task_id: Option<String>,
    /// When the shift started.
    #[serde(default)]
    pub start: Option<RawTimestamp>,
    /// When the shift ended. Absent while the shift is still open.
    #[serde(default)]
    pub end: Option<RawTimestamp>,
    /// A duration computed by the source system, which may encode corrections.
    #[serde(default)]
    pub total_spent_seconds: Option<i64>,
    /// Free-form work location.
    #[serde(default)]
    pub location: Option<String>,
}

impl Shift {
    /// Returns the canonical start instant, if present and parseable.
    pub fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.start.as_ref().and_then(to_instant)
    }

    /// Returns the canonical end instant, if present and parseable.
    pub fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.end.as_ref().and_then(to_instant)
    }

    /// Returns the seconds this shift contributes to aggregates.
    ///
    /// A precomputed `total_spent_seconds` wins over the instants. Otherwise
    /// the duration is derived from start and end.
    ///
    /// # Errors
    ///
    /// Returns the [`DataQualityIssue`] that made the shift unusable. Callers
    /// treat it as zero seconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Shift;
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
    /// assert_eq!(shift.worked_seconds(), Ok(8 * 3600));
    /// ```
    pub fn worked_seconds(&self) -> Result<i64, DataQualityIssue> {
        if let Some(seconds) = self.total_spent_seconds {
            if seconds < 0 {
                return Err(DataQualityIssue::NegativePrecomputed { seconds });
            }
            return Ok(seconds);
        }

        let start = instant_or_issue(self.start.as_ref(), DataQualityIssue::MissingStart)?;
        let end = instant_or_issue(self.end.as_ref(), DataQualityIssue::MissingEnd)?;
        checked_duration_seconds(Some(start), Some(end))
    }
}

fn instant_or_issue(
    raw: Option<&RawTimestamp>,
    missing: DataQualityIssue,
) -> Result<DateTime<Utc>, DataQualityIssue> {
    let raw = raw.ok_or(missing)?;
    to_instant(raw).ok_or_else(|| DataQualityIssue::UnparseableTimestamp {
        raw: format!("{:?}", raw),
    })
}
