//! Timestamp normalisation and interval arithmetic.
//!
//! Every instant the engine works with is a `DateTime<Utc>`. This module turns
//! the raw shapes found in shift records into that canonical form and computes
//! non-negative whole-second durations between them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use tracing::warn;

use crate::error::DataQualityIssue;
use crate::models::RawTimestamp;

/// Offset-less date-time layouts accepted for textual timestamps, read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Converts a raw timestamp into a canonical UTC instant.
///
/// Returns `None` for anything that cannot be interpreted; this function
/// never panics.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::to_instant;
/// use payroll_engine::models::RawTimestamp;
/// use chrono::{TimeZone, Utc};
///
/// let expected = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
///
/// let epoch = RawTimestamp::Epoch { seconds: 1_768_467_600, nanoseconds: 0 };
/// assert_eq!(to_instant(&epoch), Some(expected));
///
/// let text = RawTimestamp::Text("2026-01-15 09:00:00".to_string());
/// assert_eq!(to_instant(&text), Some(expected));
///
/// let garbage = RawTimestamp::Text("soon".to_string());
/// assert_eq!(to_instant(&garbage), None);
/// ```
pub fn to_instant(raw: &RawTimestamp) -> Option<DateTime<Utc>> {
    match raw {
        RawTimestamp::Instant(instant) => Some(*instant),
        RawTimestamp::Epoch {
            seconds,
            nanoseconds,
        } => DateTime::from_timestamp(*seconds, *nanoseconds),
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(*millis),
        RawTimestamp::Text(text) => parse_text(text.trim()),
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Computes the whole seconds between two instants, rounding partial seconds up.
///
/// # Errors
///
/// Returns a [`DataQualityIssue`] when either instant is missing or when
/// `end` precedes `start`.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::checked_duration_seconds;
/// use payroll_engine::error::DataQualityIssue;
/// use chrono::{Duration, TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
/// let end = start + Duration::milliseconds(1_500);
///
/// assert_eq!(checked_duration_seconds(Some(start), Some(end)), Ok(2));
/// assert_eq!(
///     checked_duration_seconds(Some(end), Some(start)),
///     Err(DataQualityIssue::NegativeInterval { seconds: 1 })
/// );
/// ```
pub fn checked_duration_seconds(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<i64, DataQualityIssue> {
    let start = start.ok_or(DataQualityIssue::MissingStart)?;
    let end = end.ok_or(DataQualityIssue::MissingEnd)?;

    let delta = end - start;
    if delta < TimeDelta::zero() {
        return Err(DataQualityIssue::NegativeInterval {
            seconds: (start - end).num_seconds(),
        });
    }

    let whole = delta.num_seconds();
    if delta.subsec_nanos() > 0 {
        Ok(whole + 1)
    } else {
        Ok(whole)
    }
}

/// Computes `max(0, ceil(end - start))` in seconds.
///
/// Missing or negative intervals yield zero and are logged as data-quality
/// events rather than failing.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::duration_seconds;
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2026, 1, 15, 17, 0, 0).unwrap();
///
/// assert_eq!(duration_seconds(Some(start), Some(end)), 28_800);
/// assert_eq!(duration_seconds(Some(end), Some(start)), 0);
/// assert_eq!(duration_seconds(None, Some(end)), 0);
/// ```
pub fn duration_seconds(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> i64 {
    match checked_duration_seconds(start, end) {
        Ok(seconds) => seconds,
        Err(issue) => {
            warn!(code = issue.code(), issue = %issue, "Interval clamped to zero");
            0
        }
    }
}
