//! Inclusive calendar date ranges.
//!
//! This module contains the [`DateRange`] type used by store filters to
//! select shifts by the UTC calendar date of their start instant.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar dates.
///
/// # Example
///
/// ```
/// use payroll_engine::models::DateRange;
/// use chrono::NaiveDate;
///
/// let march = DateRange::for_month(2026, 3).unwrap();
/// assert_eq!(march.start_date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
/// assert_eq!(march.end_date, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
/// assert!(march.contains_date(NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// The first date in the range (inclusive).
    pub start_date: NaiveDate,
    /// The last date in the range (inclusive).
    pub end_date: NaiveDate,
}

impl DateRange {
    /// A range covering exactly one date.
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start_date: date,
            end_date: date,
        }
    }

    /// A range covering a whole calendar month.
    ///
    /// Returns `None` if `month` is not in 1..=12 or the year is out of range.
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let start_date = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end_date = start_date.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self {
            start_date,
            end_date,
        })
    }

    /// Checks if a given date falls within this range, inclusive of both ends.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns the (year, month) of the range start.
    pub fn start_month(&self) -> (i32, u32) {
        (self.start_date.year(), self.start_date.month())
    }
}
