//! Monthly worked-time aggregate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Worked seconds for one employee in one calendar month.
///
/// This is a cache derived from shift data. It is never authoritative and
/// can always be rebuilt with
/// [`build_month_record`](crate::calculation::build_month_record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// The employee the record belongs to.
    pub employee_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-based.
    pub month: u32,
    /// Sum of worked seconds across the employee's shifts starting in the month.
    pub total_worked_seconds: i64,
    /// Expected working hours for the month; the overtime threshold.
    pub monthly_baseline_hours: Decimal,
}
