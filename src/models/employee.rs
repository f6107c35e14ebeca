//! Employee pay profile.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The pay parameters of one employee, supplied by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePayProfile {
    /// Unique identifier for the employee.
    pub employee_id: String,
    /// Full monthly salary for meeting the baseline hours.
    pub basic_salary: Decimal,
    /// Rate paid per overtime hour. Salaried-only employees have none.
    #[serde(default)]
    pub overtime_hourly_rate: Option<Decimal>,
    /// Whether EPF/ETF deductions and contributions apply.
    #[serde(default)]
    pub epf_etf_enrolled: bool,
}

impl EmployeePayProfile {
    /// Returns the overtime rate, treating a missing rate as zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::EmployeePayProfile;
    /// use rust_decimal::Decimal;
    ///
    /// let profile = EmployeePayProfile {
    ///     employee_id: "emp_001".to_string(),
    ///     basic_salary: Decimal::new(30000, 0),
    ///     overtime_hourly_rate: None,
    ///     epf_etf_enrolled: true,
    /// };
    /// assert_eq!(profile.effective_overtime_rate(), Decimal::ZERO);
    /// ```
    pub fn effective_overtime_rate(&self) -> Decimal {
        self.overtime_hourly_rate.unwrap_or(Decimal::ZERO)
    }
}
