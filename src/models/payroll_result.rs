//! Payroll result models for the payroll engine.
//!
//! This module contains the [`PayrollResult`] produced by the payroll
//! calculator, the [`PayrollStatement`] that is persisted per employee and
//! month, and the audit types recording how each figure was reached.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AdjustmentSummary, MonthRecord};
use crate::error::DataQualityIssue;

/// The statutory payroll figures for one employee and month.
///
/// A result is always computed whole; a new computation replaces the
/// previous one rather than patching it.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayrollResult;
/// use rust_decimal::Decimal;
///
/// let result = PayrollResult {
///     payroll_salary: Decimal::new(20700, 0),
///     overtime_salary: Decimal::ZERO,
///     overtime_hours: Decimal::ZERO,
///     total_hours: Decimal::new(150, 0),
///     monthly_work_hours: Decimal::new(200, 0),
///     employee_epf_deduction: Decimal::new(1800, 0),
///     company_epf_contribution: Decimal::new(2700, 0),
///     company_etf_contribution: Decimal::new(675, 0),
///     total_monthly_salary: Decimal::new(20700, 0),
///     total_cost_to_company: Decimal::new(24075, 0),
/// };
/// assert_eq!(result.total_deductions(), Decimal::new(1800, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    /// Base pay actually disbursed, after the employee EPF deduction.
    pub payroll_salary: Decimal,
    /// Pay for hours beyond the monthly baseline.
    pub overtime_salary: Decimal,
    /// Whole hours beyond the monthly baseline.
    pub overtime_hours: Decimal,
    /// Worked hours, rounded to whole hours.
    pub total_hours: Decimal,
    /// The monthly baseline hours the figures were computed against.
    pub monthly_work_hours: Decimal,
    /// Employee EPF deduction.
    pub employee_epf_deduction: Decimal,
    /// Employer EPF contribution.
    pub company_epf_contribution: Decimal,
    /// Employer ETF contribution.
    pub company_etf_contribution: Decimal,
    /// Payable salary before ledger adjustments.
    pub total_monthly_salary: Decimal,
    /// Salary plus employer contributions.
    pub total_cost_to_company: Decimal,
}

impl PayrollResult {
    /// Returns the total withheld from the employee.
    pub fn total_deductions(&self) -> Decimal {
        self.employee_epf_deduction
    }

    /// Returns the total employer statutory contributions.
    pub fn total_contributions(&self) -> Decimal {
        self.company_epf_contribution + self.company_etf_contribution
    }
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings flag input data that was clamped or skipped; they never stop
/// a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Builds a warning for a data-quality issue found on `subject`
    /// (e.g. "shift 'shift_001'").
    pub fn from_issue(subject: &str, issue: &DataQualityIssue) -> Self {
        Self {
            code: issue.code().to_string(),
            message: format!("{}: {}", subject, issue),
            severity: issue.severity().to_string(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The full monthly payroll outcome for one employee, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollStatement {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The ID of the employee the statement is for.
    pub employee_id: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-based.
    pub month: u32,
    /// The month aggregate the payroll was computed from.
    pub month_record: MonthRecord,
    /// The statutory payroll figures.
    pub result: PayrollResult,
    /// Ledger adjustments folded into the payable total.
    pub adjustments: AdjustmentSummary,
    /// The amount payable to the employee.
    pub final_total: Decimal,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
