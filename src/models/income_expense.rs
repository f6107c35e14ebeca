//! Ad-hoc income and expense ledger entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a ledger entry adds to or subtracts from the payable total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// A bonus or other addition.
    Income,
    /// A deduction.
    Expense,
}

/// A single administrator-maintained adjustment for an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeExpenseEntry {
    /// Unique identifier for the entry.
    pub id: String,
    /// The employee the entry applies to.
    pub employee_id: String,
    /// Income or expense.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// The amount, never negative.
    pub amount: Decimal,
    /// Free-form description.
    #[serde(default)]
    pub note: String,
    /// When the entry was recorded; determines the payroll month it belongs to.
    pub created_at: DateTime<Utc>,
}

/// The outcome of folding ledger entries into a payroll total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSummary {
    /// The payroll total before adjustments.
    pub base_total: Decimal,
    /// Sum of all income entries.
    pub income_total: Decimal,
    /// Sum of all expense entries.
    pub expense_total: Decimal,
    /// `base_total + income_total - expense_total`.
    pub final_total: Decimal,
    /// How many entries were folded in.
    pub entries_applied: usize,
}
