//! Income and expense adjustments.
//!
//! Folds an employee's ledger entries for a month into the payroll total.
//! The summary is re-derived from the full entry list on every call, so
//! adding or removing an entry never requires patching a stored total.

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::DataQualityIssue;
use crate::models::{AdjustmentSummary, AuditStep, AuditWarning, EntryType, IncomeExpenseEntry};

/// The result of applying ledger adjustments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjustmentResult {
    /// The adjusted totals.
    pub summary: AdjustmentSummary,
    /// Entries that were skipped.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording the adjustment.
    pub audit_step: AuditStep,
}

/// Applies income and expense entries to a base total.
///
/// `final_total = base_total + sum(income) - sum(expense)`. Entries with a
/// negative amount are skipped and reported as warnings.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::apply_adjustments;
/// use payroll_engine::models::{EntryType, IncomeExpenseEntry};
/// use chrono::Utc;
/// use rust_decimal::Decimal;
///
/// let entry = |id: &str, entry_type, amount| IncomeExpenseEntry {
///     id: id.to_string(),
///     employee_id: "emp_001".to_string(),
///     entry_type,
///     amount: Decimal::new(amount, 0),
///     note: String::new(),
///     created_at: Utc::now(),
/// };
/// let entries = vec![
///     entry("ie_001", EntryType::Income, 500),
///     entry("ie_002", EntryType::Expense, 200),
/// ];
///
/// let result = apply_adjustments(&entries, Decimal::new(20700, 0), 1);
/// assert_eq!(result.summary.final_total, Decimal::new(21000, 0));
/// ```
pub fn apply_adjustments(
    entries: &[IncomeExpenseEntry],
    base_total: Decimal,
    step_number: u32,
) -> AdjustmentResult {
    let mut income_total = Decimal::ZERO;
    let mut expense_total = Decimal::ZERO;
    let mut entries_applied = 0;
    let mut warnings = Vec::new();

    for entry in entries {
        if entry.amount < Decimal::ZERO {
            let issue = DataQualityIssue::NegativeAmount {
                amount: entry.amount,
            };
            warn!(
                entry_id = %entry.id,
                employee_id = %entry.employee_id,
                amount = %entry.amount,
                "Skipped ledger entry with negative amount"
            );
            warnings.push(AuditWarning::from_issue(
                &format!("ledger entry '{}'", entry.id),
                &issue,
            ));
            continue;
        }

        match entry.entry_type {
            EntryType::Income => income_total += entry.amount,
            EntryType::Expense => expense_total += entry.amount,
        }
        entries_applied += 1;
    }

    let final_total = base_total + income_total - expense_total;

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_expense_adjustment".to_string(),
        rule_name: "Income/Expense Adjustment".to_string(),
        input: serde_json::json!({
            "base_total": base_total.to_string(),
            "entry_count": entries.len()
        }),
        output: serde_json::json!({
            "income_total": income_total.to_string(),
            "expense_total": expense_total.to_string(),
            "final_total": final_total.to_string(),
            "entries_applied": entries_applied
        }),
        reasoning: format!(
            "{} + income {} - expenses {} = {}",
            base_total, income_total, expense_total, final_total
        ),
    };

    AdjustmentResult {
        summary: AdjustmentSummary {
            base_total,
            income_total,
            expense_total,
            final_total,
            entries_applied,
        },
        warnings,
        audit_step,
    }
}
