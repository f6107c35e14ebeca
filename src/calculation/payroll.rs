//! Monthly payroll calculation.
//!
//! Turns a [`MonthRecord`] and an [`EmployeePayProfile`] into a
//! [`PayrollResult`]. Every monetary intermediate is rounded to a whole unit
//! with ties away from zero, and each step is recorded as an [`AuditStep`].
//!
//! Proration rounds twice: first the work percentage, then the prorated
//! salary. A month of 150 hours against a 200 hour baseline pays exactly
//! 75% of the basic salary.

use rust_decimal::Decimal;
use tracing::debug;

use crate::config::StatutoryRates;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, EmployeePayProfile, MonthRecord, PayrollResult};

use super::rounding::round_half_away;

const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);
const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A payroll result together with the audit steps that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollCalculation {
    /// The computed figures.
    pub result: PayrollResult,
    /// One step per calculation stage, numbered from the given start.
    pub audit_steps: Vec<AuditStep>,
}

/// Computes payroll with the default statutory rates.
///
/// # Errors
///
/// See [`calculate_payroll`].
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute_payroll;
/// use payroll_engine::models::{EmployeePayProfile, MonthRecord};
/// use rust_decimal::Decimal;
///
/// let profile = EmployeePayProfile {
///     employee_id: "emp_001".to_string(),
///     basic_salary: Decimal::new(30000, 0),
///     overtime_hourly_rate: None,
///     epf_etf_enrolled: true,
/// };
/// let record = MonthRecord {
///     employee_id: "emp_001".to_string(),
///     year: 2026,
///     month: 3,
///     total_worked_seconds: 150 * 3600,
///     monthly_baseline_hours: Decimal::new(200, 0),
/// };
///
/// let result = compute_payroll(&profile, &record).unwrap();
/// assert_eq!(result.payroll_salary, Decimal::new(20700, 0));
/// assert_eq!(result.employee_epf_deduction, Decimal::new(1800, 0));
/// ```
pub fn compute_payroll(
    profile: &EmployeePayProfile,
    record: &MonthRecord,
) -> EngineResult<PayrollResult> {
    calculate_payroll(profile, record, &StatutoryRates::default(), 1).map(|calc| calc.result)
}

/// Computes the payroll figures for one employee and month.
///
/// # Errors
///
/// - [`EngineError::InvalidBaseline`] if the record's baseline hours are not
///   positive
/// - [`EngineError::InvalidConfiguration`] if the profile and the record name
///   different employees, or if an amount overflows the decimal range
pub fn calculate_payroll(
    profile: &EmployeePayProfile,
    record: &MonthRecord,
    rates: &StatutoryRates,
    step_number: u32,
) -> EngineResult<PayrollCalculation> {
    if profile.employee_id != record.employee_id {
        return Err(EngineError::InvalidConfiguration {
            field: "employee_id".to_string(),
            message: format!(
                "pay profile is for '{}' but month record is for '{}'",
                profile.employee_id, record.employee_id
            ),
        });
    }

    let baseline = record.monthly_baseline_hours;
    if baseline <= Decimal::ZERO {
        return Err(EngineError::InvalidBaseline {
            employee_id: record.employee_id.clone(),
            year: record.year,
            month: record.month,
            baseline,
        });
    }

    let mut audit_steps = Vec::with_capacity(6);
    let mut step = step_number;
    let mut next_step = || {
        let current = step;
        step += 1;
        current
    };

    // Total hours
    let worked_seconds = record.total_worked_seconds.max(0);
    let total_hours = round_half_away(Decimal::from(worked_seconds) / SECONDS_PER_HOUR);
    audit_steps.push(AuditStep {
        step_number: next_step(),
        rule_id: "total_hours".to_string(),
        rule_name: "Total Hours".to_string(),
        input: serde_json::json!({
            "total_worked_seconds": record.total_worked_seconds
        }),
        output: serde_json::json!({
            "total_hours": total_hours.to_string()
        }),
        reasoning: if record.total_worked_seconds < 0 {
            format!(
                "Negative worked seconds {} clamped to 0",
                record.total_worked_seconds
            )
        } else {
            format!("{} seconds rounds to {} hours", worked_seconds, total_hours)
        },
    });

    // Overtime hours
    let overtime_hours = checked(total_hours.checked_sub(baseline), "overtime_hours")?
        .max(Decimal::ZERO);
    audit_steps.push(AuditStep {
        step_number: next_step(),
        rule_id: "overtime_hours".to_string(),
        rule_name: "Overtime Hours".to_string(),
        input: serde_json::json!({
            "total_hours": total_hours.to_string(),
            "monthly_baseline_hours": baseline.to_string()
        }),
        output: serde_json::json!({
            "overtime_hours": overtime_hours.to_string()
        }),
        reasoning: format!(
            "{} hours worked against a {} hour baseline",
            total_hours, baseline
        ),
    });

    // Base pay
    let (gross_salary, work_percentage) = if total_hours >= baseline {
        (round_half_away(profile.basic_salary), None)
    } else {
        let ratio = checked(total_hours.checked_div(baseline), "work_percentage")?;
        let percentage =
            round_half_away(checked(ratio.checked_mul(ONE_HUNDRED), "work_percentage")?);
        let prorated = checked(profile.basic_salary.checked_mul(percentage), "basic_salary")?;
        (round_half_away(prorated / ONE_HUNDRED), Some(percentage))
    };
    audit_steps.push(AuditStep {
        step_number: next_step(),
        rule_id: "base_pay".to_string(),
        rule_name: "Base Pay".to_string(),
        input: serde_json::json!({
            "basic_salary": profile.basic_salary.to_string(),
            "total_hours": total_hours.to_string(),
            "monthly_baseline_hours": baseline.to_string()
        }),
        output: serde_json::json!({
            "work_percentage": work_percentage.map(|p| p.to_string()),
            "payroll_salary": gross_salary.to_string()
        }),
        reasoning: match work_percentage {
            Some(percentage) => format!(
                "Baseline not met; {}% of basic salary {} is {}",
                percentage, profile.basic_salary, gross_salary
            ),
            None => format!("Baseline met; full basic salary {}", gross_salary),
        },
    });

    // Overtime pay
    let overtime_rate = profile.effective_overtime_rate();
    let overtime_salary = round_half_away(checked(
        overtime_hours.checked_mul(overtime_rate),
        "overtime_hourly_rate",
    )?);
    audit_steps.push(AuditStep {
        step_number: next_step(),
        rule_id: "overtime_pay".to_string(),
        rule_name: "Overtime Pay".to_string(),
        input: serde_json::json!({
            "overtime_hours": overtime_hours.to_string(),
            "overtime_hourly_rate": profile.overtime_hourly_rate.map(|r| r.to_string())
        }),
        output: serde_json::json!({
            "overtime_salary": overtime_salary.to_string()
        }),
        reasoning: if profile.overtime_hourly_rate.is_none() {
            "No overtime rate on the pay profile; overtime paid at 0".to_string()
        } else {
            format!(
                "{} overtime hours x {} = {}",
                overtime_hours, overtime_rate, overtime_salary
            )
        },
    });

    // EPF/ETF
    let (employee_epf, employer_epf, employer_etf) = if profile.epf_etf_enrolled {
        (
            contribution(gross_salary, rates.employee_epf, "employee_epf")?,
            contribution(gross_salary, rates.employer_epf, "employer_epf")?,
            contribution(gross_salary, rates.employer_etf, "employer_etf")?,
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)
    };
    let payroll_salary = checked(gross_salary.checked_sub(employee_epf), "payroll_salary")?;
    audit_steps.push(AuditStep {
        step_number: next_step(),
        rule_id: "epf_etf".to_string(),
        rule_name: "EPF/ETF Contributions".to_string(),
        input: serde_json::json!({
            "payroll_salary": gross_salary.to_string(),
            "epf_etf_enrolled": profile.epf_etf_enrolled,
            "employee_epf_rate": rates.employee_epf.to_string(),
            "employer_epf_rate": rates.employer_epf.to_string(),
            "employer_etf_rate": rates.employer_etf.to_string()
        }),
        output: serde_json::json!({
            "employee_epf_deduction": employee_epf.to_string(),
            "company_epf_contribution": employer_epf.to_string(),
            "company_etf_contribution": employer_etf.to_string(),
            "payroll_salary": payroll_salary.to_string()
        }),
        reasoning: if profile.epf_etf_enrolled {
            format!(
                "Enrolled; employee EPF {} deducted from {} leaves {}",
                employee_epf, gross_salary, payroll_salary
            )
        } else {
            "Not enrolled in EPF/ETF; no deductions or contributions".to_string()
        },
    });

    // Totals
    let employer_total = checked(employer_epf.checked_add(employer_etf), "contributions")?;
    let total_monthly_salary = round_half_away(checked(
        payroll_salary.checked_add(overtime_salary),
        "total_monthly_salary",
    )?);
    let total_cost_to_company = round_half_away(checked(
        total_monthly_salary.checked_add(employer_total),
        "total_cost_to_company",
    )?);
    audit_steps.push(AuditStep {
        step_number: next_step(),
        rule_id: "totals".to_string(),
        rule_name: "Salary Totals".to_string(),
        input: serde_json::json!({
            "payroll_salary": payroll_salary.to_string(),
            "overtime_salary": overtime_salary.to_string(),
            "company_epf_contribution": employer_epf.to_string(),
            "company_etf_contribution": employer_etf.to_string()
        }),
        output: serde_json::json!({
            "total_monthly_salary": total_monthly_salary.to_string(),
            "total_cost_to_company": total_cost_to_company.to_string()
        }),
        reasoning: format!(
            "Salary {} plus employer contributions {} costs the company {}",
            total_monthly_salary, employer_total, total_cost_to_company
        ),
    });

    debug!(
        employee_id = %record.employee_id,
        year = record.year,
        month = record.month,
        total_hours = %total_hours,
        total_monthly_salary = %total_monthly_salary,
        "Payroll computed"
    );

    Ok(PayrollCalculation {
        result: PayrollResult {
            payroll_salary,
            overtime_salary,
            overtime_hours,
            total_hours,
            monthly_work_hours: baseline,
            employee_epf_deduction: employee_epf,
            company_epf_contribution: employer_epf,
            company_etf_contribution: employer_etf,
            total_monthly_salary,
            total_cost_to_company,
        },
        audit_steps,
    })
}

fn contribution(gross_salary: Decimal, rate: Decimal, field: &str) -> EngineResult<Decimal> {
    checked(gross_salary.checked_mul(rate), field).map(round_half_away)
}

fn checked(value: Option<Decimal>, field: &str) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::InvalidConfiguration {
        field: field.to_string(),
        message: "amount exceeds the supported decimal range".to_string(),
    })
}
