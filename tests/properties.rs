//! Property tests for the pure calculators.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use payroll_engine::calculation::{
    GroupBy, Period, aggregate, aggregate_by_task, apply_adjustments, compute_payroll,
    resolve_task_status,
};
use payroll_engine::models::{
    EmployeePayProfile, EntryType, IncomeExpenseEntry, MonthRecord, Shift, Task, TaskStatus,
};

fn arb_shift() -> impl Strategy<Value = Shift> {
    (
        0usize..3,
        0usize..3,
        0i64..(31 * 24 * 3600),
        -4 * 3600i64..12 * 3600,
        proptest::option::of(0i64..36_000),
    )
        .prop_map(|(employee, task, offset, length, precomputed)| {
            let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap() + Duration::seconds(offset);
            Shift {
                id: format!("shift_{}_{}", offset, length),
                employee_id: format!("emp_{}", employee),
                task_id: Some(format!("task_{}", task)),
                start: Some(start.into()),
                end: Some((start + Duration::seconds(length)).into()),
                total_spent_seconds: precomputed,
                location: None,
            }
        })
}

fn arb_status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::NotStarted),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
        Just(TaskStatus::Overtime),
    ]
}

fn arb_period() -> impl Strategy<Value = Period> {
    prop_oneof![Just(Period::Day), Just(Period::Month), Just(Period::Year)]
}

proptest! {
    /// Aggregating the same snapshot twice gives the same totals.
    #[test]
    fn aggregate_is_idempotent(
        shifts in proptest::collection::vec(arb_shift(), 0..40),
        period in arb_period(),
    ) {
        let group_by = GroupBy::all(period);
        let first = aggregate(&shifts, &group_by);
        let second = aggregate(&shifts, &group_by);
        prop_assert_eq!(first, second);
    }

    /// Shift order does not affect totals.
    #[test]
    fn aggregate_ignores_order(shifts in proptest::collection::vec(arb_shift(), 0..40)) {
        let group_by = GroupBy::all(Period::Day);
        let mut reversed = shifts.clone();
        reversed.reverse();
        prop_assert_eq!(
            aggregate(&shifts, &group_by).totals,
            aggregate(&reversed, &group_by).totals
        );
    }

    /// Totals are never negative.
    #[test]
    fn aggregate_totals_non_negative(shifts in proptest::collection::vec(arb_shift(), 0..40)) {
        let aggregation = aggregate(&shifts, &GroupBy::all(Period::Month));
        prop_assert!(aggregation.totals.values().all(|seconds| *seconds >= 0));
    }

    /// Adding a shift never decreases a task's consumed time.
    #[test]
    fn consumed_is_monotonic(
        shifts in proptest::collection::vec(arb_shift(), 0..30),
        extra in arb_shift(),
    ) {
        let before = aggregate_by_task(&shifts);
        let mut more = shifts.clone();
        more.push(extra);
        let after = aggregate_by_task(&more);

        for task_id in before.totals.keys() {
            prop_assert!(after.consumed(task_id) >= before.consumed(task_id));
        }
    }

    /// Terminal statuses survive any amount of consumption.
    #[test]
    fn terminal_status_never_reverts(
        status in arb_status(),
        allocated in 0i64..200,
        consumed in proptest::collection::vec(0i64..100_000, 1..10),
    ) {
        let mut task = Task {
            id: "task_prop".to_string(),
            employee_id: "emp_prop".to_string(),
            total_allocated_hours: Decimal::from(allocated),
            status,
            remaining_time_seconds: 0,
        };

        let mut total = 0;
        for seconds in consumed {
            total += seconds;
            let was_terminal = task.status.is_terminal();
            let previous = task.status;
            let resolution = resolve_task_status(&task, total, 1);
            if was_terminal {
                prop_assert_eq!(resolution.status, previous);
            }
            prop_assert_eq!(resolution.remaining_time_seconds, allocated * 3600 - total);
            resolution.apply_to(&mut task);
        }
    }

    /// Cost to company is salary plus employer contributions.
    #[test]
    fn cost_to_company_identity(
        salary in 0i64..1_000_000,
        hours in 0i64..400,
        baseline in 1i64..300,
        rate in proptest::option::of(0i64..1_000),
        enrolled in any::<bool>(),
    ) {
        let profile = EmployeePayProfile {
            employee_id: "emp_prop".to_string(),
            basic_salary: Decimal::from(salary),
            overtime_hourly_rate: rate.map(Decimal::from),
            epf_etf_enrolled: enrolled,
        };
        let record = MonthRecord {
            employee_id: "emp_prop".to_string(),
            year: 2026,
            month: 3,
            total_worked_seconds: hours * 3600,
            monthly_baseline_hours: Decimal::from(baseline),
        };

        let result = compute_payroll(&profile, &record).unwrap();
        prop_assert_eq!(
            result.total_cost_to_company,
            result.total_monthly_salary + result.total_contributions()
        );
        prop_assert!(result.overtime_hours >= Decimal::ZERO);
        prop_assert!(result.payroll_salary <= Decimal::from(salary));
    }

    /// The final total is base plus income minus expenses.
    #[test]
    fn adjustments_balance(
        base in -100_000i64..100_000,
        amounts in proptest::collection::vec((any::<bool>(), 0i64..10_000), 0..20),
    ) {
        let entries: Vec<IncomeExpenseEntry> = amounts
            .iter()
            .enumerate()
            .map(|(i, (income, amount))| IncomeExpenseEntry {
                id: format!("ie_{}", i),
                employee_id: "emp_prop".to_string(),
                entry_type: if *income { EntryType::Income } else { EntryType::Expense },
                amount: Decimal::from(*amount),
                note: String::new(),
                created_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            })
            .collect();

        let result = apply_adjustments(&entries, Decimal::from(base), 1);
        let summary = result.summary;
        prop_assert_eq!(
            summary.final_total,
            summary.base_total + summary.income_total - summary.expense_total
        );
        prop_assert_eq!(summary.entries_applied, entries.len());
    }
}
