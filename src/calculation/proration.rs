//! Basic salary proration for employees hired mid-period.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AuditStep;

use super::round_money;

/// The result of prorating a basic salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationResult {
    /// Basic salary for the period, rounded to the currency scale.
    pub basic_salary: Decimal,
    /// Whether proration was applied.
    pub prorated: bool,
    /// The audit step recording this decision.
    pub audit_step: AuditStep,
}

/// Adjusts basic salary when the hire date falls inside the period.
///
/// Proration applies only when `hire_date` is strictly after `start` and
/// strictly before `end`. The salary is then
/// `profile_salary / total_days * days_worked`, where both day counts are
/// inclusive and `days_worked` runs from the hire date to `end`. A hire
/// date on either boundary, or outside the period, leaves the salary
/// unchanged.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::prorate_basic_salary;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let result = prorate_basic_salary(
///     Decimal::new(62_000, 0),
///     NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
///     2,
///     1,
/// );
/// assert_eq!(result.basic_salary, Decimal::new(3_200_000, 2));
/// assert!(result.prorated);
/// ```
pub fn prorate_basic_salary(
    profile_salary: Decimal,
    hire_date: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
    currency_scale: u32,
    step_number: u32,
) -> ProrationResult {
    let newly_hired = hire_date > start && hire_date < end;

    let (basic_salary, reasoning, days) = if newly_hired {
        let total_days = (end - start).num_days() + 1;
        let days_worked = (end - hire_date).num_days() + 1;
        let prorated = profile_salary / Decimal::from(total_days) * Decimal::from(days_worked);
        (
            round_money(prorated, currency_scale),
            format!(
                "Hired {} inside period: {} / {} days x {} days worked",
                hire_date, profile_salary, total_days, days_worked
            ),
            Some((total_days, days_worked)),
        )
    } else {
        (
            round_money(profile_salary, currency_scale),
            format!(
                "Hire date {} is not strictly inside {} to {}, full salary applies",
                hire_date, start, end
            ),
            None,
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "proration".to_string(),
        rule_name: "Basic Salary Proration".to_string(),
        input: serde_json::json!({
            "profile_salary": profile_salary.to_string(),
            "hire_date": hire_date.to_string(),
            "start_date": start.to_string(),
            "end_date": end.to_string()
        }),
        output: serde_json::json!({
            "basic_salary": basic_salary.to_string(),
            "prorated": newly_hired,
            "total_days": days.map(|(total, _)| total),
            "days_worked": days.map(|(_, worked)| worked)
        }),
        reasoning,
    };

    ProrationResult {
        basic_salary,
        prorated: newly_hired,
        audit_step,
    }
}
