//! No-pay leave deduction.
//!
//! Unpaid leave is charged at a daily rate derived from the (prorated)
//! basic salary over the period's working days.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{ApprovalStatus, AuditStep, EmployeeId, LeaveCategory, LeaveRecord};

use super::round_money;

/// The result of calculating the no-pay leave deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveDeductionResult {
    /// Basic salary per working day, unrounded.
    pub daily_rate: Decimal,
    /// Unpaid leave days charged.
    pub unpaid_days: Decimal,
    /// The deduction, rounded to the currency scale.
    pub deduction: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Sums the approved unpaid leave days an employee took within a range.
///
/// Only records lying entirely between `start` and `end` (inclusive) are
/// counted. Paid, pending and rejected records are ignored.
pub fn count_unpaid_leave_days(
    records: &[LeaveRecord],
    employee_id: EmployeeId,
    start: NaiveDate,
    end: NaiveDate,
) -> Decimal {
    records
        .iter()
        .filter(|r| r.employee_id == employee_id)
        .filter(|r| r.category == LeaveCategory::Unpaid && r.status == ApprovalStatus::Approved)
        .filter(|r| r.start_date >= start && r.end_date <= end)
        .map(|r| r.day_count)
        .sum()
}

/// Converts unpaid leave days into a monetary deduction.
///
/// `working_days` must be positive; the caller validates the period before
/// getting here.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_leave_deduction;
/// use rust_decimal::Decimal;
///
/// let result = calculate_leave_deduction(Decimal::new(46_000, 0), 23, Decimal::new(2, 0), 2, 1);
/// assert_eq!(result.daily_rate, Decimal::new(2_000, 0));
/// assert_eq!(result.deduction, Decimal::new(4_000, 0));
/// ```
pub fn calculate_leave_deduction(
    basic_salary: Decimal,
    working_days: u32,
    unpaid_days: Decimal,
    currency_scale: u32,
    step_number: u32,
) -> LeaveDeductionResult {
    let daily_rate = basic_salary / Decimal::from(working_days);
    let deduction = round_money(unpaid_days * daily_rate, currency_scale);

    let reasoning = if unpaid_days.is_zero() {
        "No approved unpaid leave in period".to_string()
    } else {
        format!(
            "{} unpaid days x daily rate {} ({} / {} working days)",
            unpaid_days.normalize(),
            round_money(daily_rate, currency_scale),
            basic_salary,
            working_days
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "leave_deduction".to_string(),
        rule_name: "No-Pay Leave Deduction".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.to_string(),
            "working_days": working_days,
            "unpaid_days": unpaid_days.normalize().to_string()
        }),
        output: serde_json::json!({
            "daily_rate": daily_rate.to_string(),
            "deduction": deduction.to_string()
        }),
        reasoning,
    };

    LeaveDeductionResult {
        daily_rate,
        unpaid_days,
        deduction,
        audit_step,
    }
}
