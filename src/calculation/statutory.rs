//! Statutory retirement-fund contributions (EPF and ETF).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::StatutoryRates;
use crate::models::AuditStep;

use super::round_money;

/// Employee and employer contributions on one basic salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryResult {
    /// Employee EPF, deducted from net pay.
    pub employee_epf: Decimal,
    /// Employer EPF, recorded only.
    pub employer_epf: Decimal,
    /// Employer ETF, recorded only.
    pub employer_etf: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Derives statutory contributions from basic salary.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_statutory;
/// use payslip_engine::config::StatutoryRates;
/// use rust_decimal::Decimal;
///
/// let result = calculate_statutory(Decimal::new(60_000, 0), &StatutoryRates::default(), 2, 1);
/// assert_eq!(result.employee_epf, Decimal::new(4_800, 0));
/// assert_eq!(result.employer_epf, Decimal::new(7_200, 0));
/// assert_eq!(result.employer_etf, Decimal::new(1_800, 0));
/// ```
pub fn calculate_statutory(
    basic_salary: Decimal,
    rates: &StatutoryRates,
    currency_scale: u32,
    step_number: u32,
) -> StatutoryResult {
    let share = |rate: Decimal| round_money(basic_salary * rate / Decimal::ONE_HUNDRED, currency_scale);

    let employee_epf = share(rates.employee_epf_rate);
    let employer_epf = share(rates.employer_epf_rate);
    let employer_etf = share(rates.employer_etf_rate);

    let audit_step = AuditStep {
        step_number,
        rule_id: "statutory_contributions".to_string(),
        rule_name: "EPF/ETF Contributions".to_string(),
        input: serde_json::json!({
            "basic_salary": basic_salary.to_string(),
            "employee_epf_rate": rates.employee_epf_rate.to_string(),
            "employer_epf_rate": rates.employer_epf_rate.to_string(),
            "employer_etf_rate": rates.employer_etf_rate.to_string()
        }),
        output: serde_json::json!({
            "employee_epf": employee_epf.to_string(),
            "employer_epf": employer_epf.to_string(),
            "employer_etf": employer_etf.to_string()
        }),
        reasoning: format!(
            "Employee EPF {}% of {} deducted; employer EPF {}% and ETF {}% recorded",
            rates.employee_epf_rate, basic_salary, rates.employer_epf_rate, rates.employer_etf_rate
        ),
    };

    StatutoryResult {
        employee_epf,
        employer_epf,
        employer_etf,
        audit_step,
    }
}
