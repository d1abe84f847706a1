//! Configuration types for payslip calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::{BalanceFloor, TaxBracket};

fn default_currency_scale() -> u32 {
    2
}

/// Statutory retirement-fund rates, in percent of basic salary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatutoryRates {
    /// Employee EPF share, deducted from net pay.
    pub employee_epf_rate: Decimal,
    /// Employer EPF share, recorded only.
    pub employer_epf_rate: Decimal,
    /// Employer ETF share, recorded only.
    pub employer_etf_rate: Decimal,
}

impl Default for StatutoryRates {
    fn default() -> Self {
        Self {
            employee_epf_rate: Decimal::new(8, 0),
            employer_epf_rate: Decimal::new(12, 0),
            employer_etf_rate: Decimal::new(3, 0),
        }
    }
}

/// Loan handling options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoanPolicy {
    /// What happens when an installment exceeds the remaining balance.
    #[serde(default)]
    pub balance_floor: BalanceFloor,
}

/// Contents of `payroll.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayrollConfig {
    /// Decimal places every monetary component is rounded to.
    #[serde(default = "default_currency_scale")]
    pub currency_scale: u32,
    /// Statutory contribution rates.
    #[serde(default)]
    pub statutory: StatutoryRates,
    /// Loan handling options.
    #[serde(default)]
    pub loans: LoanPolicy,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            currency_scale: default_currency_scale(),
            statutory: StatutoryRates::default(),
            loans: LoanPolicy::default(),
        }
    }
}

/// Contents of `tax_brackets.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxScheduleConfig {
    /// The bracket schedule, in any order.
    pub brackets: Vec<TaxBracket>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Payroll options.
    payroll: PayrollConfig,
    /// Tax brackets (sorted by ascending minimum salary).
    tax_brackets: Vec<TaxBracket>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(payroll: PayrollConfig, tax_brackets: Vec<TaxBracket>) -> Self {
        let mut sorted_brackets = tax_brackets;
        sorted_brackets.sort_by(|a, b| a.min_salary.cmp(&b.min_salary));
        Self {
            payroll,
            tax_brackets: sorted_brackets,
        }
    }

    /// Returns the payroll options.
    pub fn payroll(&self) -> &PayrollConfig {
        &self.payroll
    }

    /// Returns the statutory contribution rates.
    pub fn statutory(&self) -> &StatutoryRates {
        &self.payroll.statutory
    }

    /// Returns the decimal places money is rounded to.
    pub fn currency_scale(&self) -> u32 {
        self.payroll.currency_scale
    }

    /// Returns the loan balance rule.
    pub fn balance_floor(&self) -> BalanceFloor {
        self.payroll.loans.balance_floor
    }

    /// Returns the full tax schedule.
    pub fn tax_brackets(&self) -> &[TaxBracket] {
        &self.tax_brackets
    }

    /// Returns the brackets whose minimum is at or below `gross_salary`,
    /// ascending by minimum.
    pub fn brackets_for(&self, gross_salary: Decimal) -> Vec<TaxBracket> {
        self.tax_brackets
            .iter()
            .filter(|b| b.min_salary <= gross_salary)
            .cloned()
            .collect()
    }
}
