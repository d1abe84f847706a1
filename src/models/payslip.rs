//! Payslip and detail ledger models.
//!
//! A [`Payslip`] holds the aggregate figures of one assembly run; its
//! [`PayslipDetailLine`]s itemize every addition and deduction behind them.
//! The two must reconcile exactly, which [`Payslip::reconcile`] checks.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    AdvanceId, AllowanceId, CommissionId, EmployeeId, LoanId, PayPeriodId, SalaryId,
};
use crate::error::{EngineError, EngineResult};

/// Workflow state of a payslip. Has no effect on any figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayslipStatus {
    /// Generated, not yet approved.
    #[default]
    Draft,
    /// Approved for payment.
    Approved,
    /// Paid out.
    Paid,
}

/// The aggregate result of assembling one payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// The employee being paid.
    pub employee_id: EmployeeId,
    /// The salary profile used.
    pub salary_id: SalaryId,
    /// The pay period.
    pub pay_period_id: PayPeriodId,
    /// First day covered.
    pub start_date: NaiveDate,
    /// Last day covered.
    pub end_date: NaiveDate,
    /// Workflow state.
    pub status: PayslipStatus,
    /// Working days in the period.
    pub working_days: u32,
    /// Basic salary after proration.
    pub basic_salary: Decimal,
    /// Basic salary plus tax-liable allowances and commissions.
    pub gross_salary: Decimal,
    /// Take-home pay.
    pub net_salary: Decimal,
    /// Fixed and periodic allowances liable to tax.
    pub tax_liable_allowances: Decimal,
    /// Fixed and periodic allowances excluded from tax.
    pub tax_excluded_allowances: Decimal,
    /// Commissions liable to tax.
    pub tax_liable_commissions: Decimal,
    /// Commissions excluded from tax.
    pub tax_excluded_commissions: Decimal,
    /// Income tax.
    pub tax_deduction: Decimal,
    /// Employee retirement-fund contribution.
    pub epf_deduction: Decimal,
    /// Pending salary advances recovered.
    pub salary_advance_deduction: Decimal,
    /// Loan installments.
    pub loan_deduction: Decimal,
    /// Attendance deduction supplied by the caller.
    pub attendance_deduction: Decimal,
    /// No-pay leave deduction.
    pub leave_deduction: Decimal,
}

impl Payslip {
    /// Total of all allowances and commissions, liable and excluded.
    pub fn total_additions(&self) -> EngineResult<Decimal> {
        checked_sum(
            [
                self.tax_liable_allowances,
                self.tax_excluded_allowances,
                self.tax_liable_commissions,
                self.tax_excluded_commissions,
            ],
            "total_additions",
        )
    }

    /// Total of every deduction taken from pay.
    ///
    /// Fails with `InvalidInput` if the sum does not fit in a `Decimal`.
    pub fn total_deductions(&self) -> EngineResult<Decimal> {
        checked_sum(
            [
                self.tax_deduction,
                self.salary_advance_deduction,
                self.loan_deduction,
                self.epf_deduction,
                self.attendance_deduction,
                self.leave_deduction,
            ],
            "total_deductions",
        )
    }

    /// Net salary from the closed-form formula over the aggregate fields.
    pub fn expected_net(&self) -> EngineResult<Decimal> {
        let deductions = self.total_deductions()?;
        self.gross_salary
            .checked_add(self.tax_excluded_allowances)
            .and_then(|d| d.checked_add(self.tax_excluded_commissions))
            .and_then(|d| d.checked_sub(deductions))
            .ok_or_else(|| out_of_range("net_salary"))
    }

    /// Checks that the ledger reproduces this payslip exactly.
    ///
    /// Additions must equal all allowances plus all commissions, deductions
    /// must equal the deduction total, and `basic + additions - deductions`
    /// must equal the stored net salary.
    pub fn reconcile(&self, details: &[PayslipDetailLine]) -> EngineResult<()> {
        let expected_net = self.expected_net()?;
        if self.net_salary != expected_net {
            return Err(EngineError::LedgerImbalance {
                expected: expected_net,
                actual: self.net_salary,
            });
        }

        let totals = LedgerTotals::from_lines(details)?;
        let from_ledger = self
            .basic_salary
            .checked_add(totals.additions)
            .and_then(|d| d.checked_sub(totals.deductions))
            .ok_or_else(|| out_of_range("details"))?;
        if totals.additions != self.total_additions()?
            || totals.deductions != self.total_deductions()?
            || from_ledger != self.net_salary
        {
            return Err(EngineError::LedgerImbalance {
                expected: self.net_salary,
                actual: from_ledger,
            });
        }
        Ok(())
    }
}

fn checked_sum<const N: usize>(amounts: [Decimal; N], field: &str) -> EngineResult<Decimal> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| out_of_range(field))
}

fn out_of_range(field: &str) -> EngineError {
    EngineError::InvalidInput {
        field: field.to_string(),
        message: "amount exceeds the representable range".to_string(),
    }
}

/// Direction of a ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetailType {
    /// Adds to pay.
    Addition,
    /// Reduces pay.
    Deduction,
}

/// The record a ledger line originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetailSource {
    /// A loan installment.
    Loan {
        /// The loan repaid.
        loan_id: LoanId,
    },
    /// A recovered salary advance.
    Advance {
        /// The advance recovered.
        advance_id: AdvanceId,
    },
    /// An allowance line.
    Allowance {
        /// The allowance paid.
        allowance_id: AllowanceId,
    },
    /// A commission line.
    Commission {
        /// The commission paid.
        commission_id: CommissionId,
    },
    /// A computed figure with no source record (tax, EPF, leave, attendance).
    Synthetic,
}

/// One itemized addition or deduction on a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipDetailLine {
    /// Addition or deduction.
    #[serde(rename = "type")]
    pub detail_type: DetailType,
    /// Where the amount came from.
    pub source: DetailSource,
    /// Free-text description.
    pub description: String,
    /// The amount, always non-negative; direction comes from `detail_type`.
    pub amount: Decimal,
}

impl PayslipDetailLine {
    /// Creates an addition line.
    pub fn addition(source: DetailSource, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            detail_type: DetailType::Addition,
            source,
            description: description.into(),
            amount,
        }
    }

    /// Creates a deduction line.
    pub fn deduction(
        source: DetailSource,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            detail_type: DetailType::Deduction,
            source,
            description: description.into(),
            amount,
        }
    }
}

/// Sums of a ledger by direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    /// Sum of addition lines.
    pub additions: Decimal,
    /// Sum of deduction lines.
    pub deductions: Decimal,
}

impl LedgerTotals {
    /// Sums the given lines by direction.
    pub fn from_lines(lines: &[PayslipDetailLine]) -> EngineResult<Self> {
        lines.iter().try_fold(Self::default(), |mut totals, line| {
            let total = match line.detail_type {
                DetailType::Addition => &mut totals.additions,
                DetailType::Deduction => &mut totals.deductions,
            };
            *total = total
                .checked_add(line.amount)
                .ok_or_else(|| out_of_range("details"))?;
            Ok(totals)
        })
    }
}

/// Employer retirement-fund contributions for one payslip.
///
/// Recorded alongside the payslip; never subtracted from net pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryContribution {
    /// The employee contributed for.
    pub employee_id: EmployeeId,
    /// The pay period.
    pub pay_period_id: PayPeriodId,
    /// Employer EPF contribution.
    pub employer_epf: Decimal,
    /// Employer ETF contribution.
    pub employer_etf: Decimal,
}
