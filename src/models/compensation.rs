//! Compensation and deduction source models.
//!
//! Allowances and commissions add to pay; salary advances, loans and
//! unpaid leave reduce it. All of these are read-only inputs to the engine,
//! apart from a loan's remaining balance which assembly decrements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AdvanceId, AllowanceId, CommissionId, EmployeeId, LoanId, PayPeriodId, SalaryId};

/// Which pay periods a compensation lookup matches.
///
/// Fixed allowances carry no period reference and are looked up with
/// [`PeriodFilter::Any`]; periodic lines are looked up for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFilter {
    /// Matches lines regardless of their period reference.
    Any,
    /// Matches only lines tied to this pay period.
    Period(PayPeriodId),
}

impl PeriodFilter {
    /// Returns true if a line with the given period reference matches.
    pub fn matches(&self, pay_period_id: Option<PayPeriodId>) -> bool {
        match self {
            PeriodFilter::Any => true,
            PeriodFilter::Period(id) => pay_period_id == Some(*id),
        }
    }
}

/// An allowance attached to a salary profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceLine {
    /// Unique identifier for the allowance line.
    pub id: AllowanceId,
    /// The salary profile that owns this line.
    pub salary_id: SalaryId,
    /// The allowance type name (e.g., "Transport"), used as ledger description.
    pub name: String,
    /// The allowance amount.
    pub amount: Decimal,
    /// Whether the allowance is liable to tax.
    pub taxable: bool,
    /// Fixed allowances apply every cycle; periodic ones to one period.
    pub fixed: bool,
    /// The pay period a periodic allowance belongs to.
    #[serde(default)]
    pub pay_period_id: Option<PayPeriodId>,
}

/// A commission attached to a salary profile for one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionLine {
    /// Unique identifier for the commission line.
    pub id: CommissionId,
    /// The salary profile that owns this line.
    pub salary_id: SalaryId,
    /// The commission type name, used as ledger description.
    pub name: String,
    /// The commission amount.
    pub amount: Decimal,
    /// Whether the commission is liable to tax.
    pub taxable: bool,
    /// The pay period the commission belongs to.
    #[serde(default)]
    pub pay_period_id: Option<PayPeriodId>,
}

/// Settlement state of a salary advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceStatus {
    /// Not yet recovered; consumed by the next payslip of its period.
    Pending,
    /// Already recovered.
    Settled,
}

/// A salary advance to be recovered from a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceLine {
    /// Unique identifier for the advance.
    pub id: AdvanceId,
    /// The employee who received the advance.
    pub employee_id: EmployeeId,
    /// The pay period the advance is recovered in.
    pub pay_period_id: PayPeriodId,
    /// The advance amount.
    pub amount: Decimal,
    /// Settlement state.
    pub status: AdvanceStatus,
}

/// Repayment state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Installments are deducted every period.
    Ongoing,
    /// Deduction suspended; the loan is skipped entirely.
    Hold,
    /// Fully repaid.
    Closed,
}

/// An employee loan repaid in equal installments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Unique identifier for the loan.
    pub id: LoanId,
    /// The borrowing employee.
    pub employee_id: EmployeeId,
    /// The original principal.
    pub principal: Decimal,
    /// Flat interest rate in percent, charged once on the principal.
    pub interest_rate: Decimal,
    /// Number of installments the loan is repaid over.
    pub installment_count: u32,
    /// Outstanding balance.
    pub remaining_balance: Decimal,
    /// Repayment state.
    pub status: LoanStatus,
}

/// How a loan balance behaves when an installment exceeds it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceFloor {
    /// The balance may go negative.
    #[default]
    None,
    /// The balance is clamped at zero.
    Zero,
}

/// An instruction to decrement a loan balance by one installment.
///
/// Produced by assembly and executed inside the ledger transaction that
/// writes the matching detail line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRepayment {
    /// The loan being repaid.
    pub loan_id: LoanId,
    /// The installment deducted this period.
    pub installment: Decimal,
    /// Balance rule to apply.
    pub floor: BalanceFloor,
}

impl LoanRepayment {
    /// Returns the balance left after this repayment.
    ///
    /// # Examples
    ///
    /// ```
    /// use payslip_engine::models::{BalanceFloor, LoanRepayment};
    /// use rust_decimal::Decimal;
    ///
    /// let repayment = LoanRepayment {
    ///     loan_id: 1,
    ///     installment: Decimal::new(1_100, 0),
    ///     floor: BalanceFloor::None,
    /// };
    /// assert_eq!(repayment.apply_to(Decimal::new(500, 0)), Decimal::new(-600, 0));
    /// ```
    pub fn apply_to(&self, balance: Decimal) -> Decimal {
        let next = balance - self.installment;
        match self.floor {
            BalanceFloor::None => next,
            BalanceFloor::Zero => next.max(Decimal::ZERO),
        }
    }
}

/// Category of a leave record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveCategory {
    /// Paid leave; never deducted.
    Paid,
    /// No-pay leave; deducted at the daily rate.
    Unpaid,
}

/// Approval state of a leave record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting a decision.
    Pending,
    /// Approved.
    Approved,
    /// Rejected.
    Rejected,
}

/// A leave taken by an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRecord {
    /// The employee on leave.
    pub employee_id: EmployeeId,
    /// First day of leave.
    pub start_date: NaiveDate,
    /// Last day of leave.
    pub end_date: NaiveDate,
    /// Days counted for this leave (may be fractional for half days).
    pub day_count: Decimal,
    /// Paid or unpaid.
    pub category: LeaveCategory,
    /// Approval state.
    pub status: ApprovalStatus,
}
