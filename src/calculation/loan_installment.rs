//! Loan installment calculation.
//!
//! Installments are flat: interest is charged once on the original
//! principal and the total is split evenly, every period, regardless of
//! the remaining balance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    AuditStep, AuditWarning, BalanceFloor, Loan, LoanId, LoanRepayment, LoanStatus,
};

use super::round_money;

/// The installment of one loan for the current period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInstallment {
    /// The loan.
    pub loan_id: LoanId,
    /// The installment, rounded to the currency scale.
    pub amount: Decimal,
    /// The balance the repayment instruction will leave.
    pub projected_balance: Decimal,
}

/// The result of calculating installments across an employee's loans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInstallmentResult {
    /// Installments of the loans that contribute, in input order.
    pub installments: Vec<LoanInstallment>,
    /// Balance mutations to execute with the ledger.
    pub repayments: Vec<LoanRepayment>,
    /// Sum of all installments.
    pub total: Decimal,
    /// Skipped loans and balances driven negative.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the flat installment `(principal + principal * rate / 100) / count`.
///
/// Returns `None` for a loan with a non-positive principal or no installments.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::monthly_installment;
/// use payslip_engine::models::{Loan, LoanStatus};
/// use rust_decimal::Decimal;
///
/// let loan = Loan {
///     id: 1,
///     employee_id: 1,
///     principal: Decimal::new(12_000, 0),
///     interest_rate: Decimal::new(10, 0),
///     installment_count: 12,
///     remaining_balance: Decimal::new(13_200, 0),
///     status: LoanStatus::Ongoing,
/// };
/// assert_eq!(monthly_installment(&loan, 2), Some(Decimal::new(1_100, 0)));
/// ```
pub fn monthly_installment(loan: &Loan, currency_scale: u32) -> Option<Decimal> {
    if loan.principal <= Decimal::ZERO || loan.installment_count == 0 {
        return None;
    }
    let total = loan.principal + loan.principal * loan.interest_rate / Decimal::ONE_HUNDRED;
    Some(round_money(
        total / Decimal::from(loan.installment_count),
        currency_scale,
    ))
}

/// Derives this period's installment for each ongoing loan.
///
/// Loans that are not ongoing, or that [`monthly_installment`] rejects,
/// contribute nothing and raise a warning. A repayment that would drive
/// the balance below zero is still scheduled; it raises a warning unless
/// the floor clamps it.
pub fn calculate_loan_installments(
    loans: &[Loan],
    floor: BalanceFloor,
    currency_scale: u32,
    step_number: u32,
) -> LoanInstallmentResult {
    let mut installments = Vec::new();
    let mut repayments = Vec::new();
    let mut warnings = Vec::new();
    let mut total = Decimal::ZERO;

    for loan in loans {
        if loan.status != LoanStatus::Ongoing {
            warnings.push(AuditWarning {
                code: "LOAN_SKIPPED".to_string(),
                message: format!("Loan {} is {:?}, no installment taken", loan.id, loan.status),
                severity: "low".to_string(),
            });
            continue;
        }

        let Some(amount) = monthly_installment(loan, currency_scale) else {
            warnings.push(AuditWarning {
                code: "LOAN_SKIPPED".to_string(),
                message: format!(
                    "Loan {} has principal {} over {} installments, no installment taken",
                    loan.id, loan.principal, loan.installment_count
                ),
                severity: "medium".to_string(),
            });
            continue;
        };

        let repayment = LoanRepayment {
            loan_id: loan.id,
            installment: amount,
            floor,
        };
        let projected_balance = repayment.apply_to(loan.remaining_balance);
        if loan.remaining_balance - amount < Decimal::ZERO && floor == BalanceFloor::None {
            warnings.push(AuditWarning {
                code: "LOAN_BALANCE_NEGATIVE".to_string(),
                message: format!(
                    "Loan {} balance {} will become {} after installment {}",
                    loan.id, loan.remaining_balance, projected_balance, amount
                ),
                severity: "medium".to_string(),
            });
        }

        total += amount;
        installments.push(LoanInstallment {
            loan_id: loan.id,
            amount,
            projected_balance,
        });
        repayments.push(repayment);
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "loan_installments".to_string(),
        rule_name: "Loan Installments".to_string(),
        input: serde_json::json!({
            "loan_count": loans.len(),
            "balance_floor": floor
        }),
        output: serde_json::json!({
            "total": total.to_string(),
            "installments": installments
                .iter()
                .map(|i| serde_json::json!({
                    "loan_id": i.loan_id,
                    "amount": i.amount.to_string(),
                    "projected_balance": i.projected_balance.to_string()
                }))
                .collect::<Vec<_>>()
        }),
        reasoning: format!(
            "{} of {} loan(s) contribute installments totalling {}",
            installments.len(),
            loans.len(),
            total
        ),
    };

    LoanInstallmentResult {
        installments,
        repayments,
        total,
        warnings,
        audit_step,
    }
}
