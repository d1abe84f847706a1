//! Core data models for the Payslip Calculation Engine.
//!
//! This module contains the read-only inputs the engine consumes (employees,
//! salary profiles, pay periods, compensation lines, loans, leave, tax
//! brackets) and the payslip, ledger and audit types it produces.

mod calculation_result;
mod compensation;
mod employee;
mod pay_period;
mod payslip;
mod tax_bracket;

pub use calculation_result::{AuditStep, AuditTrace, AuditWarning, PayslipCalculation};
pub use compensation::{
    AdvanceLine, AdvanceStatus, AllowanceLine, ApprovalStatus, BalanceFloor, CommissionLine,
    LeaveCategory, LeaveRecord, Loan, LoanRepayment, LoanStatus, PeriodFilter,
};
pub use employee::{Employee, SalaryProfile};
pub use pay_period::PayPeriod;
pub use payslip::{
    DetailSource, DetailType, LedgerTotals, Payslip, PayslipDetailLine, PayslipStatus,
    StatutoryContribution,
};
pub use tax_bracket::TaxBracket;

/// Identifier of an employee.
pub type EmployeeId = u64;
/// Identifier of a salary profile.
pub type SalaryId = u64;
/// Identifier of a pay period.
pub type PayPeriodId = u64;
/// Identifier of a loan.
pub type LoanId = u64;
/// Identifier of a salary advance.
pub type AdvanceId = u64;
/// Identifier of an allowance line.
pub type AllowanceId = u64;
/// Identifier of a commission line.
pub type CommissionId = u64;
/// Identifier of a persisted payslip.
pub type PayslipId = u64;
