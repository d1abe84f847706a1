//! Calculation logic for the Payslip Calculation Engine.
//!
//! This module contains the pure calculators (working days, proration,
//! no-pay leave, compensation bucketing, progressive tax, loan installments
//! and statutory contributions), the [`PayslipAssembler`] that orchestrates
//! them into one payslip, and the yearly reports over stored payslips.

mod assembler;
mod compensation;
mod leave_deduction;
mod loan_installment;
mod proration;
mod report;
mod rounding;
mod statutory;
mod tax_bracket;
mod working_calendar;

pub use assembler::{AssembledPayslip, AssemblyRequest, PayslipAssembler};
pub use compensation::{
    AllowanceBuckets, CommissionBuckets, CompensationResult, aggregate_compensation,
    collect_allowances, collect_commissions,
};
pub use leave_deduction::{LeaveDeductionResult, calculate_leave_deduction, count_unpaid_leave_days};
pub use loan_installment::{
    LoanInstallment, LoanInstallmentResult, calculate_loan_installments, monthly_installment,
};
pub use proration::{ProrationResult, prorate_basic_salary};
pub use report::{
    GROSS_BANDS, GrossBandCount, RemunerationSummary, TOP_GROSS_BAND, TaxAndRemunerationReport,
    annual_gross_bands, tax_and_remuneration_report,
};
pub use rounding::round_money;
pub use statutory::{StatutoryResult, calculate_statutory};
pub use tax_bracket::{BracketCharge, TaxResult, calculate_tax};
pub use working_calendar::{
    WorkingDaysResult, calculate_working_days, count_working_days, is_working_day,
};
