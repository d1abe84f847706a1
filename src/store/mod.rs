//! Collaborator contracts the engine reads from and writes to.
//!
//! The engine itself holds no data. Everything it consumes comes through a
//! [`PayrollRepository`], and everything it produces is written through a
//! [`LedgerTransaction`] opened on a [`PayrollLedger`]. An in-memory
//! implementation backs the HTTP server and the tests.

mod memory;

pub use memory::{InMemoryPayroll, PayrollSnapshot, StoredPayslip};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{
    AdvanceLine, AllowanceLine, CommissionLine, Employee, EmployeeId, Loan, LoanRepayment,
    PayPeriod, PayPeriodId, Payslip, PayslipDetailLine, PayslipId, PeriodFilter, SalaryId,
    SalaryProfile, StatutoryContribution, TaxBracket,
};

/// Read access to the records a payslip is assembled from.
///
/// Lookups of a single record fail with `NotFound` when it is missing.
/// List queries return an empty vector when nothing matches; an `Err` from
/// them means the source itself failed.
pub trait PayrollRepository: Send + Sync {
    /// Looks up an employee.
    fn employee(&self, id: EmployeeId) -> EngineResult<Employee>;

    /// Looks up the active salary profile of an employee.
    fn salary_by_employee(&self, employee_id: EmployeeId) -> EngineResult<SalaryProfile>;

    /// Looks up a pay period.
    fn pay_period(&self, id: PayPeriodId) -> EngineResult<PayPeriod>;

    /// Approved unpaid leave days taken entirely within `start..=end`.
    fn unpaid_leave_days(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Decimal>;

    /// Allowance lines of one salary profile matching the given flags.
    fn allowances(
        &self,
        salary_id: SalaryId,
        period: PeriodFilter,
        fixed: bool,
        taxable: bool,
    ) -> EngineResult<Vec<AllowanceLine>>;

    /// Commission lines of one salary profile matching the given flag.
    fn commissions(
        &self,
        salary_id: SalaryId,
        period: PeriodFilter,
        taxable: bool,
    ) -> EngineResult<Vec<CommissionLine>>;

    /// Pending salary advances of an employee for one pay period.
    fn pending_advances(
        &self,
        employee_id: EmployeeId,
        pay_period_id: PayPeriodId,
    ) -> EngineResult<Vec<AdvanceLine>>;

    /// Ongoing loans of an employee. Held and closed loans are excluded.
    fn ongoing_loans(&self, employee_id: EmployeeId) -> EngineResult<Vec<Loan>>;

    /// Tax brackets applicable to a gross salary, ascending by minimum.
    fn brackets_for(&self, gross_salary: Decimal) -> EngineResult<Vec<TaxBracket>>;
}

/// Opens all-or-nothing write transactions.
pub trait PayrollLedger: Send + Sync {
    /// Starts a transaction. Dropping it without calling
    /// [`LedgerTransaction::commit`] discards every write made through it.
    fn begin(&self) -> EngineResult<Box<dyn LedgerTransaction + '_>>;
}

/// One atomic unit of payslip persistence.
pub trait LedgerTransaction {
    /// Inserts the payslip and returns its new id.
    ///
    /// Fails with `DuplicatePayslip` if one already exists for the same
    /// employee and pay period.
    fn insert_payslip(&mut self, payslip: &Payslip) -> EngineResult<PayslipId>;

    /// Appends one ledger line to a payslip inserted in this transaction.
    fn append_detail(&mut self, payslip_id: PayslipId, line: &PayslipDetailLine)
    -> EngineResult<()>;

    /// Decrements a loan's remaining balance and returns the new balance.
    fn apply_installment(&mut self, repayment: &LoanRepayment) -> EngineResult<Decimal>;

    /// Records the employer contributions of a payslip.
    fn record_contribution(
        &mut self,
        payslip_id: PayslipId,
        contribution: &StatutoryContribution,
    ) -> EngineResult<()>;

    /// Makes every write in this transaction visible.
    fn commit(self: Box<Self>) -> EngineResult<()>;
}
