//! In-memory payroll store.
//!
//! Holds a [`PayrollSnapshot`] of input records plus the payslips written so
//! far behind a single mutex. A transaction clones the state under the lock,
//! writes to the clone, and swaps it in on commit, so an abandoned
//! transaction leaves nothing behind and concurrent transactions serialize.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculation::count_unpaid_leave_days;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdvanceLine, AdvanceStatus, AllowanceLine, CommissionLine, Employee, EmployeeId,
    LeaveRecord, Loan, LoanId, LoanRepayment, LoanStatus, PayPeriod, PayPeriodId, Payslip,
    PayslipDetailLine, PayslipId, PeriodFilter, SalaryId, SalaryProfile, StatutoryContribution,
    TaxBracket,
};

use super::{LedgerTransaction, PayrollLedger, PayrollRepository};

/// The input records an in-memory store serves.
///
/// Deserializable from YAML so a server can be seeded from a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollSnapshot {
    /// Employees.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Salary profiles.
    #[serde(default)]
    pub salaries: Vec<SalaryProfile>,
    /// Pay periods.
    #[serde(default)]
    pub pay_periods: Vec<PayPeriod>,
    /// Allowance lines.
    #[serde(default)]
    pub allowances: Vec<AllowanceLine>,
    /// Commission lines.
    #[serde(default)]
    pub commissions: Vec<CommissionLine>,
    /// Salary advances.
    #[serde(default)]
    pub advances: Vec<AdvanceLine>,
    /// Loans.
    #[serde(default)]
    pub loans: Vec<Loan>,
    /// Leave records.
    #[serde(default)]
    pub leave_records: Vec<LeaveRecord>,
}

/// A persisted payslip with everything written alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPayslip {
    /// Store-assigned id.
    pub id: PayslipId,
    /// The aggregate payslip.
    pub payslip: Payslip,
    /// Ledger lines in the order they were appended.
    pub details: Vec<PayslipDetailLine>,
    /// Employer contributions, once recorded.
    pub contribution: Option<StatutoryContribution>,
}

#[derive(Debug, Clone, Default)]
struct PayrollState {
    records: PayrollSnapshot,
    payslips: Vec<StoredPayslip>,
    next_payslip_id: PayslipId,
}

impl PayrollState {
    fn payslip_mut(&mut self, id: PayslipId) -> EngineResult<&mut StoredPayslip> {
        self.payslips
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(EngineError::NotFound {
                entity: "payslip",
                id,
            })
    }
}

/// A thread-safe in-memory [`PayrollRepository`] and [`PayrollLedger`].
///
/// # Example
///
/// ```
/// use payslip_engine::config::EngineConfig;
/// use payslip_engine::store::{InMemoryPayroll, PayrollSnapshot, PayrollRepository};
///
/// let store = InMemoryPayroll::new(PayrollSnapshot::default(), EngineConfig::default());
/// assert!(store.employee(1).is_err());
/// ```
#[derive(Debug)]
pub struct InMemoryPayroll {
    state: Mutex<PayrollState>,
    config: EngineConfig,
}

impl InMemoryPayroll {
    /// Creates a store over the given records. Tax brackets are served
    /// from `config`.
    pub fn new(records: PayrollSnapshot, config: EngineConfig) -> Self {
        Self {
            state: Mutex::new(PayrollState {
                records,
                payslips: Vec::new(),
                next_payslip_id: 1,
            }),
            config,
        }
    }

    /// Creates a store seeded from a YAML [`PayrollSnapshot`] file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P, config: EngineConfig) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;
        let records: PayrollSnapshot =
            serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
                path: path_str,
                message: e.to_string(),
            })?;

        Ok(Self::new(records, config))
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, PayrollState>> {
        self.state.lock().map_err(|_| EngineError::Persistence {
            message: "payroll store lock poisoned".to_string(),
        })
    }

    /// Looks up a stored payslip.
    pub fn payslip(&self, id: PayslipId) -> EngineResult<StoredPayslip> {
        self.lock()?
            .payslips
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "payslip",
                id,
            })
    }

    /// Returns every stored payslip in insertion order.
    pub fn payslips(&self) -> EngineResult<Vec<StoredPayslip>> {
        Ok(self.lock()?.payslips.clone())
    }

    /// Returns every pay period.
    pub fn pay_periods(&self) -> EngineResult<Vec<PayPeriod>> {
        Ok(self.lock()?.records.pay_periods.clone())
    }

    /// Looks up a loan, including its current remaining balance.
    pub fn loan(&self, id: LoanId) -> EngineResult<Loan> {
        self.lock()?
            .records
            .loans
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or(EngineError::NotFound { entity: "loan", id })
    }
}

impl PayrollRepository for InMemoryPayroll {
    fn employee(&self, id: EmployeeId) -> EngineResult<Employee> {
        self.lock()?
            .records
            .employees
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "employee",
                id,
            })
    }

    fn salary_by_employee(&self, employee_id: EmployeeId) -> EngineResult<SalaryProfile> {
        self.lock()?
            .records
            .salaries
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .max_by_key(|s| s.valid_from)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "salary profile",
                id: employee_id,
            })
    }

    fn pay_period(&self, id: PayPeriodId) -> EngineResult<PayPeriod> {
        self.lock()?
            .records
            .pay_periods
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(EngineError::NotFound {
                entity: "pay period",
                id,
            })
    }

    fn unpaid_leave_days(
        &self,
        employee_id: EmployeeId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Decimal> {
        let state = self.lock()?;
        Ok(count_unpaid_leave_days(
            &state.records.leave_records,
            employee_id,
            start,
            end,
        ))
    }

    fn allowances(
        &self,
        salary_id: SalaryId,
        period: PeriodFilter,
        fixed: bool,
        taxable: bool,
    ) -> EngineResult<Vec<AllowanceLine>> {
        Ok(self
            .lock()?
            .records
            .allowances
            .iter()
            .filter(|a| a.salary_id == salary_id && a.fixed == fixed && a.taxable == taxable)
            .filter(|a| period.matches(a.pay_period_id))
            .cloned()
            .collect())
    }

    fn commissions(
        &self,
        salary_id: SalaryId,
        period: PeriodFilter,
        taxable: bool,
    ) -> EngineResult<Vec<CommissionLine>> {
        Ok(self
            .lock()?
            .records
            .commissions
            .iter()
            .filter(|c| c.salary_id == salary_id && c.taxable == taxable)
            .filter(|c| period.matches(c.pay_period_id))
            .cloned()
            .collect())
    }

    fn pending_advances(
        &self,
        employee_id: EmployeeId,
        pay_period_id: PayPeriodId,
    ) -> EngineResult<Vec<AdvanceLine>> {
        Ok(self
            .lock()?
            .records
            .advances
            .iter()
            .filter(|a| a.employee_id == employee_id && a.pay_period_id == pay_period_id)
            .filter(|a| a.status == AdvanceStatus::Pending)
            .cloned()
            .collect())
    }

    fn ongoing_loans(&self, employee_id: EmployeeId) -> EngineResult<Vec<Loan>> {
        Ok(self
            .lock()?
            .records
            .loans
            .iter()
            .filter(|l| l.employee_id == employee_id && l.status == LoanStatus::Ongoing)
            .cloned()
            .collect())
    }

    fn brackets_for(&self, gross_salary: Decimal) -> EngineResult<Vec<TaxBracket>> {
        Ok(self.config.brackets_for(gross_salary))
    }
}

impl PayrollLedger for InMemoryPayroll {
    fn begin(&self) -> EngineResult<Box<dyn LedgerTransaction + '_>> {
        let guard = self.lock()?;
        let staged = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, staged }))
    }
}

struct MemoryTransaction<'a> {
    guard: MutexGuard<'a, PayrollState>,
    staged: PayrollState,
}

impl LedgerTransaction for MemoryTransaction<'_> {
    fn insert_payslip(&mut self, payslip: &Payslip) -> EngineResult<PayslipId> {
        let duplicate = self.staged.payslips.iter().any(|p| {
            p.payslip.employee_id == payslip.employee_id
                && p.payslip.pay_period_id == payslip.pay_period_id
        });
        if duplicate {
            return Err(EngineError::DuplicatePayslip {
                employee_id: payslip.employee_id,
                pay_period_id: payslip.pay_period_id,
            });
        }

        let id = self.staged.next_payslip_id;
        self.staged.next_payslip_id += 1;
        self.staged.payslips.push(StoredPayslip {
            id,
            payslip: payslip.clone(),
            details: Vec::new(),
            contribution: None,
        });
        Ok(id)
    }

    fn append_detail(
        &mut self,
        payslip_id: PayslipId,
        line: &PayslipDetailLine,
    ) -> EngineResult<()> {
        self.staged
            .payslip_mut(payslip_id)?
            .details
            .push(line.clone());
        Ok(())
    }

    fn apply_installment(&mut self, repayment: &LoanRepayment) -> EngineResult<Decimal> {
        let loan = self
            .staged
            .records
            .loans
            .iter_mut()
            .find(|l| l.id == repayment.loan_id)
            .ok_or(EngineError::NotFound {
                entity: "loan",
                id: repayment.loan_id,
            })?;
        loan.remaining_balance = repayment.apply_to(loan.remaining_balance);
        debug!(
            loan_id = loan.id,
            installment = %repayment.installment,
            remaining_balance = %loan.remaining_balance,
            "Staged loan installment"
        );
        Ok(loan.remaining_balance)
    }

    fn record_contribution(
        &mut self,
        payslip_id: PayslipId,
        contribution: &StatutoryContribution,
    ) -> EngineResult<()> {
        self.staged.payslip_mut(payslip_id)?.contribution = Some(contribution.clone());
        Ok(())
    }

    fn commit(self: Box<Self>) -> EngineResult<()> {
        let MemoryTransaction { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ApprovalStatus, BalanceFloor, DetailSource, LeaveCategory, PayslipStatus,
    };
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn allowance(id: u64, fixed: bool, taxable: bool, period: Option<PayPeriodId>) -> AllowanceLine {
        AllowanceLine {
            id,
            salary_id: 10,
            name: format!("Allowance {}", id),
            amount: dec("100"),
            taxable,
            fixed,
            pay_period_id: period,
        }
    }

    fn records() -> PayrollSnapshot {
        PayrollSnapshot {
            employees: vec![Employee {
                id: 1,
                name: "Nimal".to_string(),
                hire_date: date(2023, 6, 1),
            }],
            salaries: vec![SalaryProfile {
                id: 10,
                employee_id: 1,
                basic_salary: dec("60000"),
                valid_from: date(2023, 6, 1),
                valid_to: None,
            }],
            pay_periods: vec![PayPeriod {
                id: 3,
                start_date: date(2025, 1, 1),
                end_date: date(2025, 1, 31),
                month: "January".to_string(),
                year: 2025,
            }],
            allowances: vec![
                allowance(1, true, true, None),
                allowance(2, false, true, Some(3)),
                allowance(3, false, true, Some(4)),
                allowance(4, true, false, None),
            ],
            commissions: vec![],
            advances: vec![
                AdvanceLine {
                    id: 1,
                    employee_id: 1,
                    pay_period_id: 3,
                    amount: dec("2500"),
                    status: AdvanceStatus::Pending,
                },
                AdvanceLine {
                    id: 2,
                    employee_id: 1,
                    pay_period_id: 3,
                    amount: dec("1000"),
                    status: AdvanceStatus::Settled,
                },
            ],
            loans: vec![
                Loan {
                    id: 7,
                    employee_id: 1,
                    principal: dec("12000"),
                    interest_rate: dec("10"),
                    installment_count: 12,
                    remaining_balance: dec("13200"),
                    status: LoanStatus::Ongoing,
                },
                Loan {
                    id: 8,
                    employee_id: 1,
                    principal: dec("5000"),
                    interest_rate: dec("5"),
                    installment_count: 5,
                    remaining_balance: dec("5250"),
                    status: LoanStatus::Hold,
                },
            ],
            leave_records: vec![LeaveRecord {
                employee_id: 1,
                start_date: date(2025, 1, 6),
                end_date: date(2025, 1, 6),
                day_count: dec("1"),
                category: LeaveCategory::Unpaid,
                status: ApprovalStatus::Approved,
            }],
        }
    }

    fn store() -> InMemoryPayroll {
        InMemoryPayroll::new(records(), EngineConfig::default())
    }

    fn payslip() -> Payslip {
        Payslip {
            employee_id: 1,
            salary_id: 10,
            pay_period_id: 3,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
            status: PayslipStatus::Draft,
            working_days: 23,
            basic_salary: dec("60000"),
            gross_salary: dec("60000"),
            net_salary: dec("60000"),
            tax_liable_allowances: Decimal::ZERO,
            tax_excluded_allowances: Decimal::ZERO,
            tax_liable_commissions: Decimal::ZERO,
            tax_excluded_commissions: Decimal::ZERO,
            tax_deduction: Decimal::ZERO,
            epf_deduction: Decimal::ZERO,
            salary_advance_deduction: Decimal::ZERO,
            loan_deduction: Decimal::ZERO,
            attendance_deduction: Decimal::ZERO,
            leave_deduction: Decimal::ZERO,
        }
    }

    #[test]
    fn test_lookups_and_not_found() {
        let store = store();
        assert_eq!(store.employee(1).unwrap().name, "Nimal");
        assert_eq!(store.salary_by_employee(1).unwrap().id, 10);
        assert_eq!(store.pay_period(3).unwrap().month, "January");

        match store.employee(99) {
            Err(EngineError::NotFound { entity, id }) => {
                assert_eq!(entity, "employee");
                assert_eq!(id, 99);
            }
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert!(matches!(
            store.salary_by_employee(99),
            Err(EngineError::NotFound { entity: "salary profile", .. })
        ));
    }

    #[test]
    fn test_allowance_queries_respect_flags_and_period() {
        let store = store();

        let fixed_liable = store.allowances(10, PeriodFilter::Any, true, true).unwrap();
        assert_eq!(fixed_liable.len(), 1);
        assert_eq!(fixed_liable[0].id, 1);

        let periodic_liable = store
            .allowances(10, PeriodFilter::Period(3), false, true)
            .unwrap();
        assert_eq!(periodic_liable.len(), 1);
        assert_eq!(periodic_liable[0].id, 2);

        let periodic_excluded = store
            .allowances(10, PeriodFilter::Period(3), false, false)
            .unwrap();
        assert!(periodic_excluded.is_empty());
    }

    #[test]
    fn test_only_pending_advances_and_ongoing_loans_returned() {
        let store = store();
        let advances = store.pending_advances(1, 3).unwrap();
        assert_eq!(advances.len(), 1);
        assert_eq!(advances[0].id, 1);

        let loans = store.ongoing_loans(1).unwrap();
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].id, 7);
    }

    #[test]
    fn test_unpaid_leave_days() {
        let days = store()
            .unpaid_leave_days(1, date(2025, 1, 1), date(2025, 1, 31))
            .unwrap();
        assert_eq!(days, dec("1"));
    }

    #[test]
    fn test_committed_transaction_is_visible() {
        let store = store();
        let mut tx = store.begin().unwrap();
        let id = tx.insert_payslip(&payslip()).unwrap();
        tx.append_detail(
            id,
            &PayslipDetailLine::deduction(DetailSource::Loan { loan_id: 7 }, "Loan Installment", dec("1100")),
        )
        .unwrap();
        let balance = tx
            .apply_installment(&LoanRepayment {
                loan_id: 7,
                installment: dec("1100"),
                floor: BalanceFloor::None,
            })
            .unwrap();
        assert_eq!(balance, dec("12100"));
        tx.commit().unwrap();

        let stored = store.payslip(id).unwrap();
        assert_eq!(stored.details.len(), 1);
        assert_eq!(store.loan(7).unwrap().remaining_balance, dec("12100"));
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let store = store();
        {
            let mut tx = store.begin().unwrap();
            tx.insert_payslip(&payslip()).unwrap();
            tx.apply_installment(&LoanRepayment {
                loan_id: 7,
                installment: dec("1100"),
                floor: BalanceFloor::None,
            })
            .unwrap();
        }

        assert!(store.payslips().unwrap().is_empty());
        assert_eq!(store.loan(7).unwrap().remaining_balance, dec("13200"));
    }

    #[test]
    fn test_duplicate_payslip_rejected() {
        let store = store();
        let mut tx = store.begin().unwrap();
        tx.insert_payslip(&payslip()).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin().unwrap();
        match tx.insert_payslip(&payslip()) {
            Err(EngineError::DuplicatePayslip {
                employee_id,
                pay_period_id,
            }) => {
                assert_eq!(employee_id, 1);
                assert_eq!(pay_period_id, 3);
            }
            other => panic!("Expected DuplicatePayslip, got {:?}", other),
        }
    }

    #[test]
    fn test_installment_on_missing_loan_fails() {
        let store = store();
        let mut tx = store.begin().unwrap();
        let result = tx.apply_installment(&LoanRepayment {
            loan_id: 404,
            installment: dec("10"),
            floor: BalanceFloor::None,
        });
        assert!(matches!(
            result,
            Err(EngineError::NotFound { entity: "loan", id: 404 })
        ));
    }

    #[test]
    fn test_snapshot_from_yaml() {
        let yaml = r#"
employees:
  - id: 1
    hire_date: 2023-06-01
pay_periods:
  - id: 3
    start_date: 2025-01-01
    end_date: 2025-01-31
    month: January
    year: 2025
"#;
        let snapshot: PayrollSnapshot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(snapshot.employees.len(), 1);
        assert_eq!(snapshot.pay_periods[0].month, "January");
        assert!(snapshot.loans.is_empty());
    }
}
