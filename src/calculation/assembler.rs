//! Payslip assembly.
//!
//! [`PayslipAssembler::prepare`] reads every input through the repository,
//! runs the calculators and produces a [`PayslipCalculation`]: the payslip,
//! its ledger, the loan repayments and the employer contribution, with an
//! audit trace. Nothing is written. [`PayslipAssembler::commit`] then writes
//! all of it in one ledger transaction, or none of it.

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, DetailSource, EmployeeId, PayPeriodId, Payslip,
    PayslipCalculation, PayslipDetailLine, PayslipId, PayslipStatus, StatutoryContribution,
};
use crate::store::{PayrollLedger, PayrollRepository};

use super::{
    aggregate_compensation, calculate_leave_deduction, calculate_loan_installments,
    calculate_statutory, calculate_tax, calculate_working_days, prorate_basic_salary,
    round_money,
};

/// Inputs of one assembly run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyRequest {
    /// The employee to pay.
    pub employee_id: EmployeeId,
    /// The pay period to pay for.
    pub pay_period_id: PayPeriodId,
    /// Attendance deduction decided by the caller; must not be negative.
    pub attendance_deduction: Decimal,
    /// Overrides the pay period's start date.
    pub start_date: Option<NaiveDate>,
    /// Overrides the pay period's end date.
    pub end_date: Option<NaiveDate>,
    /// Workflow status stamped on the payslip.
    pub status: PayslipStatus,
}

impl AssemblyRequest {
    /// A request over the pay period's own dates, with no attendance
    /// deduction, producing a draft payslip.
    pub fn new(employee_id: EmployeeId, pay_period_id: PayPeriodId) -> Self {
        Self {
            employee_id,
            pay_period_id,
            attendance_deduction: Decimal::ZERO,
            start_date: None,
            end_date: None,
            status: PayslipStatus::Draft,
        }
    }
}

/// A committed payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledPayslip {
    /// The id the ledger assigned.
    pub payslip_id: PayslipId,
    /// Everything that was written.
    pub calculation: PayslipCalculation,
}

/// Orchestrates the calculators into one payslip.
///
/// # Example
///
/// ```
/// use payslip_engine::calculation::{AssemblyRequest, PayslipAssembler};
/// use payslip_engine::config::EngineConfig;
/// use payslip_engine::error::EngineError;
/// use payslip_engine::store::{InMemoryPayroll, PayrollSnapshot};
///
/// let config = EngineConfig::default();
/// let store = InMemoryPayroll::new(PayrollSnapshot::default(), config.clone());
/// let assembler = PayslipAssembler::new(&config, &store, &store);
///
/// let result = assembler.prepare(&AssemblyRequest::new(1, 1));
/// assert!(matches!(result, Err(EngineError::NotFound { entity: "employee", .. })));
/// ```
pub struct PayslipAssembler<'a> {
    config: &'a EngineConfig,
    repository: &'a dyn PayrollRepository,
    ledger: &'a dyn PayrollLedger,
}

impl<'a> PayslipAssembler<'a> {
    /// Creates an assembler over the given collaborators.
    pub fn new(
        config: &'a EngineConfig,
        repository: &'a dyn PayrollRepository,
        ledger: &'a dyn PayrollLedger,
    ) -> Self {
        Self {
            config,
            repository,
            ledger,
        }
    }

    /// Prepares and commits a payslip.
    pub fn assemble(&self, request: &AssemblyRequest) -> EngineResult<AssembledPayslip> {
        let calculation = self.prepare(request)?;
        self.commit(calculation)
    }

    /// Computes a payslip without writing anything.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a negative attendance deduction
    /// - `NotFound` for a missing employee, salary profile or pay period
    /// - `InvalidPeriod` when the period has no working days
    /// - any error a repository query returns
    /// - `LedgerImbalance` if the ledger fails to reconcile
    pub fn prepare(&self, request: &AssemblyRequest) -> EngineResult<PayslipCalculation> {
        info!(
            employee_id = request.employee_id,
            pay_period_id = request.pay_period_id,
            "Preparing payslip"
        );

        self.build(request).inspect_err(|err| {
            warn!(
                employee_id = request.employee_id,
                pay_period_id = request.pay_period_id,
                error = %err,
                "Payslip preparation aborted"
            );
        })
    }

    /// Writes a prepared payslip, its ledger, the loan repayments and the
    /// employer contribution in one transaction.
    ///
    /// If any write fails the transaction is dropped uncommitted and
    /// nothing is persisted.
    pub fn commit(&self, calculation: PayslipCalculation) -> EngineResult<AssembledPayslip> {
        let payslip = &calculation.payslip;
        payslip.reconcile(&calculation.details)?;

        match self.write(&calculation) {
            Ok(payslip_id) => {
                info!(
                    payslip_id,
                    employee_id = payslip.employee_id,
                    pay_period_id = payslip.pay_period_id,
                    net_salary = %payslip.net_salary,
                    detail_lines = calculation.details.len(),
                    "Payslip committed"
                );
                Ok(AssembledPayslip {
                    payslip_id,
                    calculation,
                })
            }
            Err(err) => {
                warn!(
                    employee_id = payslip.employee_id,
                    pay_period_id = payslip.pay_period_id,
                    error = %err,
                    "Payslip commit rolled back"
                );
                Err(err)
            }
        }
    }

    fn write(&self, calculation: &PayslipCalculation) -> EngineResult<PayslipId> {
        let mut tx = self.ledger.begin()?;
        let payslip_id = tx.insert_payslip(&calculation.payslip)?;
        for line in &calculation.details {
            tx.append_detail(payslip_id, line)?;
        }
        for repayment in &calculation.repayments {
            tx.apply_installment(repayment)?;
        }
        let contribution = &calculation.contribution;
        if contribution.employer_epf > Decimal::ZERO || contribution.employer_etf > Decimal::ZERO {
            tx.record_contribution(payslip_id, contribution)?;
        }
        tx.commit()?;
        Ok(payslip_id)
    }

    fn build(&self, request: &AssemblyRequest) -> EngineResult<PayslipCalculation> {
        let start_time = Instant::now();
        let scale = self.config.currency_scale();
        let mut steps = Vec::new();
        let mut warnings: Vec<AuditWarning> = Vec::new();
        let mut step_number: u32 = 1;

        if request.attendance_deduction < Decimal::ZERO {
            return Err(EngineError::InvalidInput {
                field: "attendance_deduction".to_string(),
                message: format!("must not be negative, got {}", request.attendance_deduction),
            });
        }

        let employee = self.repository.employee(request.employee_id)?;
        let profile = self.repository.salary_by_employee(employee.id)?;
        let period = self.repository.pay_period(request.pay_period_id)?;
        let start = request.start_date.unwrap_or(period.start_date);
        let end = request.end_date.unwrap_or(period.end_date);

        // Basic salary
        let proration = prorate_basic_salary(
            profile.basic_salary,
            employee.hire_date,
            start,
            end,
            scale,
            step_number,
        );
        let basic_salary = proration.basic_salary;
        steps.push(proration.audit_step);
        step_number += 1;

        // Working days and no-pay leave
        let calendar = calculate_working_days(start, end, step_number)?;
        let working_days = calendar.working_days;
        steps.push(calendar.audit_step);
        step_number += 1;

        let unpaid_days = self.repository.unpaid_leave_days(employee.id, start, end)?;
        let leave = calculate_leave_deduction(basic_salary, working_days, unpaid_days, scale, step_number);
        let leave_deduction = leave.deduction;
        steps.push(leave.audit_step);
        step_number += 1;

        debug!(
            employee_id = employee.id,
            basic_salary = %basic_salary,
            prorated = proration.prorated,
            working_days,
            leave_deduction = %leave_deduction,
            "Basic salary resolved"
        );

        // Allowances, commissions and gross
        let compensation =
            aggregate_compensation(self.repository, profile.id, period.id, step_number)?;
        steps.push(compensation.audit_step);
        step_number += 1;
        let allowances = compensation.allowances;
        let commissions = compensation.commissions;

        let tax_liable_allowances = allowances.tax_liable_total();
        let tax_excluded_allowances = allowances.tax_excluded_total();
        let tax_liable_commissions = commissions.tax_liable_total();
        let tax_excluded_commissions = commissions.tax_excluded_total();
        let gross_salary = basic_salary + tax_liable_allowances + tax_liable_commissions;

        // Tax
        let brackets = self.repository.brackets_for(gross_salary)?;
        let tax = calculate_tax(gross_salary, &brackets, scale, step_number);
        let tax_deduction = tax.tax;
        steps.push(tax.audit_step);
        step_number += 1;

        debug!(
            employee_id = employee.id,
            gross_salary = %gross_salary,
            tax_deduction = %tax_deduction,
            "Gross salary taxed"
        );

        // Advances and loans
        let advances = self
            .repository
            .pending_advances(employee.id, period.id)?;
        let salary_advance_deduction: Decimal = advances.iter().map(|a| a.amount).sum();

        let loans = self.repository.ongoing_loans(employee.id)?;
        let installments =
            calculate_loan_installments(&loans, self.config.balance_floor(), scale, step_number);
        let loan_deduction = installments.total;
        steps.push(installments.audit_step);
        step_number += 1;
        warnings.extend(installments.warnings);

        // Statutory contributions
        let statutory = calculate_statutory(basic_salary, self.config.statutory(), scale, step_number);
        let epf_deduction = statutory.employee_epf;
        steps.push(statutory.audit_step);
        step_number += 1;

        let attendance_deduction = round_money(request.attendance_deduction, scale);

        let mut payslip = Payslip {
            employee_id: employee.id,
            salary_id: profile.id,
            pay_period_id: period.id,
            start_date: start,
            end_date: end,
            status: request.status,
            working_days,
            basic_salary,
            gross_salary,
            net_salary: Decimal::ZERO,
            tax_liable_allowances,
            tax_excluded_allowances,
            tax_liable_commissions,
            tax_excluded_commissions,
            tax_deduction,
            epf_deduction,
            salary_advance_deduction,
            loan_deduction,
            attendance_deduction,
            leave_deduction,
        };
        payslip.net_salary = payslip.expected_net()?;
        let total_deductions = payslip.total_deductions()?;

        if payslip.net_salary < Decimal::ZERO {
            warnings.push(AuditWarning {
                code: "NEGATIVE_NET_SALARY".to_string(),
                message: format!("Deductions exceed earnings; net salary is {}", payslip.net_salary),
                severity: "high".to_string(),
            });
        }

        // Ledger, in emission order
        let mut details = Vec::new();
        if tax_deduction > Decimal::ZERO {
            details.push(PayslipDetailLine::deduction(
                DetailSource::Synthetic,
                "Tax Deduction",
                tax_deduction,
            ));
        }
        details.extend(allowances.lines().map(|a| {
            PayslipDetailLine::addition(
                DetailSource::Allowance { allowance_id: a.id },
                a.name.clone(),
                a.amount,
            )
        }));
        details.extend(commissions.lines().map(|c| {
            PayslipDetailLine::addition(
                DetailSource::Commission { commission_id: c.id },
                c.name.clone(),
                c.amount,
            )
        }));
        details.extend(advances.iter().map(|a| {
            PayslipDetailLine::deduction(
                DetailSource::Advance { advance_id: a.id },
                "Salary Advance",
                a.amount,
            )
        }));
        details.extend(installments.installments.iter().map(|i| {
            PayslipDetailLine::deduction(
                DetailSource::Loan { loan_id: i.loan_id },
                "Loan Installment",
                i.amount,
            )
        }));
        for (description, amount) in [
            ("EPF Deduction", epf_deduction),
            ("Attendance Deduction", attendance_deduction),
            ("No-Pay Leave Deduction", leave_deduction),
        ] {
            if amount > Decimal::ZERO {
                details.push(PayslipDetailLine::deduction(
                    DetailSource::Synthetic,
                    description,
                    amount,
                ));
            }
        }

        payslip.reconcile(&details)?;

        steps.push(AuditStep {
            step_number,
            rule_id: "net_salary".to_string(),
            rule_name: "Net Salary".to_string(),
            input: serde_json::json!({
                "gross_salary": gross_salary.to_string(),
                "tax_excluded_allowances": tax_excluded_allowances.to_string(),
                "tax_excluded_commissions": tax_excluded_commissions.to_string(),
                "total_deductions": total_deductions.to_string()
            }),
            output: serde_json::json!({
                "net_salary": payslip.net_salary.to_string(),
                "detail_lines": details.len()
            }),
            reasoning: format!(
                "({} + {} + {}) - {} = {}",
                gross_salary,
                tax_excluded_allowances,
                tax_excluded_commissions,
                total_deductions,
                payslip.net_salary
            ),
        });

        let contribution = StatutoryContribution {
            employee_id: employee.id,
            pay_period_id: period.id,
            employer_epf: statutory.employer_epf,
            employer_etf: statutory.employer_etf,
        };

        let duration_us = start_time.elapsed().as_micros() as u64;

        debug!(
            employee_id = employee.id,
            net_salary = %payslip.net_salary,
            detail_lines = details.len(),
            repayments = installments.repayments.len(),
            duration_us,
            "Payslip prepared"
        );

        Ok(PayslipCalculation {
            calculation_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            payslip,
            details,
            repayments: installments.repayments,
            contribution,
            audit_trace: AuditTrace {
                steps,
                warnings,
                duration_us,
            },
        })
    }
}
