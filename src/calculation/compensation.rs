//! Allowance and commission aggregation.
//!
//! Allowances are bucketed on two axes, fixed vs periodic and tax-liable
//! vs tax-excluded, giving four independent lookups. Commissions have no
//! fixed axis and need two. The raw lines are kept, in lookup order, for
//! ledger emission.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{AllowanceLine, AuditStep, CommissionLine, PayPeriodId, PeriodFilter, SalaryId};
use crate::store::PayrollRepository;

/// Allowances for one salary profile and pay period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceBuckets {
    /// Fixed allowances liable to tax.
    pub fixed_liable: Vec<AllowanceLine>,
    /// Periodic allowances liable to tax.
    pub periodic_liable: Vec<AllowanceLine>,
    /// Fixed allowances excluded from tax.
    pub fixed_excluded: Vec<AllowanceLine>,
    /// Periodic allowances excluded from tax.
    pub periodic_excluded: Vec<AllowanceLine>,
}

impl AllowanceBuckets {
    /// Sum of fixed and periodic tax-liable allowances.
    pub fn tax_liable_total(&self) -> Decimal {
        sum(&self.fixed_liable) + sum(&self.periodic_liable)
    }

    /// Sum of fixed and periodic tax-excluded allowances.
    pub fn tax_excluded_total(&self) -> Decimal {
        sum(&self.fixed_excluded) + sum(&self.periodic_excluded)
    }

    /// Every line, in ledger order.
    pub fn lines(&self) -> impl Iterator<Item = &AllowanceLine> {
        self.fixed_liable
            .iter()
            .chain(&self.periodic_liable)
            .chain(&self.fixed_excluded)
            .chain(&self.periodic_excluded)
    }
}

/// Commissions for one salary profile and pay period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionBuckets {
    /// Commissions liable to tax.
    pub liable: Vec<CommissionLine>,
    /// Commissions excluded from tax.
    pub excluded: Vec<CommissionLine>,
}

impl CommissionBuckets {
    /// Sum of tax-liable commissions.
    pub fn tax_liable_total(&self) -> Decimal {
        self.liable.iter().map(|c| c.amount).sum()
    }

    /// Sum of tax-excluded commissions.
    pub fn tax_excluded_total(&self) -> Decimal {
        self.excluded.iter().map(|c| c.amount).sum()
    }

    /// Every line, in ledger order.
    pub fn lines(&self) -> impl Iterator<Item = &CommissionLine> {
        self.liable.iter().chain(&self.excluded)
    }
}

fn sum(lines: &[AllowanceLine]) -> Decimal {
    lines.iter().map(|a| a.amount).sum()
}

/// The result of aggregating compensation for a payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationResult {
    /// Allowance lines by bucket.
    pub allowances: AllowanceBuckets,
    /// Commission lines by bucket.
    pub commissions: CommissionBuckets,
    /// The audit step recording the totals.
    pub audit_step: AuditStep,
}

/// Pulls the allowances of a salary profile for a pay period.
///
/// Fixed allowances carry no period reference and match any period.
pub fn collect_allowances(
    repository: &dyn PayrollRepository,
    salary_id: SalaryId,
    pay_period_id: PayPeriodId,
) -> EngineResult<AllowanceBuckets> {
    let period = PeriodFilter::Period(pay_period_id);
    Ok(AllowanceBuckets {
        fixed_liable: repository.allowances(salary_id, PeriodFilter::Any, true, true)?,
        periodic_liable: repository.allowances(salary_id, period, false, true)?,
        fixed_excluded: repository.allowances(salary_id, PeriodFilter::Any, true, false)?,
        periodic_excluded: repository.allowances(salary_id, period, false, false)?,
    })
}

/// Pulls the commissions of a salary profile for a pay period.
pub fn collect_commissions(
    repository: &dyn PayrollRepository,
    salary_id: SalaryId,
    pay_period_id: PayPeriodId,
) -> EngineResult<CommissionBuckets> {
    let period = PeriodFilter::Period(pay_period_id);
    Ok(CommissionBuckets {
        liable: repository.commissions(salary_id, period, true)?,
        excluded: repository.commissions(salary_id, period, false)?,
    })
}

/// Aggregates allowances and commissions and records the totals.
///
/// Empty lookups are not errors; they contribute zero.
pub fn aggregate_compensation(
    repository: &dyn PayrollRepository,
    salary_id: SalaryId,
    pay_period_id: PayPeriodId,
    step_number: u32,
) -> EngineResult<CompensationResult> {
    let allowances = collect_allowances(repository, salary_id, pay_period_id)?;
    let commissions = collect_commissions(repository, salary_id, pay_period_id)?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "compensation".to_string(),
        rule_name: "Allowance and Commission Aggregation".to_string(),
        input: serde_json::json!({
            "salary_id": salary_id,
            "pay_period_id": pay_period_id
        }),
        output: serde_json::json!({
            "tax_liable_allowances": allowances.tax_liable_total().to_string(),
            "tax_excluded_allowances": allowances.tax_excluded_total().to_string(),
            "tax_liable_commissions": commissions.tax_liable_total().to_string(),
            "tax_excluded_commissions": commissions.tax_excluded_total().to_string(),
            "allowance_lines": allowances.lines().count(),
            "commission_lines": commissions.lines().count()
        }),
        reasoning: format!(
            "{} allowance and {} commission lines for salary {} in period {}",
            allowances.lines().count(),
            commissions.lines().count(),
            salary_id,
            pay_period_id
        ),
    };

    Ok(CompensationResult {
        allowances,
        commissions,
        audit_step,
    })
}
