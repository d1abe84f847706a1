//! Yearly payroll reports over stored payslips.
//!
//! Both reports select payslips through their pay period's `year`, not
//! through the payslip dates.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{EmployeeId, PayPeriod, PayPeriodId, Payslip};

/// Totals of one pay period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemunerationSummary {
    /// The pay period.
    pub pay_period_id: PayPeriodId,
    /// The pay period's month label.
    pub month: String,
    /// Tax-excluded allowances plus tax-excluded commissions.
    pub tax_excluded_remuneration: Decimal,
    /// Tax-liable allowances plus tax-liable commissions.
    pub tax_liable_remuneration: Decimal,
    /// Tax deducted.
    pub tax_deduction: Decimal,
    /// Net salaries paid.
    pub payments_made: Decimal,
}

/// Tax deduction and remuneration for one payroll year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAndRemunerationReport {
    /// The payroll year.
    pub year: i32,
    /// One row per pay period with payslips, in date order.
    pub months: Vec<RemunerationSummary>,
    /// Sum of `tax_excluded_remuneration` over all rows.
    pub total_tax_excluded_remuneration: Decimal,
    /// Sum of `tax_liable_remuneration` over all rows.
    pub total_tax_liable_remuneration: Decimal,
    /// Sum of `tax_deduction` over all rows.
    pub total_tax_deduction: Decimal,
    /// Sum of `payments_made` over all rows.
    pub total_payments_made: Decimal,
}

/// Employees whose annual gross falls in one band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrossBandCount {
    /// The band label, e.g. `"1,200,001 - 1,700,000"`.
    pub salary_range: String,
    /// Number of employees in the band.
    pub employee_count: u64,
}

/// Upper bounds (inclusive) and labels of the annual gross bands.
///
/// Anything above the last bound falls in [`TOP_GROSS_BAND`].
pub const GROSS_BANDS: [(i64, &str); 6] = [
    (1_200_000, "0 - 1,200,000"),
    (1_700_000, "1,200,001 - 1,700,000"),
    (2_200_000, "1,700,001 - 2,200,000"),
    (2_700_000, "2,200,001 - 2,700,000"),
    (3_200_000, "2,700,001 - 3,200,000"),
    (3_700_000, "3,200,001 - 3,700,000"),
];

/// Label of the open-ended top band.
pub const TOP_GROSS_BAND: &str = "3,700,000+";

/// Returns the index of the band an annual gross falls in.
///
/// Bands are contiguous, so a fractional amount such as 1,200,000.50 lands
/// in the second band rather than between two.
fn band_index(annual_gross: Decimal) -> usize {
    GROSS_BANDS
        .iter()
        .position(|(upper, _)| annual_gross <= Decimal::from(*upper))
        .unwrap_or(GROSS_BANDS.len())
}

fn band_label(index: usize) -> &'static str {
    GROSS_BANDS
        .get(index)
        .map(|(_, label)| *label)
        .unwrap_or(TOP_GROSS_BAND)
}

fn periods_of_year(year: i32, periods: &[PayPeriod]) -> HashMap<PayPeriodId, &PayPeriod> {
    periods
        .iter()
        .filter(|p| p.year == year)
        .map(|p| (p.id, p))
        .collect()
}

/// Builds the tax deduction and remuneration report for a year.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::tax_and_remuneration_report;
///
/// let report = tax_and_remuneration_report(2025, &[], &[]);
/// assert!(report.months.is_empty());
/// assert!(report.total_payments_made.is_zero());
/// ```
pub fn tax_and_remuneration_report(
    year: i32,
    payslips: &[Payslip],
    periods: &[PayPeriod],
) -> TaxAndRemunerationReport {
    let in_year = periods_of_year(year, periods);
    let mut rows: HashMap<PayPeriodId, RemunerationSummary> = HashMap::new();

    for payslip in payslips {
        let Some(period) = in_year.get(&payslip.pay_period_id) else {
            continue;
        };
        let row = rows
            .entry(period.id)
            .or_insert_with(|| RemunerationSummary {
                pay_period_id: period.id,
                month: period.month.clone(),
                tax_excluded_remuneration: Decimal::ZERO,
                tax_liable_remuneration: Decimal::ZERO,
                tax_deduction: Decimal::ZERO,
                payments_made: Decimal::ZERO,
            });
        row.tax_excluded_remuneration +=
            payslip.tax_excluded_allowances + payslip.tax_excluded_commissions;
        row.tax_liable_remuneration +=
            payslip.tax_liable_allowances + payslip.tax_liable_commissions;
        row.tax_deduction += payslip.tax_deduction;
        row.payments_made += payslip.net_salary;
    }

    let mut months: Vec<RemunerationSummary> = rows.into_values().collect();
    months.sort_by_key(|row| {
        in_year
            .get(&row.pay_period_id)
            .map(|p| (p.start_date, p.id))
    });

    TaxAndRemunerationReport {
        year,
        total_tax_excluded_remuneration: months.iter().map(|m| m.tax_excluded_remuneration).sum(),
        total_tax_liable_remuneration: months.iter().map(|m| m.tax_liable_remuneration).sum(),
        total_tax_deduction: months.iter().map(|m| m.tax_deduction).sum(),
        total_payments_made: months.iter().map(|m| m.payments_made).sum(),
        months,
    }
}

/// Counts employees by the sum of their gross salary over a year.
///
/// Only bands with at least one employee are returned, lowest band first.
pub fn annual_gross_bands(
    year: i32,
    payslips: &[Payslip],
    periods: &[PayPeriod],
) -> Vec<GrossBandCount> {
    let in_year = periods_of_year(year, periods);

    let mut annual_gross: HashMap<EmployeeId, Decimal> = HashMap::new();
    for payslip in payslips
        .iter()
        .filter(|p| in_year.contains_key(&p.pay_period_id))
    {
        *annual_gross.entry(payslip.employee_id).or_default() += payslip.gross_salary;
    }

    let mut counts: BTreeMap<usize, u64> = BTreeMap::new();
    for gross in annual_gross.values() {
        *counts.entry(band_index(*gross)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(index, employee_count)| GrossBandCount {
            salary_range: band_label(index).to_string(),
            employee_count,
        })
        .collect()
}
