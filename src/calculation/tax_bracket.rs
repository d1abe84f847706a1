//! Progressive income tax.
//!
//! Brackets are consumed in ascending order of their minimum. A bounded
//! bracket absorbs at most its width; the open-ended top bracket (maximum
//! of zero) absorbs at most `min_salary`. Tax stops accruing once the
//! remaining salary reaches zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AuditStep, TaxBracket};

use super::round_money;

/// The tax charged within one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketCharge {
    /// Lower bound of the bracket.
    pub min_salary: Decimal,
    /// Upper bound of the bracket, zero when open-ended.
    pub max_salary: Decimal,
    /// Rate in percent.
    pub rate: Decimal,
    /// Salary taxed in this bracket.
    pub taxable: Decimal,
    /// Unrounded tax for this bracket.
    pub tax: Decimal,
}

/// The result of applying a bracket schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    /// Total tax, rounded to the currency scale.
    pub tax: Decimal,
    /// Per-bracket breakdown, in consumption order.
    pub charges: Vec<BracketCharge>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Applies a progressive bracket schedule to a gross salary.
///
/// `brackets` may arrive in any order; they are sorted by minimum first.
/// Per-bracket amounts keep full precision and only the total is rounded.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_tax;
/// use payslip_engine::models::TaxBracket;
/// use rust_decimal::Decimal;
///
/// let brackets = vec![TaxBracket {
///     min_salary: Decimal::ZERO,
///     max_salary: Decimal::new(100_000, 0),
///     rate: Decimal::new(5, 0),
/// }];
/// let result = calculate_tax(Decimal::new(65_000, 0), &brackets, 2, 1);
/// assert_eq!(result.tax, Decimal::new(3_250, 0));
/// ```
pub fn calculate_tax(
    gross_salary: Decimal,
    brackets: &[TaxBracket],
    currency_scale: u32,
    step_number: u32,
) -> TaxResult {
    let mut ordered: Vec<&TaxBracket> = brackets.iter().collect();
    ordered.sort_by(|a, b| a.min_salary.cmp(&b.min_salary));

    let hundred = Decimal::ONE_HUNDRED;
    let mut remaining = gross_salary;
    let mut total = Decimal::ZERO;
    let mut charges = Vec::new();

    for bracket in ordered {
        if remaining <= Decimal::ZERO {
            break;
        }

        let capacity = if bracket.is_open_ended() {
            bracket.min_salary
        } else {
            bracket.max_salary - bracket.min_salary
        };
        let taxable = remaining.min(capacity);

        if taxable > Decimal::ZERO {
            let tax = taxable * bracket.rate / hundred;
            total += tax;
            charges.push(BracketCharge {
                min_salary: bracket.min_salary,
                max_salary: bracket.max_salary,
                rate: bracket.rate,
                taxable,
                tax,
            });
            remaining -= taxable;
        }
    }

    let tax = round_money(total, currency_scale);

    let audit_step = AuditStep {
        step_number,
        rule_id: "tax_brackets".to_string(),
        rule_name: "Progressive Tax".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "bracket_count": brackets.len()
        }),
        output: serde_json::json!({
            "tax": tax.to_string(),
            "untaxed_remainder": remaining.max(Decimal::ZERO).to_string(),
            "charges": charges
                .iter()
                .map(|c| serde_json::json!({
                    "min_salary": c.min_salary.to_string(),
                    "max_salary": c.max_salary.to_string(),
                    "rate": c.rate.to_string(),
                    "taxable": c.taxable.to_string(),
                    "tax": c.tax.to_string()
                }))
                .collect::<Vec<_>>()
        }),
        reasoning: format!(
            "Gross {} taxed across {} bracket(s): {}",
            gross_salary,
            charges.len(),
            tax
        ),
    };

    TaxResult {
        tax,
        charges,
        audit_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn bracket(min: &str, max: &str, rate: &str) -> TaxBracket {
        TaxBracket {
            min_salary: dec(min),
            max_salary: dec(max),
            rate: dec(rate),
        }
    }

    fn two_tier() -> Vec<TaxBracket> {
        vec![bracket("0", "100000", "5"), bracket("100000", "0", "10")]
    }

    #[test]
    fn test_salary_within_first_bracket() {
        let result = calculate_tax(dec("65000"), &two_tier(), 2, 1);
        assert_eq!(result.tax, dec("3250"));
        assert_eq!(result.charges.len(), 1);
    }

    #[test]
    fn test_open_ended_bracket_capped_at_its_minimum() {
        // 100000 @ 5% + min(150000, 100000) @ 10% = 5000 + 10000
        let result = calculate_tax(dec("250000"), &two_tier(), 2, 1);
        assert_eq!(result.tax, dec("15000"));
        assert_eq!(result.charges[1].taxable, dec("100000"));
        assert_eq!(
            dec(result.audit_step.output["untaxed_remainder"].as_str().unwrap()),
            dec("50000")
        );
    }

    #[test]
    fn test_open_ended_bracket_from_zero_taxes_nothing() {
        let brackets = vec![bracket("0", "0", "10")];
        let result = calculate_tax(dec("100000"), &brackets, 2, 1);
        assert_eq!(result.tax, Decimal::ZERO);
        assert!(result.charges.is_empty());
    }

    #[test]
    fn test_inverted_bracket_does_not_inflate_remaining() {
        // Capacity of the first bracket is -10000; it must not add salary back.
        let brackets = vec![bracket("0", "-10000", "5"), bracket("10", "200010", "10")];
        let result = calculate_tax(dec("100000"), &brackets, 2, 1);
        assert_eq!(result.tax, dec("10000"));
        assert_eq!(result.charges.len(), 1);
        assert_eq!(result.charges[0].taxable, dec("100000"));
    }

    #[test]
    fn test_brackets_sorted_before_use() {
        let mut brackets = two_tier();
        brackets.reverse();
        let result = calculate_tax(dec("120000"), &brackets, 2, 1);
        // 100000 @ 5% + 20000 @ 10%
        assert_eq!(result.tax, dec("7000"));
    }

    #[test]
    fn test_zero_and_negative_gross_owe_nothing() {
        assert_eq!(calculate_tax(Decimal::ZERO, &two_tier(), 2, 1).tax, Decimal::ZERO);
        assert_eq!(calculate_tax(dec("-10"), &two_tier(), 2, 1).tax, Decimal::ZERO);
    }

    #[test]
    fn test_empty_schedule_owes_nothing() {
        assert_eq!(calculate_tax(dec("500000"), &[], 2, 1).tax, Decimal::ZERO);
    }

    #[test]
    fn test_total_rounded_once() {
        let brackets = vec![bracket("0", "1000", "3.333"), bracket("1000", "2000", "6.667")];
        // 1000 * 3.333% = 33.33 ; 500.55 * 6.667% = 33.3716685
        let result = calculate_tax(dec("1500.55"), &brackets, 2, 1);
        assert_eq!(result.tax, dec("66.70"));
    }

    #[test]
    fn test_audit_step_fields() {
        let result = calculate_tax(dec("65000"), &two_tier(), 2, 7);
        assert_eq!(result.audit_step.step_number, 7);
        assert_eq!(result.audit_step.rule_id, "tax_brackets");
        assert_eq!(
            dec(result.audit_step.output["tax"].as_str().unwrap()),
            dec("3250")
        );
    }

    proptest! {
        #[test]
        fn prop_tax_is_idempotent_and_bounded(gross in 0i64..100_000_000) {
            let gross = Decimal::new(gross, 2);
            let first = calculate_tax(gross, &two_tier(), 2, 1);
            let second = calculate_tax(gross, &two_tier(), 2, 1);
            prop_assert_eq!(&first, &second);
            prop_assert!(first.tax >= Decimal::ZERO);
            prop_assert!(first.tax <= gross);
        }
    }
}
