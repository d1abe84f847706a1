//! Money rounding.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to `scale` decimal places, midpoint away from zero.
///
/// Every figure stored on a payslip or ledger line passes through here
/// exactly once; intermediate values keep full precision.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("10.005").unwrap(), 2), Decimal::from_str("10.01").unwrap());
/// assert_eq!(round_money(Decimal::from_str("-10.005").unwrap(), 2), Decimal::from_str("-10.01").unwrap());
/// ```
pub fn round_money(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}
