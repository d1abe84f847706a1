//! Tax bracket model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tier of a progressive income-tax schedule.
///
/// A `max_salary` of zero marks the open-ended top bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Lower bound of the bracket (inclusive).
    pub min_salary: Decimal,
    /// Upper bound of the bracket; zero means no upper bound.
    pub max_salary: Decimal,
    /// Tax rate in percent.
    pub rate: Decimal,
}

impl TaxBracket {
    /// Returns true for the open-ended top bracket.
    pub fn is_open_ended(&self) -> bool {
        self.max_salary.is_zero()
    }
}
