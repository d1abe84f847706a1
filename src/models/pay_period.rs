//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type: the named, immutable date
//! range that every payslip calculation is run against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PayPeriodId;

/// Represents a pay period with its date range and label.
///
/// # Example
///
/// ```
/// use payslip_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod {
///     id: 1,
///     start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
///     month: "January".to_string(),
///     year: 2025,
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
/// assert_eq!(period.total_days(), 31);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// Unique identifier for the pay period.
    pub id: PayPeriodId,
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
    /// The month label (e.g., "January").
    pub month: String,
    /// The payroll year this period belongs to.
    pub year: i32,
}

impl PayPeriod {
    /// Checks if a given date falls within this pay period.
    ///
    /// The check is inclusive of both start and end dates.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of calendar days in the period, both ends included.
    ///
    /// Returns 0 when the end date precedes the start date.
    pub fn total_days(&self) -> i64 {
        ((self.end_date - self.start_date).num_days() + 1).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn january() -> PayPeriod {
        PayPeriod {
            id: 1,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            month: "January".to_string(),
            year: 2025,
        }
    }

    #[test]
    fn test_contains_date_within_period() {
        let period = january();
        assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()));
    }

    #[test]
    fn test_contains_date_on_boundaries() {
        let period = january();
        assert!(period.contains_date(period.start_date));
        assert!(period.contains_date(period.end_date));
    }

    #[test]
    fn test_contains_date_outside_period() {
        let period = january();
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
    }

    #[test]
    fn test_total_days_is_inclusive() {
        assert_eq!(january().total_days(), 31);
    }

    #[test]
    fn test_total_days_for_reversed_range_is_zero() {
        let mut period = january();
        period.end_date = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(period.total_days(), 0);
    }

    #[test]
    fn test_deserialize_pay_period() {
        let json = r#"{
            "id": 4,
            "start_date": "2025-04-01",
            "end_date": "2025-04-30",
            "month": "April",
            "year": 2025
        }"#;
        let period: PayPeriod = serde_json::from_str(json).unwrap();
        assert_eq!(period.id, 4);
        assert_eq!(period.month, "April");
        assert_eq!(period.total_days(), 30);
    }
}
