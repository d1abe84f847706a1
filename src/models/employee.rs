//! Employee and salary profile models.
//!
//! This module defines the slice of an employee record the engine needs
//! (identity and hire date) and the [`SalaryProfile`] holding basic salary.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EmployeeId, SalaryId};

/// Represents an employee whose payslip is being calculated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: EmployeeId,
    /// Display name, used only in logs and reports.
    #[serde(default)]
    pub name: String,
    /// The date the employee joined.
    pub hire_date: NaiveDate,
}

/// The salary profile of an employee.
///
/// Only one profile is active per employee at a time; that is maintained
/// by whoever manages salary records, not by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryProfile {
    /// Unique identifier for the salary profile.
    pub id: SalaryId,
    /// The employee this profile belongs to.
    pub employee_id: EmployeeId,
    /// Monthly basic salary before proration.
    pub basic_salary: Decimal,
    /// First day the profile is valid.
    pub valid_from: NaiveDate,
    /// Last day the profile is valid, if bounded.
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

impl SalaryProfile {
    /// Returns true if the profile is valid on `date`.
    ///
    /// # Examples
    ///
    /// ```
    /// use payslip_engine::models::SalaryProfile;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let profile = SalaryProfile {
    ///     id: 1,
    ///     employee_id: 1,
    ///     basic_salary: Decimal::new(60_000, 0),
    ///     valid_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ///     valid_to: None,
    /// };
    /// assert!(profile.is_valid_on(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    /// ```
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        date >= self.valid_from && self.valid_to.is_none_or(|to| date <= to)
    }
}
