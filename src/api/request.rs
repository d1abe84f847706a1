//! Request types for the Payslip Calculation Engine API.
//!
//! This module defines the JSON request body shared by `POST /payslips`
//! and `POST /payslips/preview`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::AssemblyRequest;
use crate::models::{EmployeeId, PayPeriodId, PayslipStatus};

/// Request body for the payslip endpoints.
///
/// Dates default to the pay period's own dates when omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipRequest {
    /// The employee to pay.
    pub employee_id: EmployeeId,
    /// The pay period to pay for.
    pub pay_period_id: PayPeriodId,
    /// Attendance deduction, zero when omitted.
    #[serde(default)]
    pub attendance_deduction: Decimal,
    /// Overrides the pay period's start date.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Overrides the pay period's end date.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Workflow status, `draft` when omitted.
    #[serde(default)]
    pub status: PayslipStatus,
}

impl From<PayslipRequest> for AssemblyRequest {
    fn from(req: PayslipRequest) -> Self {
        AssemblyRequest {
            employee_id: req.employee_id,
            pay_period_id: req.pay_period_id,
            attendance_deduction: req.attendance_deduction,
            start_date: req.start_date,
            end_date: req.end_date,
            status: req.status,
        }
    }
}
