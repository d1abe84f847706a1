//! Calculation result models for the Payslip Calculation Engine.
//!
//! This module contains the [`PayslipCalculation`] type and the audit trace
//! structures that record every decision taken while assembling a payslip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LoanRepayment, Payslip, PayslipDetailLine, StatutoryContribution};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate conditions that don't prevent assembly but may
/// require attention, such as a loan balance going negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use payslip_engine::models::AuditTrace;
///
/// let trace = AuditTrace {
///     steps: vec![],
///     warnings: vec![],
///     duration_us: 1234,
/// };
/// assert!(trace.steps.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// Everything one assembly run produces, before it is persisted.
///
/// The loan repayments and the employer contribution are explicit
/// instructions; nothing is mutated until the ledger transaction that
/// writes the payslip executes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipCalculation {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The aggregate payslip.
    pub payslip: Payslip,
    /// The itemized ledger, in emission order.
    pub details: Vec<PayslipDetailLine>,
    /// Loan balance decrements to apply with the ledger.
    pub repayments: Vec<LoanRepayment>,
    /// Employer contributions to record against the payslip.
    pub contribution: StatutoryContribution,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_step_serialization() {
        let step = AuditStep {
            step_number: 3,
            rule_id: "working_days".to_string(),
            rule_name: "Working Day Count".to_string(),
            input: serde_json::json!({ "start": "2025-01-01" }),
            output: serde_json::json!({ "working_days": 23 }),
            reasoning: "23 weekdays".to_string(),
        };
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"step_number\":3"));
        assert!(json.contains("\"rule_id\":\"working_days\""));
        assert!(json.contains("\"working_days\":23"));
    }

    #[test]
    fn test_audit_warning_round_trip() {
        let warning = AuditWarning {
            code: "LOAN_BALANCE_NEGATIVE".to_string(),
            message: "Loan 4 balance will fall below zero".to_string(),
            severity: "medium".to_string(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        let parsed: AuditWarning = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, warning);
    }
}
