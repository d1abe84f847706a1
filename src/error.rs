//! Error types for the Payslip Calculation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while assembling a payslip.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for the Payslip Calculation Engine.
///
/// Any error aborts the whole assembly before anything is persisted, so a
/// caller never observes a partially written payslip or ledger.
///
/// # Example
///
/// ```
/// use payslip_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     entity: "employee",
///     id: 42,
/// };
/// assert_eq!(error.to_string(), "employee not found: 42");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record (e.g. "employee", "pay period").
        entity: &'static str,
        /// The identifier that was looked up.
        id: u64,
    },

    /// The period contains no working days.
    #[error("Invalid period {start} to {end}: no working days")]
    InvalidPeriod {
        /// The first day of the period.
        start: NaiveDate,
        /// The last day of the period.
        end: NaiveDate,
    },

    /// A request field failed validation.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// A collaborator query failed while gathering inputs.
    #[error("Aggregation failed in {source_name}: {message}")]
    AggregationFailure {
        /// The collaborator that failed.
        source_name: String,
        /// A description of the failure.
        message: String,
    },

    /// A payslip already exists for this employee and pay period.
    #[error("Payslip already exists for employee {employee_id} in pay period {pay_period_id}")]
    DuplicatePayslip {
        /// The employee.
        employee_id: u64,
        /// The pay period.
        pay_period_id: u64,
    },

    /// The detail ledger does not reconcile with the payslip totals.
    #[error("Ledger imbalance: expected net {expected}, ledger yields {actual}")]
    LedgerImbalance {
        /// Net salary on the payslip.
        expected: Decimal,
        /// Net salary reproduced from the ledger.
        actual: Decimal,
    },

    /// The persistence collaborator failed.
    #[error("Persistence error: {message}")]
    Persistence {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
