//! Payslip Calculation Engine
//!
//! This crate turns an employee and a pay period into one payslip and its
//! itemized detail ledger: basic salary proration for new hires, a
//! weekday working calendar, no-pay leave deductions, allowance and
//! commission aggregation, a progressive tax-bracket schedule, loan
//! installments and statutory retirement-fund contributions.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
