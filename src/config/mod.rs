//! Configuration loading and management for the Payslip Calculation Engine.
//!
//! This module loads payroll options (rounding, statutory rates, loan
//! balance policy) and the tax bracket schedule from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payslip_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config/default").unwrap();
//! println!("Rounding to {} places", loader.config().currency_scale());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{EngineConfig, LoanPolicy, PayrollConfig, StatutoryRates, TaxScheduleConfig};
