//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, PayrollConfig, TaxScheduleConfig};

/// Largest rounding scale accepted for money.
const MAX_CURRENCY_SCALE: u32 = 10;

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── payroll.yaml       # Rounding, statutory rates, loan policy
/// └── tax_brackets.yaml  # Progressive tax schedule
/// ```
///
/// # Example
///
/// ```no_run
/// use payslip_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default")?;
/// for bracket in loader.config().tax_brackets() {
///     println!("{} - {} @ {}%", bracket.min_salary, bracket.max_salary, bracket.rate);
/// }
/// # Ok::<(), payslip_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing, contains invalid YAML,
    /// or holds values the engine cannot use (negative rates, an inverted
    /// bracket, an oversized rounding scale).
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let payroll_path = path.join("payroll.yaml");
        let payroll = Self::load_yaml::<PayrollConfig>(&payroll_path)?;
        Self::validate_payroll(&payroll, &payroll_path)?;

        let brackets_path = path.join("tax_brackets.yaml");
        let schedule = Self::load_yaml::<TaxScheduleConfig>(&brackets_path)?;
        Self::validate_schedule(&schedule, &brackets_path)?;

        Ok(Self {
            config: EngineConfig::new(payroll, schedule.brackets),
        })
    }

    /// Wraps an already built configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_payroll(payroll: &PayrollConfig, path: &Path) -> EngineResult<()> {
        if payroll.currency_scale > MAX_CURRENCY_SCALE {
            return Err(Self::invalid(
                path,
                format!(
                    "currency_scale {} exceeds maximum {}",
                    payroll.currency_scale, MAX_CURRENCY_SCALE
                ),
            ));
        }

        let rates = &payroll.statutory;
        for (name, rate) in [
            ("employee_epf_rate", rates.employee_epf_rate),
            ("employer_epf_rate", rates.employer_epf_rate),
            ("employer_etf_rate", rates.employer_etf_rate),
        ] {
            if rate < Decimal::ZERO {
                return Err(Self::invalid(path, format!("{} cannot be negative", name)));
            }
        }
        Ok(())
    }

    fn validate_schedule(schedule: &TaxScheduleConfig, path: &Path) -> EngineResult<()> {
        for (index, bracket) in schedule.brackets.iter().enumerate() {
            if bracket.min_salary < Decimal::ZERO || bracket.rate < Decimal::ZERO {
                return Err(Self::invalid(
                    path,
                    format!("bracket {} has a negative bound or rate", index),
                ));
            }
            if !bracket.is_open_ended() && bracket.max_salary <= bracket.min_salary {
                return Err(Self::invalid(
                    path,
                    format!(
                        "bracket {} max_salary {} is not above min_salary {}",
                        index, bracket.max_salary, bracket.min_salary
                    ),
                ));
            }
        }
        Ok(())
    }

    fn invalid(path: &Path, message: String) -> EngineError {
        EngineError::ConfigParseError {
            path: path.display().to_string(),
            message,
        }
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
