//! Application state for the Payslip Calculation Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::{ConfigLoader, EngineConfig};
use crate::store::InMemoryPayroll;

/// Shared application state.
///
/// Holds the loaded configuration and the payroll store every handler
/// reads from and writes to.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    store: Arc<InMemoryPayroll>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ConfigLoader, store: InMemoryPayroll) -> Self {
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        self.config.config()
    }

    /// Returns the payroll store.
    pub fn store(&self) -> &InMemoryPayroll {
        &self.store
    }
}
