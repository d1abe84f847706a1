//! HTTP API module for the Payslip Calculation Engine.
//!
//! This module provides the REST endpoints for assembling and previewing
//! payslips, reading them back, and the yearly reports.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::PayslipRequest;
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
