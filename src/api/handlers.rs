//! HTTP request handlers for the Payslip Calculation Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    AssemblyRequest, PayslipAssembler, annual_gross_bands, tax_and_remuneration_report,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{PayPeriod, Payslip, PayslipId};

use super::request::PayslipRequest;
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payslips", post(assemble_handler))
        .route("/payslips/preview", post(preview_handler))
        .route("/payslips/:id", get(get_payslip_handler))
        .route(
            "/reports/tax-remuneration/:year",
            get(tax_remuneration_handler),
        )
        .route("/reports/gross-bands/:year", get(gross_bands_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

/// Maps a JSON extraction failure onto a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for POST /payslips.
///
/// Assembles a payslip and commits it together with its ledger, loan
/// repayments and employer contributions.
async fn assemble_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayslipRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payslip request");

    let request: AssemblyRequest = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let store = state.store();
    let assembler = PayslipAssembler::new(state.config(), store, store);

    let start_time = Instant::now();
    match assembler.assemble(&request) {
        Ok(assembled) => {
            info!(
                correlation_id = %correlation_id,
                payslip_id = assembled.payslip_id,
                employee_id = request.employee_id,
                net_salary = %assembled.calculation.payslip.net_salary,
                duration_us = start_time.elapsed().as_micros(),
                "Payslip assembled"
            );
            json_response(StatusCode::CREATED, assembled)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payslips/preview.
///
/// Computes a payslip without persisting anything.
async fn preview_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayslipRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payslip preview");

    let request: AssemblyRequest = match payload {
        Ok(Json(req)) => req.into(),
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let store = state.store();
    let assembler = PayslipAssembler::new(state.config(), store, store);

    match assembler.prepare(&request) {
        Ok(calculation) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = request.employee_id,
                gross_salary = %calculation.payslip.gross_salary,
                "Payslip preview computed"
            );
            json_response(StatusCode::OK, calculation)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /payslips/:id.
async fn get_payslip_handler(
    State(state): State<AppState>,
    Path(id): Path<PayslipId>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.store().payslip(id) {
        Ok(stored) => json_response(StatusCode::OK, stored),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /reports/tax-remuneration/:year.
async fn tax_remuneration_handler(
    State(state): State<AppState>,
    Path(year): Path<i32>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, year, "Building tax and remuneration report");

    match report_inputs(&state) {
        Ok((payslips, periods)) => json_response(
            StatusCode::OK,
            tax_and_remuneration_report(year, &payslips, &periods),
        ),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /reports/gross-bands/:year.
async fn gross_bands_handler(State(state): State<AppState>, Path(year): Path<i32>) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, year, "Building gross salary bands");

    match report_inputs(&state) {
        Ok((payslips, periods)) => json_response(
            StatusCode::OK,
            annual_gross_bands(year, &payslips, &periods),
        ),
        Err(err) => error_response(correlation_id, err),
    }
}

fn report_inputs(state: &AppState) -> EngineResult<(Vec<Payslip>, Vec<PayPeriod>)> {
    let payslips = state
        .store()
        .payslips()?
        .into_iter()
        .map(|stored| stored.payslip)
        .collect();
    let periods = state.store().pay_periods()?;
    Ok((payslips, periods))
}
