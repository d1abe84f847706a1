//! Integration tests for the Payslip Calculation Engine HTTP API.
//!
//! Covers the worked payslip scenarios end to end:
//! - Full month with a fixed allowance
//! - Mid-period hire proration
//! - Loan installments and balance mutation
//! - The shipped tax schedule and seed records
//! - Reports over committed payslips
//! - Error cases

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::str::FromStr;
use tower::ServiceExt;

use payslip_engine::api::{AppState, create_router};
use payslip_engine::config::{ConfigLoader, EngineConfig, PayrollConfig};
use payslip_engine::models::{
    AllowanceLine, Employee, Loan, LoanStatus, PayPeriod, SalaryProfile, TaxBracket,
};
use payslip_engine::store::{InMemoryPayroll, PayrollSnapshot};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bracket(min: &str, max: &str, rate: &str) -> TaxBracket {
    TaxBracket {
        min_salary: decimal(min),
        max_salary: decimal(max),
        rate: decimal(rate),
    }
}

/// Two-bracket schedule: 5% up to 100,000 and 10% above.
fn scenario_config() -> EngineConfig {
    EngineConfig::new(
        PayrollConfig::default(),
        vec![bracket("0", "100000", "5"), bracket("100000", "0", "10")],
    )
}

fn periods() -> Vec<PayPeriod> {
    vec![
        PayPeriod {
            id: 1,
            start_date: date(2025, 1, 1),
            end_date: date(2025, 1, 31),
            month: "January".to_string(),
            year: 2025,
        },
        PayPeriod {
            id: 2,
            start_date: date(2025, 1, 4),
            end_date: date(2025, 1, 5),
            month: "January".to_string(),
            year: 2025,
        },
    ]
}

fn records(basic: &str, hire_date: NaiveDate) -> PayrollSnapshot {
    PayrollSnapshot {
        employees: vec![Employee {
            id: 1,
            name: "Test Employee".to_string(),
            hire_date,
        }],
        salaries: vec![SalaryProfile {
            id: 10,
            employee_id: 1,
            basic_salary: decimal(basic),
            valid_from: date(2023, 1, 1),
            valid_to: None,
        }],
        pay_periods: periods(),
        ..PayrollSnapshot::default()
    }
}

fn transport_allowance() -> AllowanceLine {
    AllowanceLine {
        id: 1,
        salary_id: 10,
        name: "Transport".to_string(),
        amount: decimal("5000"),
        taxable: true,
        fixed: true,
        pay_period_id: None,
    }
}

fn state_with(records: PayrollSnapshot, config: EngineConfig) -> AppState {
    let store = InMemoryPayroll::new(records, config.clone());
    AppState::new(ConfigLoader::from_config(config), store)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

fn assert_money(value: &Value, expected: &str) {
    let actual = value
        .as_str()
        .map(decimal)
        .unwrap_or_else(|| panic!("expected a decimal string, got {}", value));
    assert_eq!(actual, decimal(expected), "got {}", value);
}

fn descriptions(details: &Value) -> Vec<String> {
    details
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["description"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Worked scenarios
// =============================================================================

#[tokio::test]
async fn test_full_month_with_fixed_allowance() {
    let mut records = records("60000", date(2023, 6, 1));
    records.allowances.push(transport_allowance());
    let router = create_router(state_with(records, scenario_config()));

    let (status, json) = post_json(
        router,
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let payslip = &json["calculation"]["payslip"];
    assert_eq!(payslip["working_days"], 23);
    assert_money(&payslip["basic_salary"], "60000");
    assert_money(&payslip["gross_salary"], "65000");
    assert_money(&payslip["tax_deduction"], "3250");
    assert_money(&payslip["epf_deduction"], "4800");
    assert_money(&payslip["net_salary"], "56950");

    assert_eq!(
        descriptions(&json["calculation"]["details"]),
        vec!["Tax Deduction", "Transport", "EPF Deduction"]
    );

    let contribution = &json["calculation"]["contribution"];
    assert_money(&contribution["employer_epf"], "7200");
    assert_money(&contribution["employer_etf"], "1800");
}

#[tokio::test]
async fn test_mid_period_hire_is_prorated() {
    let router = create_router(state_with(
        records("62000", date(2025, 1, 16)),
        scenario_config(),
    ));

    let (status, json) = post_json(
        router,
        "/payslips/preview",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_money(&json["payslip"]["basic_salary"], "32000.00");
    assert_money(&json["payslip"]["epf_deduction"], "2560.00");
}

#[tokio::test]
async fn test_loan_installment_reduces_balance() {
    let mut records = records("60000", date(2023, 6, 1));
    records.loans.push(Loan {
        id: 7,
        employee_id: 1,
        principal: decimal("12000"),
        interest_rate: decimal("10"),
        installment_count: 12,
        remaining_balance: decimal("13200"),
        status: LoanStatus::Ongoing,
    });
    let state = state_with(records, scenario_config());
    let router = create_router(state.clone());

    let (status, json) = post_json(
        router,
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let loan_lines: Vec<&Value> = json["calculation"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|d| d["source"]["kind"] == "loan")
        .collect();
    assert_eq!(loan_lines.len(), 1);
    assert_eq!(loan_lines[0]["type"], "DEDUCTION");
    assert_eq!(loan_lines[0]["source"]["loan_id"], 7);
    assert_money(&loan_lines[0]["amount"], "1100");

    assert_eq!(
        state.store().loan(7).unwrap().remaining_balance,
        decimal("12100")
    );
}

#[tokio::test]
async fn test_zero_rate_open_bracket_charges_no_tax() {
    let config = EngineConfig::new(PayrollConfig::default(), vec![bracket("0", "0", "10")]);
    let router = create_router(state_with(records("60000", date(2023, 6, 1)), config));

    let (status, json) = post_json(
        router,
        "/payslips/preview",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_money(&json["payslip"]["tax_deduction"], "0");
    assert!(!descriptions(&json["details"]).contains(&"Tax Deduction".to_string()));
}

#[tokio::test]
async fn test_attendance_deduction_and_date_override() {
    let router = create_router(state_with(
        records("46000", date(2023, 6, 1)),
        scenario_config(),
    ));

    let (status, json) = post_json(
        router,
        "/payslips/preview",
        json!({
            "employee_id": 1,
            "pay_period_id": 1,
            "attendance_deduction": "250.50",
            "start_date": "2025-01-06",
            "end_date": "2025-01-10",
            "status": "approved"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let payslip = &json["payslip"];
    assert_eq!(payslip["working_days"], 5);
    assert_eq!(payslip["status"], "approved");
    assert_money(&payslip["attendance_deduction"], "250.50");
    // 46000 - 2300 tax - 3680 EPF - 250.50
    assert_money(&payslip["net_salary"], "39769.50");
}

// =============================================================================
// Shipped configuration
// =============================================================================

#[tokio::test]
async fn test_shipped_schedule_with_seed_records() {
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    let store = InMemoryPayroll::from_yaml_file("./config/seed.yaml", loader.config().clone())
        .expect("Failed to load seed");
    let state = AppState::new(loader, store);

    // January: 60000 basic + 5000 transport, untaxed under the first band.
    let (status, json) = post_json(
        create_router(state.clone()),
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let payslip = &json["calculation"]["payslip"];
    assert_money(&payslip["gross_salary"], "65000");
    assert_money(&payslip["tax_deduction"], "0");
    assert_money(&payslip["loan_deduction"], "1100");
    assert_money(&payslip["net_salary"], "59100");

    // February adds a commission, an advance and two no-pay days.
    let (status, json) = post_json(
        create_router(state.clone()),
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let payslip = &json["calculation"]["payslip"];
    assert_eq!(payslip["working_days"], 20);
    assert_money(&payslip["gross_salary"], "72500");
    assert_money(&payslip["salary_advance_deduction"], "3000");
    assert_money(&payslip["leave_deduction"], "6000");
    assert_money(&payslip["net_salary"], "57600");
    assert_eq!(
        descriptions(&json["calculation"]["details"]),
        vec![
            "Transport",
            "Sales Target",
            "Salary Advance",
            "Loan Installment",
            "EPF Deduction",
            "No-Pay Leave Deduction"
        ]
    );

    assert_eq!(
        state.store().loan(7).unwrap().remaining_balance,
        decimal("11000")
    );
}

#[tokio::test]
async fn test_shipped_schedule_progressive_bands() {
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    let config = loader.config().clone();
    let store = InMemoryPayroll::new(records("150000", date(2023, 6, 1)), config);
    let router = create_router(AppState::new(loader, store));

    let (status, json) = post_json(
        router,
        "/payslips/preview",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    // 41667 at 6% + 8333 at 12%
    assert_money(&json["payslip"]["tax_deduction"], "3499.98");
}

// =============================================================================
// Persistence and reports
// =============================================================================

#[tokio::test]
async fn test_preview_persists_nothing() {
    let state = state_with(records("60000", date(2023, 6, 1)), scenario_config());

    let (status, _) = post_json(
        create_router(state.clone()),
        "/payslips/preview",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.store().payslips().unwrap().is_empty());

    let (status, _) = get_json(create_router(state), "/payslips/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_committed_payslip_can_be_read_back() {
    let mut records = records("60000", date(2023, 6, 1));
    records.allowances.push(transport_allowance());
    let state = state_with(records, scenario_config());

    let (status, created) = post_json(
        create_router(state.clone()),
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["payslip_id"].as_u64().unwrap();

    let (status, stored) = get_json(create_router(state), &format!("/payslips/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["id"], id);
    assert_eq!(stored["details"], created["calculation"]["details"]);
    assert_money(&stored["contribution"]["employer_epf"], "7200");
}

#[tokio::test]
async fn test_duplicate_payslip_returns_conflict() {
    let router = create_router(state_with(
        records("60000", date(2023, 6, 1)),
        scenario_config(),
    ));
    let body = json!({ "employee_id": 1, "pay_period_id": 1 });

    let (status, _) = post_json(router.clone(), "/payslips", body.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = post_json(router, "/payslips", body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "DUPLICATE_PAYSLIP");
}

#[tokio::test]
async fn test_reports_over_committed_payslips() {
    let mut records = records("60000", date(2023, 6, 1));
    records.allowances.push(transport_allowance());
    let state = state_with(records, scenario_config());

    let (status, _) = post_json(
        create_router(state.clone()),
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, report) =
        get_json(create_router(state.clone()), "/reports/tax-remuneration/2025").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["year"], 2025);
    assert_eq!(report["months"].as_array().unwrap().len(), 1);
    assert_eq!(report["months"][0]["month"], "January");
    assert_money(&report["months"][0]["tax_liable_remuneration"], "5000");
    assert_money(&report["months"][0]["tax_excluded_remuneration"], "0");
    assert_money(&report["total_tax_deduction"], "3250");
    assert_money(&report["total_payments_made"], "56950");

    let (status, bands) = get_json(create_router(state), "/reports/gross-bands/2025").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        bands,
        json!([{ "salary_range": "0 - 1,200,000", "employee_count": 1 }])
    );
}

// =============================================================================
// Error cases
// =============================================================================

#[tokio::test]
async fn test_period_without_working_days_is_rejected() {
    let state = state_with(records("60000", date(2023, 6, 1)), scenario_config());

    let (status, json) = post_json(
        create_router(state.clone()),
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 2 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_PERIOD");
    assert!(state.store().payslips().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_pay_period_returns_404() {
    let router = create_router(state_with(
        records("60000", date(2023, 6, 1)),
        scenario_config(),
    ));

    let (status, json) = post_json(
        router,
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 99 }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_negative_attendance_deduction_is_rejected() {
    let router = create_router(state_with(
        records("60000", date(2023, 6, 1)),
        scenario_config(),
    ));

    let (status, json) = post_json(
        router,
        "/payslips",
        json!({ "employee_id": 1, "pay_period_id": 1, "attendance_deduction": "-10" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_overflowing_attendance_deduction_is_rejected() {
    let router = create_router(state_with(
        records("60000", date(2023, 6, 1)),
        scenario_config(),
    ));

    let (status, json) = post_json(
        router,
        "/payslips",
        json!({
            "employee_id": 1,
            "pay_period_id": 1,
            "attendance_deduction": "79228162514264337593543950335"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let router = create_router(state_with(PayrollSnapshot::default(), scenario_config()));
    let request = Request::builder()
        .method("POST")
        .uri("/payslips")
        .header("Content-Type", "application/json")
        .body(Body::from("{ \"employee_id\": "))
        .unwrap();

    let (status, json) = send(router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MALFORMED_JSON");
}
