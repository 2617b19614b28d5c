//! HTTP tests over in-memory ports

use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use jsonwebtoken::{encode, EncodingKey, Header};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use domain_admin::MockAdminPort;
use domain_billing::MockBillHistoryPort;
use domain_tariff::{MockRateEntryPort, RateEntry};
use interface_api::auth::Claims;
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState, Ports};
use test_utils::{RateFixtures, FIXTURE_PASSWORD};

async fn server_with(entries: Vec<RateEntry>) -> TestServer {
    build_server(MockRateEntryPort::with_entries(entries).await)
}

fn server() -> TestServer {
    build_server(MockRateEntryPort::new())
}

fn build_server(rates: MockRateEntryPort) -> TestServer {
    let ports = Ports {
        rates: Arc::new(rates),
        bills: Arc::new(MockBillHistoryPort::new()),
        admins: Arc::new(MockAdminPort::new()),
    };
    let state = AppState::new(ApiConfig::default(), ports).unwrap();
    TestServer::new(create_router(state)).unwrap()
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

/// Registers the first admin anonymously and logs in
async fn bootstrap_token(server: &TestServer) -> String {
    server
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "operator",
            "email": "operator@example.com",
            "password": FIXTURE_PASSWORD,
            "fullName": "Grid Operator"
        }))
        .await
        .assert_status(StatusCode::CREATED);

    let login: Value = server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "operator", "password": FIXTURE_PASSWORD }))
        .await
        .json();
    login["access_token"].as_str().unwrap().to_string()
}

async fn calculate(server: &TestServer, units: u32, consumer_id: &str) -> Value {
    let response = server
        .post("/api/v1/calculation")
        .json(&json!({
            "consumerType": "residential",
            "unitsConsumed": units,
            "consumerId": consumer_id
        }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_liveness_and_readiness() {
    let server = server();

    let live: Value = server.get("/health").await.json();
    assert_eq!(live["status"], "healthy");

    let ready = server.get("/health/ready").await;
    ready.assert_status_ok();
    let body: Value = ready.json();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_calculation_with_default_rate() {
    let server = server();
    let bill = calculate(&server, 100, "C-100").await;

    assert_eq!(decimal(&bill["baseAmount"]), dec!(12.00));
    assert_eq!(decimal(&bill["totalTax"]), dec!(1.80));
    assert_eq!(decimal(&bill["totalSurcharge"]), dec!(5.00));
    assert_eq!(decimal(&bill["totalAmount"]), dec!(18.80));
    assert_eq!(bill["consumerId"], "C-100");

    let records: Value = server
        .get("/api/v1/calculation/history/consumer/C-100")
        .await
        .json();
    assert_eq!(records.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_negative_units_rejected() {
    let server = server();
    server
        .post("/api/v1/calculation")
        .json(&json!({ "consumerType": "residential", "unitsConsumed": -1 }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_units_beyond_storage_range_rejected() {
    let server = server();
    for units in [json!(10_000_000_000u64), json!("79228162514264337593543950335")] {
        let response = server
            .post("/api/v1/calculation")
            .json(&json!({ "consumerType": "residential", "unitsConsumed": units }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(body["error"], "validation_error");
    }

    server
        .get("/api/v1/config")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_registration_closes_after_bootstrap() {
    let server = server();
    let token = bootstrap_token(&server).await;

    let second = json!({
        "username": "second",
        "email": "second@example.com",
        "password": FIXTURE_PASSWORD
    });
    server
        .post("/api/v1/auth/register")
        .json(&second)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    server
        .post("/api/v1/auth/register")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&second)
        .await
        .assert_status(StatusCode::CREATED);

    server
        .post("/api/v1/auth/register")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&second)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_and_profile() {
    let server = server();
    let token = bootstrap_token(&server).await;

    server
        .post("/api/v1/auth/login")
        .json(&json!({ "username": "operator", "password": "wrong-password" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let profile: Value = server
        .get("/api/v1/auth/profile")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(profile["username"], "operator");
    assert_eq!(profile["role"], "admin");
    assert!(profile.get("passwordHash").is_none());
    assert!(!profile["lastLogin"].is_null());

    let logout: Value = server
        .post("/api/v1/auth/logout")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(logout["message"], "Logout successful");
}

#[tokio::test]
async fn test_admin_routes_require_token_and_role() {
    let server = server();

    server
        .get("/api/v1/calculation/history")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .get("/api/v1/calculation/history")
        .add_header(header::AUTHORIZATION, bearer("not-a-token"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let now = chrono::Utc::now().timestamp();
    let viewer = Claims {
        sub: "viewer".to_string(),
        username: "viewer".to_string(),
        roles: vec!["viewer".to_string()],
        exp: now + 3600,
        iat: now,
    };
    let token = encode(
        &Header::default(),
        &viewer,
        &EncodingKey::from_secret(ApiConfig::default().jwt_secret.as_bytes()),
    )
    .unwrap();

    let response = server
        .get("/api/v1/calculation/history")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["message"], "Access denied. Admin privileges required.");
}

#[tokio::test]
async fn test_rate_entry_lifecycle() {
    let server = server();
    let token = bootstrap_token(&server).await;

    let created = server
        .post("/api/v1/config")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({
            "rateName": "Green Levy",
            "rateType": "surcharge",
            "rateValue": 2.5,
            "unitType": "fixed",
            "consumerType": "commercial"
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let entry: Value = created.json();
    let id = entry["id"].as_str().unwrap().to_string();
    assert_eq!(entry["consumerType"], "commercial");
    assert_eq!(entry["isActive"], true);
    assert!(!entry["createdBy"].is_null());

    let fetched: Value = server.get(&format!("/api/v1/config/{}", id)).await.json();
    assert_eq!(fetched["rateName"], "Green Levy");

    let updated: Value = server
        .patch(&format!("/api/v1/config/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "rateValue": "3.00", "description": "Renewables fund" }))
        .await
        .json();
    assert_eq!(decimal(&updated["rateValue"]), dec!(3));
    assert_eq!(updated["description"], "Renewables fund");

    let charges: Value = server
        .get("/api/v1/config/taxes-surcharges/commercial")
        .await
        .json();
    assert_eq!(charges["surcharges"].as_array().unwrap().len(), 1);
    assert!(charges["taxes"].as_array().unwrap().is_empty());

    let toggled: Value = server
        .patch(&format!("/api/v1/config/{}/toggle", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(toggled["isActive"], false);

    let active: Value = server.get("/api/v1/config?active=true").await.json();
    assert!(active.as_array().unwrap().is_empty());
    let all: Value = server.get("/api/v1/config").await.json();
    assert_eq!(all.as_array().unwrap().len(), 1);

    server
        .delete(&format!("/api/v1/config/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/v1/config/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_rate_rejected() {
    let server = server();
    let token = bootstrap_token(&server).await;

    server
        .post("/api/v1/config")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({
            "rateName": "Broken Tier",
            "rateType": "tier_rate",
            "rateValue": 0.1,
            "tierMinUnits": 100,
            "tierMaxUnits": 50
        }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_path_parameters() {
    let server = server();

    server.get("/api/v1/config/not-a-uuid").await.assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/api/v1/config/tier-rates/agricultural")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let token = bootstrap_token(&server).await;
    server
        .get("/api/v1/calculation/stats/2024-13")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tier_rates_listed_lowest_band_first() {
    let mut tiers = RateFixtures::residential_tiers();
    tiers.reverse();
    let server = server_with(tiers).await;

    let listed: Value = server.get("/api/v1/config/tier-rates/residential").await.json();
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["rateName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Tier 1", "Tier 2", "Tier 3"]);

    let commercial: Value = server.get("/api/v1/config/tier-rates/commercial").await.json();
    assert!(commercial.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_flat_rate_replacement_drives_calculation() {
    let server = server();
    let token = bootstrap_token(&server).await;

    let before: Value = server.get("/api/v1/config/effective-rate").await.json();
    assert_eq!(decimal(&before["ratePerUnit"]), dec!(0.12));

    server
        .put("/api/v1/config/flat-rate")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "ratePerUnit": 0.20, "vatPercentage": 10, "fixedServiceCharge": 2 }))
        .await
        .assert_status_ok();

    let after: Value = server.get("/api/v1/config/effective-rate").await.json();
    assert_eq!(decimal(&after["ratePerUnit"]), dec!(0.20));
    assert_eq!(decimal(&after["vatPercentage"]), dec!(10));

    let bill = calculate(&server, 100, "C-7").await;
    assert_eq!(decimal(&bill["totalAmount"]), dec!(24.00));
}

#[tokio::test]
async fn test_history_pagination_and_stats() {
    let server = server();
    let token = bootstrap_token(&server).await;

    for i in 0..12 {
        calculate(&server, 100 + i, &format!("C-{}", i % 3)).await;
    }

    let page: Value = server
        .get("/api/v1/calculation/history?page=3&limit=5")
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(page["total"], 12);
    assert_eq!(page["page"], 3);
    assert_eq!(page["limit"], 5);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);

    let first = &page["data"][0];
    let id = first["id"].as_str().unwrap();
    let record: Value = server
        .get(&format!("/api/v1/calculation/history/{}", id))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    assert_eq!(record["id"], first["id"]);
    assert!(record["rateBreakdown"].is_string());

    let month = record["calculationMonth"].as_str().unwrap();
    let stats: Value = server
        .get(&format!("/api/v1/calculation/stats/{}", month))
        .add_header(header::AUTHORIZATION, bearer(&token))
        .await
        .json();
    let stats = stats.as_array().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0]["consumerType"], "residential");
    assert_eq!(stats[0]["count"], 12);
}

#[tokio::test]
async fn test_bill_pdf_download_is_recorded() {
    let server = server();
    let response = server
        .post("/api/v1/calculation/pdf")
        .json(&json!({
            "consumerType": "residential",
            "unitsConsumed": 100,
            "consumerId": "C-PDF",
            "calculationMonth": "2024-03"
        }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        "attachment; filename=bill-2024-03.pdf"
    );
    assert!(response.as_bytes().starts_with(b"%PDF"));

    let history: Value = server
        .get("/api/v1/calculation/history/consumer/C-PDF")
        .await
        .json();
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(decimal(&records[0]["totalAmount"]), dec!(18.80));
}

#[tokio::test]
async fn test_bill_pdf_rejects_invalid_units() {
    server()
        .post("/api/v1/calculation/pdf")
        .json(&json!({ "consumerType": "residential", "unitsConsumed": -5 }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
