//! HTTP surface tests against the in-memory store

use std::sync::Arc;

use axum_test::TestServer;
use chrono::NaiveDate;
use core_kernel::FiscalPeriodId;
use domain_ledger::FiscalPeriod;
use interface_api::{config::ApiConfig, create_router};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use test_utils::{pending_event, PostingScenario, SaleEventBuilder};

/// A period wide enough to contain any test clock
fn wide_period(scenario: &PostingScenario) {
    scenario.store.seed_period(FiscalPeriod {
        id: FiscalPeriodId::new_v7(),
        company_id: scenario.company_id,
        period_name: "ALL-TIME".to_string(),
        start_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
        is_closed: false,
    });
}

fn server(scenario: PostingScenario) -> TestServer {
    let app = create_router(Arc::new(scenario.store), ApiConfig::default());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let server = server(PostingScenario::standard());
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn readiness_probes_the_store() {
    let server = server(PostingScenario::standard());
    let response = server.get("/health/ready").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn dispatch_with_empty_backlog_is_a_noop() {
    let server = server(PostingScenario::standard());
    let response = server.post("/api/v1/ledger/dispatch").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["processed"], 0);
    assert_eq!(body["failed"], 0);
}

#[tokio::test]
async fn dispatch_posts_pending_events() {
    let scenario = PostingScenario::standard();
    wide_period(&scenario);
    scenario
        .store
        .seed_event(SaleEventBuilder::new(dec!(100)).build(scenario.company_id));
    let server = server(scenario);

    let response = server.post("/api/v1/ledger/dispatch").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["processed"], 1);
    assert_eq!(body["perKind"]["sale"], 1);

    // The backlog is drained; a second trigger is a no-op
    let again: Value = server.post("/api/v1/ledger/dispatch").await.json();
    assert_eq!(again["processed"], 0);
}

#[tokio::test]
async fn dispatch_reports_failures_without_aborting() {
    let scenario = PostingScenario::standard();
    wide_period(&scenario);
    scenario.store.seed_event(pending_event(
        scenario.company_id,
        domain_posting::EventType::Sale,
        json!({ "sale": { "total": "broken" } }),
    ));
    scenario
        .store
        .seed_event(SaleEventBuilder::new(dec!(100)).build(scenario.company_id));
    let server = server(scenario);

    let response = server.post("/api/v1/ledger/dispatch").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["processed"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}
