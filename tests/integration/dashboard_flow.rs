use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Datelike, Local};
use httpmock::prelude::*;
use planboard_app_lib::models::filter::{FilterKind, FilterOption};
use planboard_app_lib::services::api_client::testing::client_with_base_url;
use planboard_app_lib::services::dashboard_service::{DashboardService, FetchPhase};
use serde_json::json;
use tempfile::{tempdir, TempDir};

const AGGREGATE_PATH: &str = "/project-management/dashboard/resource-planning";

fn dashboard_with_token(server: &MockServer, timeout: StdDuration) -> (Arc<DashboardService>, TempDir) {
    let dir = tempdir().expect("create temp dir");
    let (client, session) = client_with_base_url(&server.base_url(), dir.path(), timeout);
    session.bootstrap("https://app.local/dashboard?token=test-token");
    let dashboard = Arc::new(DashboardService::new(Arc::new(client), session));
    (dashboard, dir)
}

fn month_payload() -> serde_json::Value {
    json!({
        "error": false,
        "code": 200,
        "message": "success",
        "data": [
            {
                "id": "m1",
                "month": 1,
                "name": "Jan",
                "plan": 100,
                "capacity": 150,
                "summary": {
                    "solution_engineer": { "plan": 40, "capacity": 60 }
                }
            }
        ]
    })
}

#[tokio::test]
async fn initial_load_requests_the_current_calendar_year() {
    let server = MockServer::start_async().await;
    let current_year = Local::now().year().to_string();

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(AGGREGATE_PATH)
                .query_param("year", current_year.as_str())
                .header("authorization", "test-token");
            then.status(200).json_body(month_payload());
        })
        .await;

    let (dashboard, _dir) = dashboard_with_token(&server, StdDuration::from_secs(2));
    let snapshot = dashboard.load_initial().await.expect("initial load");

    assert_eq!(mock.hits_async().await, 1);
    assert_eq!(snapshot.aggregate.phase, FetchPhase::Success);
    assert_eq!(snapshot.aggregate.chart.categories.len(), 1);
    assert_eq!(snapshot.aggregate.chart.categories[0].name, "Jan");
    assert_eq!(snapshot.aggregate.chart.categories[0].bars[0].value, 100.0);
    assert_eq!(snapshot.aggregate.chart.categories[0].bars[1].value, 150.0);

    // Productivity mirrors the aggregate months with zeroed figures.
    assert_eq!(snapshot.aggregate.productivity.categories.len(), 1);
    let productivity_bars = &snapshot.aggregate.productivity.categories[0].bars;
    assert!(productivity_bars.iter().all(|bar| bar.value == 0.0));
}

#[tokio::test]
async fn apply_without_a_year_issues_zero_requests() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(AGGREGATE_PATH);
            then.status(200).json_body(month_payload());
        })
        .await;

    let (dashboard, _dir) = dashboard_with_token(&server, StdDuration::from_secs(2));
    let error = dashboard
        .apply_filters()
        .await
        .expect_err("missing year must prompt");
    assert!(error.to_string().contains("请先选择年份"));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn missing_token_aborts_the_whole_load() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path(AGGREGATE_PATH);
            then.status(200).json_body(month_payload());
        })
        .await;

    let dir = tempdir().expect("create temp dir");
    let (client, session) =
        client_with_base_url(&server.base_url(), dir.path(), StdDuration::from_secs(2));
    // No token in storage and none on the launch URL.
    session.bootstrap("https://app.local/dashboard");
    let dashboard = DashboardService::new(Arc::new(client), session);

    let error = dashboard
        .load_initial()
        .await
        .expect_err("must refuse without a token");
    assert!(error.to_string().contains("未找到访问令牌"));
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn selected_filters_narrow_the_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(AGGREGATE_PATH)
                .query_param("year", "2025")
                .query_param("employee_id", "emp-1")
                .query_param("sprint_id", "spr-9");
            then.status(200).json_body(month_payload());
        })
        .await;

    let (dashboard, _dir) = dashboard_with_token(&server, StdDuration::from_secs(2));
    dashboard
        .change_filter(FilterKind::Year, Some(FilterOption::year(2025)))
        .expect("set year");
    dashboard
        .change_filter(
            FilterKind::Person,
            Some(FilterOption::new("emp-1", "Rizki Haddi")),
        )
        .expect("set person");
    dashboard
        .change_filter(
            FilterKind::Sprint,
            Some(FilterOption::new("spr-9", "SPRINT 23 - 2025")),
        )
        .expect("set sprint");

    let snapshot = dashboard.apply_filters().await.expect("apply");
    assert_eq!(mock.hits_async().await, 1);
    assert_eq!(snapshot.aggregate.phase, FetchPhase::Success);
}

#[tokio::test]
async fn clearing_a_filter_removes_its_parameter() {
    let server = MockServer::start_async().await;
    // Registered first and more specific: grabs the request if the cleared
    // filter were still sent.
    let with_employee = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(AGGREGATE_PATH)
                .query_param("year", "2025")
                .query_param("employee_id", "emp-1");
            then.status(500).json_body(json!({
                "error": true, "code": 500, "message": "unexpected employee_id", "data": []
            }));
        })
        .await;
    let year_only = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(AGGREGATE_PATH)
                .query_param("year", "2025");
            then.status(200).json_body(month_payload());
        })
        .await;

    let (dashboard, _dir) = dashboard_with_token(&server, StdDuration::from_secs(2));
    dashboard
        .change_filter(FilterKind::Year, Some(FilterOption::year(2025)))
        .expect("set year");
    dashboard
        .change_filter(
            FilterKind::Person,
            Some(FilterOption::new("emp-1", "Rizki Haddi")),
        )
        .expect("set person");
    dashboard
        .change_filter(FilterKind::Person, None)
        .expect("clear person");

    let snapshot = dashboard.apply_filters().await.expect("apply");
    assert_eq!(snapshot.aggregate.phase, FetchPhase::Success);
    assert_eq!(with_employee.hits_async().await, 0);
    assert_eq!(year_only.hits_async().await, 1);
}

#[tokio::test]
async fn empty_data_empties_both_charts_without_mock_fallback() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path(AGGREGATE_PATH);
            then.status(200).json_body(json!({
                "error": false, "code": 200, "message": "", "data": []
            }));
        })
        .await;

    let (dashboard, _dir) = dashboard_with_token(&server, StdDuration::from_secs(2));
    dashboard
        .change_filter(FilterKind::Year, Some(FilterOption::year(2025)))
        .expect("set year");

    let snapshot = dashboard.apply_filters().await.expect("apply");
    assert_eq!(snapshot.aggregate.phase, FetchPhase::Success);
    assert!(snapshot.aggregate.chart.categories.is_empty());
    assert_eq!(
        snapshot.aggregate.chart.placeholder.as_deref(),
        Some("No data available for 2025")
    );
    assert!(snapshot.aggregate.productivity.categories.is_empty());
}

#[tokio::test]
async fn server_failure_empties_charts_and_records_the_error() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(POST).path(AGGREGATE_PATH);
            then.status(500).json_body(json!({
                "error": true, "code": 500, "message": "internal failure", "data": []
            }));
        })
        .await;

    let (dashboard, _dir) = dashboard_with_token(&server, StdDuration::from_secs(2));
    dashboard
        .change_filter(FilterKind::Year, Some(FilterOption::year(2025)))
        .expect("set year");

    let snapshot = dashboard.apply_filters().await.expect("apply resolves");
    assert_eq!(snapshot.aggregate.phase, FetchPhase::Error);
    assert_eq!(snapshot.aggregate.error.as_deref(), Some("internal failure"));
    assert!(snapshot.aggregate.chart.categories.is_empty());
    assert!(snapshot.aggregate.productivity.categories.is_empty());
}

#[tokio::test]
async fn stale_aggregate_responses_are_discarded() {
    let server = MockServer::start_async().await;

    let _slow = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(AGGREGATE_PATH)
                .query_param("year", "2031");
            then.status(200)
                .delay(StdDuration::from_millis(400))
                .json_body(json!({
                    "error": false, "code": 200, "message": "",
                    "data": [{ "id": "slow", "month": 1, "name": "Slow", "plan": 1, "capacity": 1 }]
                }));
        })
        .await;
    let _fast = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(AGGREGATE_PATH)
                .query_param("year", "2032");
            then.status(200).json_body(json!({
                "error": false, "code": 200, "message": "",
                "data": [{ "id": "fast", "month": 1, "name": "Fast", "plan": 2, "capacity": 2 }]
            }));
        })
        .await;

    let (dashboard, _dir) = dashboard_with_token(&server, StdDuration::from_secs(2));

    dashboard
        .change_filter(FilterKind::Year, Some(FilterOption::year(2031)))
        .expect("set year");
    let slow_apply = {
        let dashboard = Arc::clone(&dashboard);
        tokio::spawn(async move { dashboard.apply_filters().await })
    };

    tokio::time::sleep(StdDuration::from_millis(100)).await;
    dashboard
        .change_filter(FilterKind::Year, Some(FilterOption::year(2032)))
        .expect("switch year");
    let fast_snapshot = dashboard.apply_filters().await.expect("fast apply");
    assert_eq!(fast_snapshot.aggregate.chart.categories[0].name, "Fast");

    let slow_snapshot = slow_apply
        .await
        .expect("join")
        .expect("slow apply resolves");
    // The slow response landed after a newer request: the newer data stays.
    assert_eq!(slow_snapshot.aggregate.chart.categories[0].name, "Fast");

    let final_snapshot = dashboard.snapshot();
    assert_eq!(final_snapshot.aggregate.chart.categories[0].name, "Fast");
    assert_eq!(final_snapshot.aggregate.phase, FetchPhase::Success);
}
