use std::sync::Arc;
use std::time::Duration as StdDuration;

use httpmock::prelude::*;
use planboard_app_lib::models::filter::FilterKind;
use planboard_app_lib::services::api_client::testing::client_with_base_url;
use planboard_app_lib::services::filter_service::{FilterSelector, FilterService};
use serde_json::json;
use tempfile::{tempdir, TempDir};

fn filter_service(server: &MockServer) -> (Arc<FilterService>, TempDir) {
    let dir = tempdir().expect("create temp dir");
    let (client, session) =
        client_with_base_url(&server.base_url(), dir.path(), StdDuration::from_secs(2));
    session.bootstrap("https://app.local/dashboard?token=test-token");
    (Arc::new(FilterService::new(Arc::new(client))), dir)
}

#[tokio::test]
async fn options_load_exposes_data_without_loading_or_error() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/project-management/project/index");
            then.status(200).json_body(json!({
                "error": false,
                "code": 200,
                "message": "success",
                "data": [
                    { "id": "p1", "name": "Lexus", "status": "active" },
                    { "id": "p2", "name": "BPJS", "status": "active" }
                ]
            }));
        })
        .await;

    let (filters, _dir) = filter_service(&server);
    let snapshot = filters.load(FilterKind::Project).await;

    assert!(!snapshot.loading);
    assert!(snapshot.error.is_none());
    assert_eq!(snapshot.options.len(), 2);
    assert_eq!(snapshot.options[0].name.as_text(), "Lexus");
}

#[tokio::test]
async fn role_options_come_from_the_role_index() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/project-management/role/index");
            then.status(200).json_body(json!({
                "error": false,
                "code": 200,
                "message": "",
                "data": [ { "id": "r1", "name": "Quality Assurance", "code": "QA" } ]
            }));
        })
        .await;

    let (filters, _dir) = filter_service(&server);
    let snapshot = filters.load(FilterKind::Role).await;

    assert_eq!(mock.hits_async().await, 1);
    assert_eq!(snapshot.options.len(), 1);
    assert_eq!(snapshot.options[0].id, "r1");
}

#[tokio::test]
async fn envelope_error_becomes_a_readable_message_with_empty_options() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/project-management/employee/index");
            then.status(200).json_body(json!({
                "error": true,
                "code": 500,
                "message": "employee index unavailable",
                "data": []
            }));
        })
        .await;

    let (filters, _dir) = filter_service(&server);
    let snapshot = filters.load(FilterKind::Person).await;

    assert!(!snapshot.loading);
    assert!(snapshot.options.is_empty());
    let message = snapshot.error.expect("error surfaced");
    assert!(message.contains("employee index unavailable"));
}

#[tokio::test]
async fn one_failing_filter_does_not_block_the_others() {
    let server = MockServer::start_async().await;
    let _broken = server
        .mock_async(|when, then| {
            when.method(GET).path("/project-management/employee/index");
            then.status(500).body("");
        })
        .await;
    let _working = server
        .mock_async(|when, then| {
            when.method(GET).path("/project-management/year/index");
            then.status(200).json_body(json!({
                "error": false, "code": 200, "message": "",
                "data": [ { "id": "2025", "name": 2025 } ]
            }));
        })
        .await;

    let (filters, _dir) = filter_service(&server);
    let (persons, years) = futures::join!(
        filters.load(FilterKind::Person),
        filters.load(FilterKind::Year)
    );

    assert!(persons.error.is_some());
    assert!(persons.options.is_empty());
    assert!(years.error.is_none());
    assert_eq!(years.options.len(), 1);
}

#[tokio::test]
async fn released_providers_discard_their_inflight_response() {
    let server = MockServer::start_async().await;
    let _mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/project-management/sprint/index");
            then.status(200)
                .delay(StdDuration::from_millis(300))
                .json_body(json!({
                    "error": false, "code": 200, "message": "",
                    "data": [ { "id": "spr-1", "name": "SPRINT 23 - 2025" } ]
                }));
        })
        .await;

    let (filters, _dir) = filter_service(&server);

    let load = {
        let filters = Arc::clone(&filters);
        tokio::spawn(async move { filters.load(FilterKind::Sprint).await })
    };

    tokio::time::sleep(StdDuration::from_millis(50)).await;
    filters.release(FilterKind::Sprint);

    let returned = load.await.expect("join");
    assert!(returned.options.is_empty());
    assert!(!returned.loading);

    let current = filters.snapshot(FilterKind::Sprint);
    assert!(current.options.is_empty());
    assert!(current.error.is_none());
}

#[test]
fn selector_search_kicks_in_above_five_options() {
    let options: Vec<_> = (1..=6)
        .map(|index| {
            planboard_app_lib::models::filter::FilterOption::new(
                format!("p{index}"),
                format!("Project {index}"),
            )
        })
        .collect();

    let mut selector = FilterSelector::default();
    selector.set_search("project 3");
    let visible = selector.visible(&options);
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "p3");

    selector.select(&options, "p3");
    assert!(selector.selected().is_some());

    selector.clear();
    assert!(selector.selected().is_none());
    assert_eq!(selector.search(), "");
}
