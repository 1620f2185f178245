use std::collections::HashMap;

use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use afisha::services::stats_client::{StatsClient, ViewTracker};

fn window() -> (chrono::NaiveDateTime, chrono::NaiveDateTime) {
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap().and_hms_opt(23, 59, 59).unwrap();
    (start, end)
}

#[tokio::test]
async fn record_hit_posts_to_collector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hit"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = StatsClient::new(&server.uri(), "afisha-main");
    client.record_hit("/events/1", "192.0.2.1").await;
}

#[tokio::test]
async fn record_hit_swallows_collector_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hit"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = StatsClient::new(&server.uri(), "afisha-main");
    // must not panic or surface the failure
    client.record_hit("/events/1", "192.0.2.1").await;
}

#[tokio::test]
async fn view_counts_parses_stats_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .and(query_param("unique", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"app": "afisha-main", "uri": "/events/1", "hits": 12},
            {"app": "afisha-main", "uri": "/events/2", "hits": 3}
        ])))
        .mount(&server)
        .await;

    let client = StatsClient::new(&server.uri(), "afisha-main");
    let (start, end) = window();
    let counts = client
        .view_counts(start, end, &["/events/1".to_string(), "/events/2".to_string()])
        .await;

    let expected: HashMap<String, i64> =
        [("/events/1".to_string(), 12), ("/events/2".to_string(), 3)].into_iter().collect();
    assert_eq!(counts, expected);
}

#[tokio::test]
async fn view_counts_degrades_to_empty_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = StatsClient::new(&server.uri(), "afisha-main");
    let (start, end) = window();
    let counts = client.view_counts(start, end, &["/events/1".to_string()]).await;
    assert!(counts.is_empty());
}

#[tokio::test]
async fn view_counts_degrades_to_empty_when_collector_is_down() {
    let client = StatsClient::new("http://127.0.0.1:1", "afisha-main");
    let (start, end) = window();
    let counts = client.view_counts(start, end, &["/events/1".to_string()]).await;
    assert!(counts.is_empty());
}
