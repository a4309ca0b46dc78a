//! HTTP contract tests for the CRM client.
//!
//! These verify request shape (paths, query parameters, auth header, JSON
//! bodies) and response handling against a mock server.

use chrono::{NaiveDate, NaiveTime};
use salonsync_core::api::ApiClient;
use salonsync_core::fetch::{RosterFetcher, TaskFetcher, TaskQuery};
use salonsync_core::working_dates::{WorkingDate, WorkingDateStore, WorkingHours};
use salonsync_core::{DateWindow, SyncError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri(), Some("secret-token".to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Tasks
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_task_query_sends_window_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("branchId", "4"))
        .and(query_param("scheduledAfter", "2025-01-01T23:59:00.000Z"))
        .and(query_param("scheduledBefore", "2025-01-02T23:59:00.000Z"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "masterId": 3,
                "scheduledDate": "2025-01-02",
                "scheduledTime": "10:00",
                "serviceType": "Manicure",
                "client": {"firstName": "Bob"}
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = TaskQuery::new("4", DateWindow::for_date(date(2025, 1, 2)));
    let tasks = client(&server).fetch_tasks(&query).await.unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "1");
    assert_eq!(tasks[0].master_id.as_deref(), Some("3"));
    assert_eq!(tasks[0].scheduled_time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
}

#[tokio::test]
async fn test_unauthorized_is_an_ordinary_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})),
        )
        .mount(&server)
        .await;

    let query = TaskQuery::new("4", DateWindow::for_date(date(2025, 1, 2)));
    let err = client(&server).fetch_tasks(&query).await.unwrap_err();

    match err {
        SyncError::Http { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Token expired");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_task_payload_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let query = TaskQuery::new("4", DateWindow::for_date(date(2025, 1, 2)));
    let err = client(&server).fetch_tasks(&query).await.unwrap_err();

    assert!(matches!(err, SyncError::Decode(_)));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client(&server).with_timeout(std::time::Duration::from_millis(200));
    let query = TaskQuery::new("4", DateWindow::for_date(date(2025, 1, 2)));
    let err = client.fetch_tasks(&query).await.unwrap_err();

    assert!(matches!(err, SyncError::Timeout(_)));
    assert!(err.is_transient());
}

// ────────────────────────────────────────────────────────────────────────────
// Staff
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_roster_in_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/staff"))
        .and(query_param("branchId", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "staff": [
                {"id": 3, "name": "Anna", "specialization": "Nails", "startWorkHour": "09:00:00"},
                {"id": 5, "name": "Oleg", "isActive": false}
            ]
        })))
        .mount(&server)
        .await;

    let roster = client(&server).fetch_roster("4").await.unwrap();

    assert_eq!(roster.len(), 2);
    assert_eq!(roster[0].specialization.as_deref(), Some("Nails"));
    assert_eq!(roster[0].start_work_hour, NaiveTime::from_hms_opt(9, 0, 0));
    assert!(!roster[1].is_active);
}

// ────────────────────────────────────────────────────────────────────────────
// Working dates
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_working_dates_drops_inactive_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/masters/3/working-dates"))
        .and(query_param("month", "1"))
        .and(query_param("year", "2025"))
        .and(query_param("branchId", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"work_date": "2025-01-02", "start_time": "09:00:00", "end_time": "18:00:00", "branch_id": 4, "is_active": true},
            {"work_date": "2025-01-03T00:00:00.000Z", "start_time": "10:00", "end_time": "16:00", "branch_id": 4, "is_active": false},
            {"work_date": "2025-01-04", "start_time": "10:00", "end_time": "16:00"}
        ])))
        .mount(&server)
        .await;

    let dates = client(&server)
        .list_working_dates("3", "4", 2025, 1)
        .await
        .unwrap();

    let days: Vec<_> = dates.iter().map(|w| w.date).collect();
    assert_eq!(days, vec![date(2025, 1, 2), date(2025, 1, 4)]);
    assert!(dates.iter().all(|w| w.branch_id == "4"));
}

#[tokio::test]
async fn test_create_working_date_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/masters/3/working-dates"))
        .and(body_json(json!({
            "workDate": "2025-01-05",
            "startTime": "09:00",
            "endTime": "18:00",
            "branchId": "4"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 99})))
        .expect(1)
        .mount(&server)
        .await;

    let hours = WorkingHours::parse("09:00", "18:00").unwrap();
    let working_date = WorkingDate::new(date(2025, 1, 5), hours, "4");

    client(&server)
        .create_working_date("3", &working_date)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_working_date_path() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/masters/3/working-dates/2025-01-05"))
        .and(query_param("branchId", "4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .delete_working_date("3", date(2025, 1, 5), "4")
        .await
        .unwrap();
}
