//! Tracking service client tests
//!
//! Uses wiremock to stand in for the tracking service.
//!
//! Run with: cargo test --package labelstation-tracking --test tracking_client

use labelstation_core::IssuanceStatus;
use labelstation_tracking::{ConfirmationSource, TrackingClient, TrackingConfig, TrackingError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> TrackingClient {
    TrackingClient::new(TrackingConfig::parse(&server.uri()).unwrap().with_timeout_secs(2)).unwrap()
}

#[tokio::test]
async fn check_status_reports_ready_device_as_scanned() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/RC-103-000123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "barcode": "RC-103-000123",
            "status": "ready",
            "scan_timestamp": "2026-01-15T12:00:00Z",
            "station_id": "bench-1",
            "scanner_id": "line-scanner"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let confirmation = client_for(&server).check_status("RC-103-000123").await.unwrap();

    assert!(confirmation.scanned);
    assert!(confirmation.is_confirmed());
    assert_eq!(confirmation.status, Some(IssuanceStatus::Ready));
    assert!(confirmation.timestamp.is_some());
}

#[tokio::test]
async fn check_status_preready_is_not_scanned() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/RC-102-000001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "barcode": "RC-102-000001",
            "status": "preready"
        })))
        .mount(&server)
        .await;

    let confirmation = client_for(&server).check_status("RC-102-000001").await.unwrap();

    assert!(!confirmation.scanned);
    assert_eq!(confirmation.status, Some(IssuanceStatus::Preready));
}

#[tokio::test]
async fn check_status_unknown_barcode_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/RC-110-999999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let confirmation = client_for(&server).check_status("RC-110-999999").await.unwrap();

    assert!(!confirmation.scanned);
    assert!(confirmation.status.is_none());
    assert!(confirmation.timestamp.is_none());
}

#[tokio::test]
async fn check_status_server_error_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/RC-102-000001"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server).check_status("RC-102-000001").await.unwrap_err();

    match &err {
        TrackingError::Status { status, body, .. } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
    assert!(err.is_transient());
}

#[tokio::test]
async fn check_status_malformed_body_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices/RC-102-000001"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).check_status("RC-102-000001").await.unwrap_err();
    assert!(matches!(err, TrackingError::Deserialization { .. }));
}

#[tokio::test]
async fn check_status_unreachable_service_is_an_error() {
    let config = TrackingConfig::parse("http://127.0.0.1:1").unwrap().with_timeout_secs(2);
    let client = TrackingClient::new(config).unwrap();

    let err = client.check_status("RC-102-000001").await.unwrap_err();
    assert!(matches!(err, TrackingError::Http { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn list_recent_passes_limit_and_window() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .and(query_param("limit", "5"))
        .and(query_param("window_minutes", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "barcode": "RC-103-000002", "status": "preready" },
            { "barcode": "RC-103-000001", "status": "ready" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = client_for(&server).list_recent(5, 30).await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].barcode, "RC-103-000002");
    assert_eq!(devices[1].status, Some(IssuanceStatus::Ready));
}

#[tokio::test]
async fn list_recent_empty_window() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    assert!(client_for(&server).list_recent(10, 60).await.unwrap().is_empty());
}
