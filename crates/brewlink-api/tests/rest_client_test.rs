// Integration tests for `RestClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brewlink_api::rest::ScheduleDoc;
use brewlink_api::{Error, RestClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = RestClient::new(
        server.uri().parse().expect("mock server URL"),
        Duration::from_secs(5),
    )
    .expect("client build");
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_pairing_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/pairing/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paired": false,
            "pairingCode": "483-291",
            "cloudUrl": "https://cloud.example.com"
        })))
        .mount(&server)
        .await;

    let status = client.pairing_status().await.expect("pairing status");
    assert!(!status.paired);
    assert_eq!(status.pairing_code.as_deref(), Some("483-291"));
}

#[tokio::test]
async fn test_log_buffer_info() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled": true,
            "sizeBytes": 32768,
            "entryCount": 412
        })))
        .mount(&server)
        .await;

    let info = client.log_buffer_info().await.expect("log buffer info");
    assert!(info.enabled);
    assert_eq!(info.size_bytes, 32768);
    assert_eq!(info.entry_count, 412);
}

#[tokio::test]
async fn test_extended_statistics_without_weekly_breakdown() {
    let (server, client) = setup().await;

    // Older firmware omits weeklyBreakdown entirely.
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalShots": 1042,
            "shotsToday": 4,
            "weeklyCount": 21,
            "avgBrewTimeMs": 28400
        })))
        .mount(&server)
        .await;

    let stats = client.extended_statistics().await.expect("stats");
    assert_eq!(stats.total_shots, 1042);
    assert_eq!(stats.weekly_count, 21);
    assert!(stats.weekly_breakdown.is_none());
}

#[tokio::test]
async fn test_schedule_crud_round_trip() {
    let (server, client) = setup().await;

    let entry = ScheduleDoc {
        id: 0,
        enabled: true,
        days: 0b0111_1110, // weekdays + Saturday
        hour: 6,
        minute: 45,
        action: "turn_on".into(),
        name: "Morning warmup".into(),
    };

    Mock::given(method("POST"))
        .and(path("/api/schedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "enabled": true,
            "days": 126,
            "hour": 6,
            "minute": 45,
            "action": "turn_on",
            "name": "Morning warmup"
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/schedules/3"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let created = client.create_schedule(&entry).await.expect("create");
    assert_eq!(created.id, 3);
    assert_eq!(created.name, "Morning warmup");

    client.delete_schedule(created.id).await.expect("delete");
}

// ── Failure-path tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_maps_to_appliance_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/time/status"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let err = client.time_status().await.expect_err("should fail");
    match err {
        Error::Appliance { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "busy");
        }
        other => panic!("expected Appliance error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_maps_to_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/wifi/scan"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.wifi_scan().await.expect_err("should fail");
    assert!(matches!(err, Error::Deserialization { .. }));
}
