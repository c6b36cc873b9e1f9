//! HTTP API integration tests
//!
//! Drive the full router with `oneshot` requests: ingest, alert and event
//! queries, compliance, playbooks, response actions, and the randomized
//! telemetry endpoints.

use a3s_soc::server::router;
use a3s_soc::server::state::AppState;
use a3s_soc::SocConfig;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use tower::ServiceExt;

fn app() -> Router {
    let mut config = SocConfig::default();
    config.playbooks.step_delay_ms = 1;
    router::build(AppState::new(config).unwrap())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if body.is_some() {
        req = req.header("content-type", "application/json");
    }
    let req = req
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: &Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    send(app, Method::POST, uri, Some(body)).await
}

// ─── Ingest ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_ingest_empty_object_is_400() {
    let app = app();
    let (status, json) = post(&app, "/api/ingest", "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    let error = json["error"].as_str().unwrap();
    assert!(error.contains("event_type"));
    assert!(error.contains("source"));
}

#[tokio::test]
async fn test_ingest_minimal_event() {
    let app = app();
    let (status, json) = post(&app, "/api/ingest", r#"{"event_type":"x","source":"y"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let id = json["id"].as_str().unwrap();
    assert!(!id.is_empty());

    let (status, event) = get(&app, &format!("/api/events/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["eventType"], "x");
    assert_eq!(event["severity"], "low");
}

#[tokio::test]
async fn test_ingest_malformed_json_is_500() {
    let app = app();
    let (status, json) = post(&app, "/api/ingest", "{not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);

    let (_, rejected) = get(&app, "/api/ingest/rejected").await;
    assert_eq!(rejected["total"], 1);
}

#[tokio::test]
async fn test_ingest_wrong_field_type_is_400() {
    let app = app();
    let (status, json) = post(&app, "/api/ingest", r#"{"event_type":5,"source":"y"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("invalid type"));

    let (status, _) = post(&app, "/api/response-actions", r#"{"action":["block_ip"],"target":"1.2.3.4"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingest_schema_violation_is_400() {
    let app = app();
    let (status, json) = post(
        &app,
        "/api/ingest",
        r#"{"event_type":"network_flow","source":"fw","details":{"src_ip":"10.0.0.1"}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("bytes"));
}

#[tokio::test]
async fn test_register_schema_then_enforce() {
    let app = app();
    let (status, _) = post(
        &app,
        "/api/schemas",
        r#"{"event_type":"dns_query","version":1,"required_fields":["domain"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, schemas) = get(&app, "/api/schemas").await;
    let types = schemas["types"].as_array().unwrap();
    assert!(types.iter().any(|t| t == "dns_query"));

    let (status, _) = post(&app, "/api/ingest", r#"{"event_type":"dns_query","source":"dns"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/schemas",
        r#"{"event_type":"dns_query","version":2,"required_fields":["domain","qtype"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schema_type_normalized_like_ingest() {
    let app = app();
    let (status, json) = post(
        &app,
        "/api/schemas",
        r#"{"event_type":"Port-Scan","version":1,"required_fields":["dst"]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["schema"]["eventType"], "port_scan");

    let (status, json) = post(&app, "/api/ingest", r#"{"event_type":"Port-Scan","source":"ids","details":{}}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("dst"));

    let (status, _) = post(
        &app,
        "/api/ingest",
        r#"{"event_type":"port scan","source":"ids","details":{"dst":"10.0.0.2"}}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(&app, "/api/schemas", r#"{"event_type":"bad/type","version":1}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Alerts & Events ─────────────────────────────────────────────

#[tokio::test]
async fn test_alerts_list_bounded_and_valid_severity() {
    let app = app();
    for i in 0..60 {
        let body = format!(r#"{{"event_type":"intrusion","source":"ids-{}"}}"#, i % 3);
        let (status, _) = post(&app, "/api/ingest", &body).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = get(&app, "/api/alerts").await;
    assert_eq!(status, StatusCode::OK);
    let alerts = json["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 50);
    assert_eq!(json["total"], 60);
    for alert in alerts {
        let severity = alert["severity"].as_str().unwrap();
        assert!(["critical", "high", "medium", "low"].contains(&severity));
    }

    let (_, page) = get(&app, "/api/alerts?limit=5&offset=58&source=ids-0").await;
    assert_eq!(page["total"], 20);
    assert!(page["alerts"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_alerts_unknown_filter_is_400() {
    let app = app();
    let (status, json) = get(&app, "/api/alerts?severity=apocalyptic").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("severity"));
}

#[tokio::test]
async fn test_alert_status_update() {
    let app = app();
    let (_, ingest) = post(&app, "/api/ingest", r#"{"event_type":"ransomware_detected","source":"edr"}"#).await;
    let alert_id = ingest["alertId"].as_str().unwrap().to_string();

    let uri = format!("/api/alerts/{}", alert_id);
    let (status, json) = send(&app, Method::PATCH, &uri, Some(r#"{"status":"investigating"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["alert"]["status"], "investigating");

    let (status, _) = send(&app, Method::PATCH, &uri, Some(r#"{"status":"sleeping"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::PATCH, &uri, Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/alerts/alert-missing",
        Some(r#"{"status":"resolved"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, stats) = get(&app, "/api/dashboard/stats").await;
    assert_eq!(stats["alertsByStatus"]["investigating"], 1);
    assert_eq!(stats["alertsBySeverity"]["critical"], 1);
}

#[tokio::test]
async fn test_unknown_ids_are_404() {
    let app = app();
    assert_eq!(get(&app, "/api/alerts/alert-nope").await.0, StatusCode::NOT_FOUND);
    assert_eq!(get(&app, "/api/events/evt-nope").await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        get(&app, "/api/playbooks/executions/exec-nope").await.0,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_events_filter_by_category_and_text() {
    let app = app();
    post(&app, "/api/ingest", r#"{"event_type":"network_flow","source":"fw","details":{"bytes":1024}}"#).await;
    post(&app, "/api/ingest", r#"{"event_type":"login_failure","source":"idp","details":{"user":"eve","message":"Bad password for eve"}}"#).await;

    let (_, json) = get(&app, "/api/events?category=network").await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["events"][0]["eventType"], "network_flow");

    let (_, json) = get(&app, "/api/events?q=EVE").await;
    assert_eq!(json["total"], 1);
}

#[tokio::test]
async fn test_timeseries_window() {
    let app = app();
    post(&app, "/api/ingest", r#"{"event_type":"network_flow","source":"fw","details":{"bytes":2048}}"#).await;

    let before = Utc::now().timestamp().div_euclid(60) * 60;
    let (status, json) = get(&app, "/api/metrics/timeseries?window=10").await;
    let after = Utc::now().timestamp().div_euclid(60) * 60;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["window"], 10);
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 10);

    // Window ends at the current wall-clock minute
    let last = points[9]["timestamp"].as_str().unwrap();
    let last = DateTime::parse_from_rfc3339(last).unwrap().timestamp();
    assert!(last == before || last == after, "{} not in [{}, {}]", last, before, after);
    let bytes: u64 = points.iter().map(|p| p["networkBytes"].as_u64().unwrap()).sum();
    assert_eq!(bytes, 2048);

    let (status, _) = get(&app, "/api/metrics/timeseries?window=soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Compliance ──────────────────────────────────────────────────

#[tokio::test]
async fn test_compliance_evaluate_and_posture() {
    let app = app();
    let (status, json) = post(
        &app,
        "/api/compliance/evaluate",
        r#"{"control_id":"ac-7","log_data":"account locked out after 5 failed login attempts; lockout enabled"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["evaluation"]["controlId"], "AC-7");

    let (_, posture) = get(&app, "/api/compliance").await;
    let controls = posture["controls"].as_array().unwrap();
    let ac7 = controls.iter().find(|c| c["controlId"] == "AC-7").unwrap();
    assert!(ac7["lastEvaluated"].is_string());
    assert!(!posture["frameworks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_compliance_errors() {
    let app = app();
    let (status, json) = post(&app, "/api/compliance/evaluate", r#"{"control_id":"AC-7"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("log_data"));

    let (status, _) = post(&app, "/api/compliance/evaluate", r#"{"control_id":"ZZ-1","log_data":"x"}"#).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(&app, "/api/compliance/fix", r#"{"control_id":"AC-7"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/compliance/fix",
        r#"{"control_id":"AC-7","playbook_id":"pb-nope"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_compliance_fix_starts_playbook() {
    let app = app();
    let (status, json) = post(
        &app,
        "/api/compliance/fix",
        r#"{"control_id":"cm-6","playbook_id":"pb-compliance-remediation"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["execution"]["incidentId"], "compliance-CM-6");
    assert_eq!(json["execution"]["status"], "running");
}

// ─── Playbooks ───────────────────────────────────────────────────

#[tokio::test]
async fn test_playbook_execute_missing_incident_is_400() {
    let app = app();
    let (status, json) = post(
        &app,
        "/api/playbooks/execute",
        r#"{"playbook_id":"pb-brute-force"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("incident_id"));
}

#[tokio::test]
async fn test_playbook_execute_and_poll() {
    let app = app();
    let (status, json) = post(
        &app,
        "/api/playbooks/execute",
        r#"{"playbook_id":"pb-brute-force","incident_id":"INC-7"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    let id = json["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("exec-"));

    let uri = format!("/api/playbooks/executions/{}", id);
    let mut finished = false;
    for _ in 0..200 {
        let (_, exec) = get(&app, &uri).await;
        if exec["status"] == "completed" {
            finished = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(finished);

    let (_, list) = get(&app, "/api/playbooks/executions").await;
    assert_eq!(list["total"], 1);

    let (status, _) = post(
        &app,
        "/api/playbooks/execute",
        r#"{"playbook_id":"pb-nope","incident_id":"INC-7"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ─── Response actions ────────────────────────────────────────────

#[tokio::test]
async fn test_block_ip_message_contains_target() {
    let app = app();
    let (status, json) = post(
        &app,
        "/api/response-actions",
        r#"{"action":"block_ip","target":"1.2.3.4"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert!(json["message"].as_str().unwrap().contains("1.2.3.4"));

    let (_, list) = get(&app, "/api/response-actions").await;
    assert_eq!(list["active"]["blockedIps"][0], "1.2.3.4");

    let (_, events) = get(&app, "/api/events?event_type=response_action").await;
    assert_eq!(events["total"], 1);
}

#[tokio::test]
async fn test_response_action_errors() {
    let app = app();
    let (status, _) = post(&app, "/api/response-actions", r#"{"action":"block_ip"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/response-actions",
        r#"{"action":"block_ip","target":"example.com"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/response-actions",
        r#"{"action":"format_disk","target":"srv-1"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Randomized telemetry ────────────────────────────────────────

#[tokio::test]
async fn test_network_flows_within_bounds() {
    let app = app();
    for _ in 0..25 {
        let (status, json) = get(&app, "/api/network/flows").await;
        assert_eq!(status, StatusCode::OK);
        let sessions = json["activeSessions"].as_u64().unwrap();
        assert!((15_000..=20_000).contains(&sessions));
        let fps = json["flowsPerSecond"].as_u64().unwrap();
        assert!((800..=1_500).contains(&fps));
    }
}

#[tokio::test]
async fn test_network_metrics_and_threats_within_bounds() {
    let app = app();
    for _ in 0..25 {
        let (_, metrics) = get(&app, "/api/network/metrics").await;
        let latency = metrics["latencyMs"].as_f64().unwrap();
        assert!((5.0..=50.0).contains(&latency));

        let (_, analysis) = get(&app, "/api/threat-analysis").await;
        assert!(analysis["riskScore"].as_u64().unwrap() <= 100);

        let (_, intel) = get(&app, "/api/threat-intel").await;
        for ioc in intel["indicators"].as_array().unwrap() {
            let confidence = ioc["confidence"].as_u64().unwrap();
            assert!((50..=100).contains(&confidence));
        }

        let (_, anomalies) = get(&app, "/api/network/anomalies").await;
        assert!(anomalies["total"].as_u64().unwrap() <= 5);

        let (_, traffic) = get(&app, "/api/network/traffic").await;
        assert_eq!(traffic["points"].as_array().unwrap().len(), 12);
    }
}

#[tokio::test]
async fn test_health() {
    let app = app();
    post(&app, "/api/ingest", r#"{"event_type":"x","source":"y"}"#).await;
    let (status, json) = get(&app, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["events"], 1);
}
