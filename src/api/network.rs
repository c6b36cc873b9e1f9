//! Randomized network telemetry; see `crate::synthetic` for the bounds.

use axum::Json;
use chrono::Utc;

use crate::synthetic::{self, Anomaly, NetworkFlows, NetworkMetrics};

/// GET /api/network/flows
pub async fn flows_handler() -> Json<NetworkFlows> {
    Json(synthetic::network_flows(&mut rand::thread_rng(), Utc::now()))
}

/// GET /api/network/traffic
pub async fn traffic_handler() -> Json<serde_json::Value> {
    let points = synthetic::network_traffic(&mut rand::thread_rng(), Utc::now());
    Json(serde_json::json!({ "points": points }))
}

/// GET /api/network/metrics
pub async fn metrics_handler() -> Json<NetworkMetrics> {
    Json(synthetic::network_metrics(&mut rand::thread_rng(), Utc::now()))
}

/// GET /api/network/anomalies
pub async fn anomalies_handler() -> Json<serde_json::Value> {
    let anomalies: Vec<Anomaly> =
        synthetic::network_anomalies(&mut rand::thread_rng(), Utc::now());
    Json(serde_json::json!({
        "total": anomalies.len(),
        "anomalies": anomalies,
    }))
}
