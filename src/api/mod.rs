pub mod alerts;
pub mod compliance;
pub mod events;
pub mod health;
pub mod ingest;
pub mod metrics;
pub mod network;
pub mod playbooks;
pub mod response;
pub mod schemas;
pub mod threats;

use axum::routing::{get, post};
use axum::Router;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SocError};
use crate::server::state::AppState;

/// Build the dashboard API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::handler))
        .route("/ingest", post(ingest::handler))
        .route("/ingest/rejected", get(ingest::rejected_handler))
        .route("/schemas", get(schemas::list_handler).post(schemas::register_handler))
        .route("/alerts", get(alerts::list_handler))
        .route(
            "/alerts/:id",
            get(alerts::get_handler).patch(alerts::update_handler),
        )
        .route("/events", get(events::list_handler))
        .route("/events/:id", get(events::get_handler))
        .route("/dashboard/stats", get(metrics::stats_handler))
        .route("/metrics/timeseries", get(metrics::timeseries_handler))
        .route("/compliance", get(compliance::posture_handler))
        .route("/compliance/evaluate", post(compliance::evaluate_handler))
        .route("/compliance/fix", post(compliance::fix_handler))
        .route("/playbooks", get(playbooks::list_handler))
        .route("/playbooks/execute", post(playbooks::execute_handler))
        .route("/playbooks/executions", get(playbooks::executions_handler))
        .route("/playbooks/executions/:id", get(playbooks::execution_handler))
        .route(
            "/response-actions",
            get(response::list_handler).post(response::execute_handler),
        )
        .route("/network/flows", get(network::flows_handler))
        .route("/network/traffic", get(network::traffic_handler))
        .route("/network/metrics", get(network::metrics_handler))
        .route("/network/anomalies", get(network::anomalies_handler))
        .route("/threat-intel", get(threats::intel_handler))
        .route("/threat-analysis", get(threats::analysis_handler))
}

/// `{ "success": true, ...inner }`
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub inner: T,
}

impl<T: Serialize> Success<T> {
    pub fn new(inner: T) -> Self {
        Self {
            success: true,
            inner,
        }
    }
}

/// Parse a JSON request body
///
/// An empty body reads as `{}` so absent fields surface as 400s, as do
/// wrongly typed values. Anything that is not valid JSON is a processing
/// failure.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_slice(b"{}").map_err(SocError::from_json_body);
    }
    serde_json::from_slice(body).map_err(SocError::from_json_body)
}

/// Trimmed, non-empty string field
pub(crate) fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
