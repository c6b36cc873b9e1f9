use axum::extract::{Query, State};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::{Result, SocError};
use crate::server::state::AppState;

const DEFAULT_REJECTED_LIMIT: usize = 100;

/// POST /api/ingest - Normalize and record one event.
pub async fn handler(State(state): State<AppState>, body: Bytes) -> Result<Json<serde_json::Value>> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        &body[..]
    };
    let receipt = state.dashboard.ingest_json(raw).await?;

    let mut out = serde_json::json!({
        "success": true,
        "message": "Event ingested",
        "id": receipt.id,
        "severity": receipt.severity,
    });
    if let Some(alert_id) = receipt.alert_id {
        out["alertId"] = serde_json::Value::String(alert_id);
    }
    Ok(Json(out))
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectedParams {
    pub limit: Option<String>,
}

/// GET /api/ingest/rejected - Most recent rejected ingest requests.
pub async fn rejected_handler(
    State(state): State<AppState>,
    Query(params): Query<RejectedParams>,
) -> Result<Json<serde_json::Value>> {
    let limit = match super::field(&params.limit) {
        None => DEFAULT_REJECTED_LIMIT,
        Some(s) => s
            .parse::<usize>()
            .map_err(|_| SocError::invalid("limit", format!("'{}' is not a number", s)))?,
    };

    let rejected = state.dashboard.rejected();
    Ok(Json(serde_json::json!({
        "rejected": rejected.list(limit).await,
        "total": rejected.count().await,
    })))
}
