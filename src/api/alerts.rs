use axum::extract::{Path, Query, State};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::{Result, SocError};
use crate::query::{AlertParams, AlertQuery};
use crate::server::state::AppState;
use crate::types::{Alert, AlertStatus};

/// GET /api/alerts - Filtered, paginated alerts, newest first.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<AlertParams>,
) -> Result<Json<serde_json::Value>> {
    let query = AlertQuery::from_params(&params)?;
    let page = state.dashboard.store().query_alerts(&query).await?;
    Ok(Json(serde_json::json!({
        "alerts": page.items,
        "total": page.total,
        "offset": page.offset,
        "limit": page.limit,
    })))
}

/// GET /api/alerts/:id
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Alert>> {
    state
        .dashboard
        .store()
        .alert(&id)
        .await?
        .map(Json)
        .ok_or_else(|| SocError::NotFound(format!("Alert {}", id)))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
}

/// PATCH /api/alerts/:id - Move an alert through triage.
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<serde_json::Value>> {
    let update: StatusUpdate = super::parse_body(&body)?;
    let status: AlertStatus = super::field(&update.status)
        .ok_or_else(|| SocError::MissingFields(vec!["status"]))?
        .parse()
        .map_err(|e| SocError::invalid("status", e))?;

    let alert = state.dashboard.store().set_alert_status(&id, status).await?;
    Ok(Json(serde_json::json!({ "success": true, "alert": alert })))
}
