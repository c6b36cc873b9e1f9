use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::error::Result;
use crate::query::parse_window;
use crate::server::state::AppState;
use crate::store::Summary;

/// GET /api/dashboard/stats - Rolling counters.
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<Summary>> {
    Ok(Json(state.dashboard.store().summary().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct SeriesParams {
    pub window: Option<String>,
}

/// GET /api/metrics/timeseries - Per-minute points, oldest first.
pub async fn timeseries_handler(
    State(state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<Json<serde_json::Value>> {
    let store = state.dashboard.store();
    let window = parse_window(params.window.as_deref(), store.retention_minutes())?;
    let points = store.series(window, Utc::now()).await?;
    Ok(Json(serde_json::json!({ "window": window, "points": points })))
}
