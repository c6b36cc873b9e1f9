use axum::extract::State;
use axum::Json;

use crate::error::Result;
use crate::server::state::AppState;

/// GET /api/health - Liveness plus store totals.
pub async fn handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let summary = state.dashboard.store().summary().await?;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptimeSecs": state.started_at.elapsed().as_secs(),
        "store": state.dashboard.store_name(),
        "events": summary.total_events,
        "alerts": summary.total_alerts,
    })))
}
