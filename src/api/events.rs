use axum::extract::{Path, Query, State};
use axum::Json;

use crate::error::{Result, SocError};
use crate::query::{EventParams, EventQuery};
use crate::server::state::AppState;
use crate::types::SecurityEvent;

/// GET /api/events - Filtered, paginated events, newest first.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<EventParams>,
) -> Result<Json<serde_json::Value>> {
    let query = EventQuery::from_params(&params)?;
    let page = state.dashboard.store().query_events(&query).await?;
    Ok(Json(serde_json::json!({
        "events": page.items,
        "total": page.total,
        "offset": page.offset,
        "limit": page.limit,
    })))
}

/// GET /api/events/:id
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SecurityEvent>> {
    state
        .dashboard
        .store()
        .event(&id)
        .await?
        .map(Json)
        .ok_or_else(|| SocError::NotFound(format!("Event {}", id)))
}
