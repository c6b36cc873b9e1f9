use axum::extract::State;
use axum::Json;
use bytes::Bytes;

use super::Success;
use crate::error::Result;
use crate::response::{ActionRequest, ActionResult};
use crate::server::state::AppState;

/// POST /api/response-actions - Execute a containment action.
pub async fn execute_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Success<ActionResult>>> {
    let req: ActionRequest = super::parse_body(&body)?;
    let result = state.response.execute(req).await?;
    Ok(Json(Success::new(result)))
}

/// GET /api/response-actions - Action history and active containment.
pub async fn list_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "history": state.response.history().await,
        "active": state.response.active().await,
    }))
}
