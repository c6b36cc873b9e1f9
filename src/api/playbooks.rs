use axum::extract::{Path, State};
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;

use super::Success;
use crate::error::{Result, SocError};
use crate::playbook::{Execution, Playbook};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub playbook_id: Option<String>,
    #[serde(default)]
    pub incident_id: Option<String>,
}

/// GET /api/playbooks - Playbook catalog.
pub async fn list_handler(State(state): State<AppState>) -> Json<Vec<Playbook>> {
    Json(state.playbooks.catalog().to_vec())
}

/// POST /api/playbooks/execute - Start a playbook for an incident.
pub async fn execute_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Success<Execution>>> {
    let req: ExecuteRequest = super::parse_body(&body)?;

    let playbook_id = super::field(&req.playbook_id);
    let incident_id = super::field(&req.incident_id);
    let mut missing = Vec::new();
    if playbook_id.is_none() {
        missing.push("playbook_id");
    }
    if incident_id.is_none() {
        missing.push("incident_id");
    }
    let (Some(playbook_id), Some(incident_id)) = (playbook_id, incident_id) else {
        return Err(SocError::MissingFields(missing));
    };

    let execution = state.playbooks.execute(playbook_id, incident_id).await?;
    Ok(Json(Success::new(execution)))
}

/// GET /api/playbooks/executions - Executions, newest first.
pub async fn executions_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let executions = state.playbooks.list().await;
    Json(serde_json::json!({
        "total": executions.len(),
        "executions": executions,
    }))
}

/// GET /api/playbooks/executions/:id
pub async fn execution_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Execution>> {
    state
        .playbooks
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| SocError::NotFound(format!("Execution {}", id)))
}
