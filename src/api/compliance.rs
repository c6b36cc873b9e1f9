use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;

use crate::error::{Result, SocError};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(default)]
    pub log_data: Option<serde_json::Value>,
    #[serde(default)]
    pub control_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FixRequest {
    #[serde(default)]
    pub control_id: Option<String>,
    #[serde(default)]
    pub playbook_id: Option<String>,
}

/// GET /api/compliance - Per-framework and per-control posture.
pub async fn posture_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let evaluations = state.dashboard.store().evaluations().await?;
    let controls = state.compliance.posture(&evaluations);
    let frameworks = state.compliance.framework_scores(&controls);
    Ok(Json(serde_json::json!({
        "frameworks": frameworks,
        "controls": controls,
    })))
}

/// POST /api/compliance/evaluate - Score a log sample against one control.
pub async fn evaluate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>> {
    let req: EvaluateRequest = super::parse_body(&body)?;

    let log_data = req.log_data.filter(|v| !v.is_null());
    let control_id = super::field(&req.control_id);
    let mut missing = Vec::new();
    if log_data.is_none() {
        missing.push("log_data");
    }
    if control_id.is_none() {
        missing.push("control_id");
    }
    let (Some(log_data), Some(control_id)) = (log_data, control_id) else {
        return Err(SocError::MissingFields(missing));
    };

    let evaluation = state.compliance.evaluate(control_id, &log_data, Utc::now())?;
    state
        .dashboard
        .store()
        .record_evaluation(evaluation.clone())
        .await?;

    Ok(Json(serde_json::json!({ "success": true, "evaluation": evaluation })))
}

/// POST /api/compliance/fix - Run a remediation playbook for a control.
pub async fn fix_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>> {
    let req: FixRequest = super::parse_body(&body)?;

    let control_id = super::field(&req.control_id);
    let playbook_id = super::field(&req.playbook_id);
    let mut missing = Vec::new();
    if control_id.is_none() {
        missing.push("control_id");
    }
    if playbook_id.is_none() {
        missing.push("playbook_id");
    }
    let (Some(control_id), Some(playbook_id)) = (control_id, playbook_id) else {
        return Err(SocError::MissingFields(missing));
    };

    let control = state
        .compliance
        .control(control_id)
        .ok_or_else(|| SocError::NotFound(format!("Control {}", control_id)))?;
    let incident_id = format!("compliance-{}", control.id);
    let execution = state.playbooks.execute(playbook_id, &incident_id).await?;

    Ok(Json(serde_json::json!({ "success": true, "execution": execution })))
}
