use axum::extract::State;
use axum::Json;
use bytes::Bytes;
use serde::Deserialize;

use crate::error::{Result, SocError};
use crate::ingest::normalize_event_type;
use crate::schema::{Compatibility, DetailSchema};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub compatibility: Option<Compatibility>,
}

/// GET /api/schemas - Registered detail schemas.
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let schemas = state.dashboard.schemas();
    Ok(Json(serde_json::json!({
        "types": schemas.list_types()?,
        "schemas": schemas.list()?,
    })))
}

/// POST /api/schemas - Register a new schema version.
pub async fn register_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>> {
    let req: RegisterRequest = super::parse_body(&body)?;

    let event_type = super::field(&req.event_type);
    let mut missing = Vec::new();
    if event_type.is_none() {
        missing.push("event_type");
    }
    if req.version.is_none() {
        missing.push("version");
    }
    let (Some(event_type), Some(version)) = (event_type, req.version) else {
        return Err(SocError::MissingFields(missing));
    };

    let schema = DetailSchema {
        event_type: normalize_event_type(event_type)?,
        version,
        required_fields: req.required_fields,
        description: req.description.unwrap_or_default(),
    };
    state
        .dashboard
        .schemas()
        .register_checked(schema.clone(), req.compatibility.unwrap_or_default())?;

    Ok(Json(serde_json::json!({ "success": true, "schema": schema })))
}
