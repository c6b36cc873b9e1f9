use axum::Json;
use chrono::Utc;

use crate::synthetic::{self, ThreatAnalysis, ThreatIntel};

/// GET /api/threat-intel - Indicators and feed status.
pub async fn intel_handler() -> Json<ThreatIntel> {
    Json(synthetic::threat_intel(&mut rand::thread_rng(), Utc::now()))
}

/// GET /api/threat-analysis - Risk score and attack vector trends.
pub async fn analysis_handler() -> Json<ThreatAnalysis> {
    Json(synthetic::threat_analysis(&mut rand::thread_rng(), Utc::now()))
}
