use std::sync::Arc;
use std::time::Instant;

use crate::compliance::ComplianceEngine;
use crate::config::SocConfig;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::playbook::PlaybookRunner;
use crate::response::ResponseEngine;

/// Shared application state accessible to all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub compliance: Arc<ComplianceEngine>,
    pub playbooks: Arc<PlaybookRunner>,
    pub response: Arc<ResponseEngine>,
    pub started_at: Instant,
}

impl AppState {
    /// Build every component from configuration.
    pub fn new(config: SocConfig) -> Result<Self> {
        let dashboard = Arc::new(Dashboard::from_config(&config));
        let compliance = Arc::new(ComplianceEngine::new()?);
        let playbooks = Arc::new(PlaybookRunner::new(&config.playbooks));
        let response = Arc::new(ResponseEngine::new(dashboard.clone(), &config.response));

        Ok(Self {
            dashboard,
            compliance,
            playbooks,
            response,
            started_at: Instant::now(),
        })
    }
}
