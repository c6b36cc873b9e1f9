pub mod router;
pub mod state;

use crate::config::SocConfig;
use crate::error::{Result, SocError};
use crate::simulator::Simulator;

/// Start the HTTP server with the given configuration.
///
/// Runs until Ctrl-C, then drains in-flight requests.
pub async fn start(config: SocConfig) -> Result<()> {
    let bind_addr = config.bind_address();
    let simulator_config = config.simulator.clone();

    let app_state = state::AppState::new(config)?;
    tracing::info!(
        store = app_state.dashboard.store_name(),
        controls = app_state.compliance.controls().len(),
        playbooks = app_state.playbooks.catalog().len(),
        "Initialized dashboard core"
    );

    let simulator = simulator_config
        .enabled
        .then(|| Simulator::new(app_state.dashboard.clone(), simulator_config));
    if let Some(sim) = &simulator {
        sim.start().await;
    }

    let app = router::build(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| SocError::Server(format!("Failed to bind to {bind_addr}: {e}")))?;

    tracing::info!("Server listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SocError::Server(format!("Server error: {e}")))?;

    if let Some(sim) = &simulator {
        sim.stop().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
