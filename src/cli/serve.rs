use std::path::Path;

use crate::config::SocConfig;
use crate::error::Result;
use crate::server;

/// Execute the `serve` command: start the HTTP server.
pub async fn execute(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
    simulate: bool,
) -> Result<()> {
    let mut config = SocConfig::load_from(&SocConfig::resolve_path(config_path))?;

    // Override config with CLI arguments
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if simulate {
        config.simulator.enabled = true;
    }

    println!("A3S SOC server starting...");
    println!("Listening on http://{}", config.bind_address());
    println!("Press Ctrl+C to stop");

    server::start(config).await
}
