use clap::Parser;
use tracing_subscriber::EnvFilter;

use a3s_soc::cli::{Cli, Commands, ConfigAction};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            config,
            simulate,
        } => {
            a3s_soc::cli::serve::execute(host, port, config.as_deref(), simulate).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { config } => {
                a3s_soc::cli::config::show(config.as_deref())?;
            }
            ConfigAction::Init { config, force } => {
                a3s_soc::cli::config::init(config.as_deref(), force)?;
            }
        },
    }

    Ok(())
}
