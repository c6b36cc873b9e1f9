pub mod config;
pub mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// A3S SOC - Security-operations dashboard backend
#[derive(Debug, Parser)]
#[command(name = "a3s-soc", version, about)]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host address to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Config file (default: $A3S_SOC_HOME/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable the synthetic event simulator
        #[arg(long)]
        simulate: bool,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a default configuration file
    Init {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "a3s-soc", "serve", "--port", "8080", "--simulate", "--json-logs",
        ])
        .unwrap();
        assert!(cli.json_logs);
        match cli.command {
            Commands::Serve {
                host,
                port,
                simulate,
                ..
            } => {
                assert!(host.is_none());
                assert_eq!(port, Some(8080));
                assert!(simulate);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_config_init() {
        let cli = Cli::try_parse_from(["a3s-soc", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true, .. }
            }
        ));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
