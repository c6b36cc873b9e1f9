use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dirs;
use crate::error::{Result, SocError};
use crate::types::Severity;

/// Largest accepted `ingest.max_clock_skew_secs` (one year)
pub const MAX_CLOCK_SKEW_SECS: u64 = 365 * 24 * 60 * 60;

/// User-configurable settings for the SOC server and CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocConfig {
    /// Host address for the HTTP server (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP server (default: 3001)
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub playbooks: PlaybookConfig,

    #[serde(default)]
    pub response: ResponseConfig,

    #[serde(default)]
    pub simulator: SimulatorConfig,
}

/// Aggregation store bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Events retained in memory; oldest evicted first
    pub max_events: usize,
    pub max_alerts: usize,
    /// Minutes of per-minute series kept
    pub retention_minutes: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_events: 10_000,
            max_alerts: 5_000,
            retention_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Events at or above this severity raise an alert
    pub alert_min_severity: Severity,
    /// Event timestamps further in the future fall back to ingest time
    pub max_clock_skew_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            alert_min_severity: Severity::Medium,
            max_clock_skew_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybookConfig {
    /// Time each playbook step takes
    pub step_delay_ms: u64,
    pub max_executions: usize,
}

impl Default for PlaybookConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: 750,
            max_executions: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    pub history_limit: usize,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            history_limit: 1_000,
        }
    }
}

/// Synthetic event generator fed through the normal ingest path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub events_per_tick: usize,
    /// Events ingested once at startup
    pub seed_events: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: 5,
            events_per_tick: 3,
            seed_events: 25,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            store: StoreConfig::default(),
            ingest: IngestConfig::default(),
            playbooks: PlaybookConfig::default(),
            response: ResponseConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl SocConfig {
    /// Load configuration from `path`, falling back to defaults if it is absent.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            SocError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: SocConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve `--config` or the default path.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(dirs::config_path)
    }

    /// Returns the server bind address string (e.g., "127.0.0.1:3001").
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<()> {
        if self.store.max_events == 0 || self.store.max_alerts == 0 {
            return Err(SocError::Config(
                "store.max_events and store.max_alerts must be > 0".to_string(),
            ));
        }
        if self.store.retention_minutes == 0 {
            return Err(SocError::Config(
                "store.retention_minutes must be > 0".to_string(),
            ));
        }
        if self.ingest.max_clock_skew_secs > MAX_CLOCK_SKEW_SECS {
            return Err(SocError::Config(format!(
                "ingest.max_clock_skew_secs must be <= {}",
                MAX_CLOCK_SKEW_SECS
            )));
        }
        if self.simulator.interval_secs == 0 {
            return Err(SocError::Config(
                "simulator.interval_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
