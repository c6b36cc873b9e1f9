//! Background event simulator
//!
//! Feeds synthetic sensor events through the normal ingest path so a fresh
//! dashboard has something to show.

use crate::config::SimulatorConfig;
use crate::dashboard::Dashboard;
use crate::ingest::IngestRequest;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};

const USERS: &[&str] = &["alice", "bob", "carol", "dave", "svc-backup", "admin"];
const HOSTS: &[&str] = &["ws-014", "ws-027", "srv-db-01", "srv-web-02", "laptop-88"];
const PROCESSES: &[&str] = &["powershell.exe", "cmd.exe", "python3", "curl"];
const PORTS: &[u16] = &[22, 53, 80, 443, 3389];

/// Build one synthetic ingest request
pub fn random_request(rng: &mut impl Rng) -> IngestRequest {
    let ip = format!("10.{}.{}.{}", rng.gen::<u8>(), rng.gen::<u8>(), rng.gen_range(1..=254u8));
    let user = USERS.choose(rng).copied().unwrap_or("alice");
    let host = HOSTS.choose(rng).copied().unwrap_or("ws-014");
    let port = PORTS.choose(rng).copied().unwrap_or(443);
    let process = PROCESSES.choose(rng).copied().unwrap_or("cmd.exe");

    let (event_type, source, details) = match rng.gen_range(0..8u8) {
        0..=2 => (
            "network_flow",
            "fw-edge-01",
            serde_json::json!({
                "bytes": rng.gen_range(1_000..=5_000_000u64),
                "src_ip": ip,
                "dst_port": port,
            }),
        ),
        3 | 4 => (
            "login_failure",
            "idp",
            serde_json::json!({
                "user": user,
                "src_ip": ip,
                "message": format!("Failed login for {} from {}", user, ip),
            }),
        ),
        5 => (
            "port_scan",
            "ids-core",
            serde_json::json!({
                "src_ip": ip,
                "ports_probed": rng.gen_range(20..=1_000u32),
            }),
        ),
        6 => (
            "process_spawn",
            "edr",
            serde_json::json!({
                "host": host,
                "process": process,
            }),
        ),
        _ => (
            "malware_detected",
            "edr",
            serde_json::json!({
                "host": host,
                "title": format!("Malware detected on {}", host),
            }),
        ),
    };

    IngestRequest::new(event_type, source, details)
}

/// Periodic synthetic ingest
pub struct Simulator {
    dashboard: Arc<Dashboard>,
    config: SimulatorConfig,
    running: Arc<RwLock<bool>>,
}

impl Simulator {
    pub fn new(dashboard: Arc<Dashboard>, config: SimulatorConfig) -> Self {
        Self {
            dashboard,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Ingest `count` synthetic events; returns how many were accepted
    pub async fn ingest_batch(&self, count: usize) -> usize {
        ingest_batch(&self.dashboard, count).await
    }

    /// Seed the store, then ingest a batch every interval until stopped
    pub async fn start(&self) {
        let mut running = self.running.write().await;
        if *running {
            return;
        }
        *running = true;
        drop(running);

        let seeded = self.ingest_batch(self.config.seed_events).await;
        tracing::info!(
            seeded,
            interval_secs = self.config.interval_secs,
            events_per_tick = self.config.events_per_tick,
            "Event simulator started"
        );

        let dashboard = self.dashboard.clone();
        let running = self.running.clone();
        let per_tick = self.config.events_per_tick;
        let period = Duration::from_secs(self.config.interval_secs.max(1));

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; the seed batch already covered it
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if !*running.read().await {
                    break;
                }
                ingest_batch(&dashboard, per_tick).await;
            }

            tracing::info!("Event simulator stopped");
        });
    }

    pub async fn stop(&self) {
        *self.running.write().await = false;
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }
}

async fn ingest_batch(dashboard: &Dashboard, count: usize) -> usize {
    // ThreadRng is !Send; build the batch before awaiting
    let batch: Vec<IngestRequest> = {
        let mut rng = rand::thread_rng();
        (0..count).map(|_| random_request(&mut rng)).collect()
    };

    let mut accepted = 0;
    for req in batch {
        match dashboard.ingest(req).await {
            Ok(_) => accepted += 1,
            Err(e) => tracing::warn!(error = %e, "Simulated event rejected"),
        }
    }
    accepted
}
