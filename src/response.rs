//! Response actions
//!
//! Containment actions are simulated: each one updates the active
//! containment sets, is appended to a bounded history, and is ingested back
//! into the dashboard as a `response_action` event.

use crate::config::ResponseConfig;
use crate::dashboard::Dashboard;
use crate::error::{Result, SocError};
use crate::ingest::IngestRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Event type recorded for every executed action
pub const RESPONSE_EVENT_TYPE: &str = "response_action";
const RESPONSE_SOURCE: &str = "soar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseAction {
    BlockIp,
    UnblockIp,
    IsolateHost,
    ReleaseHost,
    DisableUser,
    QuarantineFile,
    KillProcess,
    ResetPassword,
}

impl ResponseAction {
    pub const ALL: [ResponseAction; 8] = [
        ResponseAction::BlockIp,
        ResponseAction::UnblockIp,
        ResponseAction::IsolateHost,
        ResponseAction::ReleaseHost,
        ResponseAction::DisableUser,
        ResponseAction::QuarantineFile,
        ResponseAction::KillProcess,
        ResponseAction::ResetPassword,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlockIp => "block_ip",
            Self::UnblockIp => "unblock_ip",
            Self::IsolateHost => "isolate_host",
            Self::ReleaseHost => "release_host",
            Self::DisableUser => "disable_user",
            Self::QuarantineFile => "quarantine_file",
            Self::KillProcess => "kill_process",
            Self::ResetPassword => "reset_password",
        }
    }

    fn requires_ip(&self) -> bool {
        matches!(self, Self::BlockIp | Self::UnblockIp)
    }

    fn message(&self, target: &str) -> String {
        match self {
            Self::BlockIp => format!("Blocked IP {} at the perimeter firewall", target),
            Self::UnblockIp => format!("Unblocked IP {}", target),
            Self::IsolateHost => format!("Isolated host {} from the network", target),
            Self::ReleaseHost => format!("Released host {} from isolation", target),
            Self::DisableUser => format!("Disabled user account {}", target),
            Self::QuarantineFile => format!("Quarantined file {}", target),
            Self::KillProcess => format!("Terminated process {}", target),
            Self::ResetPassword => format!("Forced password reset for {}", target),
        }
    }
}

impl fmt::Display for ResponseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseAction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| format!("unsupported action '{}'", s))
    }
}

/// Body of `POST /api/response-actions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    /// Unique action identifier (act-<uuid>)
    pub action_id: String,
    pub action: ResponseAction,
    pub target: String,
    pub reason: Option<String>,
    pub status: &'static str,
    pub message: String,
    pub executed_at: DateTime<Utc>,
}

/// Currently contained entities
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveContainment {
    pub blocked_ips: BTreeSet<String>,
    pub isolated_hosts: BTreeSet<String>,
    pub disabled_users: BTreeSet<String>,
}

impl ActiveContainment {
    fn apply(&mut self, action: ResponseAction, target: &str) {
        let target = target.to_string();
        match action {
            ResponseAction::BlockIp => {
                self.blocked_ips.insert(target);
            }
            ResponseAction::UnblockIp => {
                self.blocked_ips.remove(&target);
            }
            ResponseAction::IsolateHost => {
                self.isolated_hosts.insert(target);
            }
            ResponseAction::ReleaseHost => {
                self.isolated_hosts.remove(&target);
            }
            ResponseAction::DisableUser => {
                self.disabled_users.insert(target);
            }
            ResponseAction::QuarantineFile
            | ResponseAction::KillProcess
            | ResponseAction::ResetPassword => {}
        }
    }
}

#[derive(Default)]
struct State {
    history: VecDeque<ActionResult>,
    active: ActiveContainment,
}

/// Executes response actions and tracks containment
pub struct ResponseEngine {
    dashboard: Arc<Dashboard>,
    state: RwLock<State>,
    history_limit: usize,
}

impl ResponseEngine {
    pub fn new(dashboard: Arc<Dashboard>, config: &ResponseConfig) -> Self {
        Self {
            dashboard,
            state: RwLock::new(State::default()),
            history_limit: config.history_limit.max(1),
        }
    }

    pub async fn execute(&self, req: ActionRequest) -> Result<ActionResult> {
        let action = non_blank(req.action.as_deref());
        let target = non_blank(req.target.as_deref());

        let mut missing = Vec::new();
        if action.is_none() {
            missing.push("action");
        }
        if target.is_none() {
            missing.push("target");
        }
        let (Some(action), Some(target)) = (action, target) else {
            return Err(SocError::MissingFields(missing));
        };

        let action: ResponseAction = action.parse().map_err(|e| SocError::invalid("action", e))?;
        if action.requires_ip() && target.parse::<IpAddr>().is_err() {
            return Err(SocError::invalid(
                "target",
                format!("'{}' is not an IP address", target),
            ));
        }

        let result = ActionResult {
            action_id: format!("act-{}", uuid::Uuid::new_v4()),
            action,
            target: target.to_string(),
            reason: non_blank(req.reason.as_deref()).map(str::to_string),
            status: "completed",
            message: action.message(target),
            executed_at: Utc::now(),
        };

        {
            let mut state = self.state.write().await;
            state.active.apply(action, target);
            state.history.push_back(result.clone());
            while state.history.len() > self.history_limit {
                state.history.pop_front();
            }
        }

        tracing::info!(
            action_id = %result.action_id,
            action = %action,
            target = %result.target,
            "Response action executed"
        );

        let details = serde_json::json!({
            "severity": "low",
            "message": result.message,
            "action": action.as_str(),
            "target": result.target,
            "reason": result.reason,
            "actionId": result.action_id,
        });
        if let Err(e) = self
            .dashboard
            .ingest(IngestRequest::new(RESPONSE_EVENT_TYPE, RESPONSE_SOURCE, details))
            .await
        {
            tracing::warn!(action_id = %result.action_id, error = %e, "Failed to record response action event");
        }

        Ok(result)
    }

    /// Executed actions, newest first
    pub async fn history(&self) -> Vec<ActionResult> {
        self.state.read().await.history.iter().rev().cloned().collect()
    }

    pub async fn active(&self) -> ActiveContainment {
        self.state.read().await.active.clone()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
