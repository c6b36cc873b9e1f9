//! Playbook catalog and executor
//!
//! An execution walks its playbook's steps on a background task, one step
//! every `step_delay`. Executions live in memory and are evicted oldest
//! finished first once `max_executions` is exceeded.

use crate::config::PlaybookConfig;
use crate::error::{Result, SocError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::Duration;

struct PlaybookDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    /// (step name, action)
    steps: &'static [(&'static str, &'static str)],
}

const PLAYBOOKS: &[PlaybookDef] = &[
    PlaybookDef {
        id: "pb-malware-containment",
        name: "Malware Containment",
        description: "Isolate the infected host, quarantine the sample, and sweep for spread",
        steps: &[
            ("Isolate affected host", "isolate_host"),
            ("Quarantine malicious file", "quarantine_file"),
            ("Kill malicious processes", "kill_process"),
            ("Scan adjacent hosts", "scan_network"),
            ("Notify incident team", "notify"),
        ],
    },
    PlaybookDef {
        id: "pb-phishing-response",
        name: "Phishing Response",
        description: "Pull the message, block the sender, and reset exposed credentials",
        steps: &[
            ("Remove message from mailboxes", "purge_email"),
            ("Block sender domain", "block_domain"),
            ("Reset credentials of recipients who clicked", "reset_password"),
            ("Notify affected users", "notify"),
        ],
    },
    PlaybookDef {
        id: "pb-brute-force",
        name: "Brute Force Mitigation",
        description: "Block the attacking address and lock the targeted account",
        steps: &[
            ("Block source IP", "block_ip"),
            ("Lock targeted account", "disable_user"),
            ("Enforce MFA re-enrollment", "enforce_mfa"),
            ("Notify account owner", "notify"),
        ],
    },
    PlaybookDef {
        id: "pb-data-exfiltration",
        name: "Data Exfiltration Response",
        description: "Cut the exfiltration channel and preserve evidence",
        steps: &[
            ("Block destination address", "block_ip"),
            ("Isolate source host", "isolate_host"),
            ("Capture forensic snapshot", "snapshot"),
            ("Disable involved account", "disable_user"),
            ("Escalate to legal and privacy", "notify"),
        ],
    },
    PlaybookDef {
        id: "pb-compliance-remediation",
        name: "Compliance Remediation",
        description: "Re-apply the baseline configuration for a failing control",
        steps: &[
            ("Collect current configuration", "collect_config"),
            ("Apply baseline policy", "apply_policy"),
            ("Re-run control evaluation", "evaluate_control"),
            ("File remediation record", "notify"),
        ],
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct PlaybookStep {
    pub name: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Playbook {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<PlaybookStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Completed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRun {
    pub name: String,
    pub action: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// One run of a playbook against an incident
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Unique execution identifier (exec-<uuid>)
    pub id: String,
    pub playbook_id: String,
    pub playbook_name: String,
    pub incident_id: String,
    pub status: ExecutionStatus,
    pub steps: Vec<StepRun>,
    /// Index of the step in progress, or the step count once finished
    pub current_step: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Executions {
    by_id: HashMap<String, Execution>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

impl Executions {
    fn insert(&mut self, execution: Execution, max: usize) {
        self.order.push_back(execution.id.clone());
        self.by_id.insert(execution.id.clone(), execution);

        while self.order.len() > max {
            let victim = self
                .order
                .iter()
                .position(|id| {
                    self.by_id
                        .get(id)
                        .map_or(true, |e| e.status == ExecutionStatus::Completed)
                })
                .unwrap_or(0);
            if let Some(id) = self.order.remove(victim) {
                self.by_id.remove(&id);
            }
        }
    }
}

/// Runs playbooks from the static catalog
pub struct PlaybookRunner {
    catalog: Vec<Playbook>,
    executions: Arc<RwLock<Executions>>,
    step_delay: Duration,
    max_executions: usize,
}

impl PlaybookRunner {
    pub fn new(config: &PlaybookConfig) -> Self {
        let catalog = PLAYBOOKS
            .iter()
            .map(|def| Playbook {
                id: def.id.to_string(),
                name: def.name.to_string(),
                description: def.description.to_string(),
                steps: def
                    .steps
                    .iter()
                    .map(|(name, action)| PlaybookStep {
                        name: name.to_string(),
                        action: action.to_string(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            catalog,
            executions: Arc::new(RwLock::new(Executions::default())),
            step_delay: Duration::from_millis(config.step_delay_ms),
            max_executions: config.max_executions.max(1),
        }
    }

    pub fn catalog(&self) -> &[Playbook] {
        &self.catalog
    }

    pub fn playbook(&self, id: &str) -> Option<&Playbook> {
        let id = id.trim();
        self.catalog.iter().find(|p| p.id == id)
    }

    /// Start a playbook for an incident
    ///
    /// Returns the execution as created (status `running`, steps `pending`);
    /// progress is made on a spawned task.
    pub async fn execute(&self, playbook_id: &str, incident_id: &str) -> Result<Execution> {
        let playbook = self
            .playbook(playbook_id)
            .ok_or_else(|| SocError::NotFound(format!("Playbook {}", playbook_id.trim())))?;

        let execution = Execution {
            id: format!("exec-{}", uuid::Uuid::new_v4()),
            playbook_id: playbook.id.clone(),
            playbook_name: playbook.name.clone(),
            incident_id: incident_id.trim().to_string(),
            status: ExecutionStatus::Running,
            steps: playbook
                .steps
                .iter()
                .map(|s| StepRun {
                    name: s.name.clone(),
                    action: s.action.clone(),
                    status: StepStatus::Pending,
                    started_at: None,
                    completed_at: None,
                })
                .collect(),
            current_step: 0,
            started_at: Utc::now(),
            completed_at: None,
        };

        self.executions
            .write()
            .await
            .insert(execution.clone(), self.max_executions);

        tracing::info!(
            execution_id = %execution.id,
            playbook = %execution.playbook_id,
            incident = %execution.incident_id,
            "Playbook execution started"
        );

        tokio::spawn(run_steps(
            self.executions.clone(),
            execution.id.clone(),
            execution.steps.len(),
            self.step_delay,
        ));

        Ok(execution)
    }

    pub async fn get(&self, id: &str) -> Option<Execution> {
        self.executions.read().await.by_id.get(id).cloned()
    }

    /// Executions, newest first
    pub async fn list(&self) -> Vec<Execution> {
        let executions = self.executions.read().await;
        executions
            .order
            .iter()
            .rev()
            .filter_map(|id| executions.by_id.get(id).cloned())
            .collect()
    }
}

impl Default for PlaybookRunner {
    fn default() -> Self {
        Self::new(&PlaybookConfig::default())
    }
}

/// Walk an execution's steps; stops early if the execution was evicted
async fn run_steps(
    executions: Arc<RwLock<Executions>>,
    id: String,
    step_count: usize,
    step_delay: Duration,
) {
    for index in 0..step_count {
        {
            let mut guard = executions.write().await;
            let Some(exec) = guard.by_id.get_mut(&id) else {
                return;
            };
            exec.current_step = index;
            let step = &mut exec.steps[index];
            step.status = StepStatus::Running;
            step.started_at = Some(Utc::now());
            tracing::debug!(execution_id = %id, step = %step.name, "Playbook step running");
        }

        tokio::time::sleep(step_delay).await;

        {
            let mut guard = executions.write().await;
            let Some(exec) = guard.by_id.get_mut(&id) else {
                return;
            };
            let step = &mut exec.steps[index];
            step.status = StepStatus::Completed;
            step.completed_at = Some(Utc::now());
            tracing::debug!(execution_id = %id, step = %step.name, "Playbook step completed");
        }
    }

    let mut guard = executions.write().await;
    if let Some(exec) = guard.by_id.get_mut(&id) {
        exec.current_step = step_count;
        exec.status = ExecutionStatus::Completed;
        exec.completed_at = Some(Utc::now());
        tracing::info!(
            execution_id = %id,
            playbook = %exec.playbook_id,
            "Playbook execution completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_runner(max_executions: usize) -> PlaybookRunner {
        PlaybookRunner::new(&PlaybookConfig {
            step_delay_ms: 1,
            max_executions,
        })
    }

    async fn wait_completed(runner: &PlaybookRunner, id: &str) -> Execution {
        for _ in 0..200 {
            if let Some(exec) = runner.get(id).await {
                if exec.status == ExecutionStatus::Completed {
                    return exec;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("execution {} did not complete", id);
    }

    #[test]
    fn test_catalog() {
        let runner = PlaybookRunner::default();
        assert_eq!(runner.catalog().len(), 5);
        assert!(runner.playbook("pb-brute-force").is_some());
        assert!(runner.playbook("pb-nope").is_none());
        assert!(runner.catalog().iter().all(|p| !p.steps.is_empty()));
    }

    #[tokio::test]
    async fn test_execute_starts_pending() {
        let runner = PlaybookRunner::default();
        let exec = runner
            .execute("pb-malware-containment", "INC-1")
            .await
            .unwrap();

        assert!(exec.id.starts_with("exec-"));
        assert_eq!(exec.status, ExecutionStatus::Running);
        assert_eq!(exec.incident_id, "INC-1");
        assert!(exec.steps.iter().all(|s| s.status == StepStatus::Pending));
        assert!(exec.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_execution_runs_to_completion() {
        let runner = fast_runner(10);
        let exec = runner.execute("pb-brute-force", "INC-2").await.unwrap();

        let done = wait_completed(&runner, &exec.id).await;
        assert!(done.steps.iter().all(|s| s.status == StepStatus::Completed));
        assert_eq!(done.current_step, done.steps.len());
        assert!(done.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_playbook() {
        let runner = PlaybookRunner::default();
        let err = runner.execute("pb-unknown", "INC-3").await.unwrap_err();
        assert!(matches!(err, SocError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first_and_bounded() {
        let runner = fast_runner(2);
        let first = runner.execute("pb-brute-force", "a").await.unwrap();
        wait_completed(&runner, &first.id).await;
        runner.execute("pb-brute-force", "b").await.unwrap();
        runner.execute("pb-brute-force", "c").await.unwrap();

        let list = runner.list().await;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].incident_id, "c");
        assert!(runner.get(&first.id).await.is_none());
    }

    #[test]
    fn test_execution_serializes_camel_case() {
        let exec = Execution {
            id: "exec-1".into(),
            playbook_id: "pb-brute-force".into(),
            playbook_name: "Brute Force Mitigation".into(),
            incident_id: "INC".into(),
            status: ExecutionStatus::Running,
            steps: vec![],
            current_step: 0,
            started_at: Utc::now(),
            completed_at: None,
        };
        let json = serde_json::to_value(&exec).unwrap();
        assert_eq!(json["playbookId"], "pb-brute-force");
        assert_eq!(json["status"], "running");
    }
}
