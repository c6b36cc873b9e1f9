//! Compliance control evaluation
//!
//! Each control carries evidence patterns (things a compliant log should
//! show) and violation patterns (things it must not show). Evaluating a log
//! sample scores it against one control; the aggregation store keeps the
//! latest evaluation per control for the posture view.

use crate::error::{Result, SocError};
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Score deducted per violation found
const VIOLATION_PENALTY: i32 = 25;
const COMPLIANT_MIN_SCORE: u8 = 80;
const PARTIAL_MIN_SCORE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    Partial,
    NonCompliant,
}

impl ComplianceStatus {
    pub fn from_score(score: u8, violations: usize) -> Self {
        if score >= COMPLIANT_MIN_SCORE && violations == 0 {
            Self::Compliant
        } else if score >= PARTIAL_MIN_SCORE {
            Self::Partial
        } else {
            Self::NonCompliant
        }
    }
}

/// Result of evaluating a log sample against one control
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub control_id: String,
    pub title: String,
    pub frameworks: Vec<String>,
    pub status: ComplianceStatus,
    pub score: u8,
    pub evidence_found: Vec<String>,
    pub violations: Vec<String>,
    /// Human-readable gaps: missing evidence and violations
    pub findings: Vec<String>,
    pub recommended_playbook: String,
    pub evaluated_at: DateTime<Utc>,
}

struct ControlDef {
    id: &'static str,
    title: &'static str,
    frameworks: &'static [&'static str],
    baseline_score: u8,
    evidence: &'static [(&'static str, &'static str)],
    violations: &'static [(&'static str, &'static str)],
    playbook: &'static str,
}

const CONTROLS: &[ControlDef] = &[
    ControlDef {
        id: "AC-2",
        title: "Account Management",
        frameworks: &["NIST 800-53", "SOC 2"],
        baseline_score: 82,
        evidence: &[
            ("account lifecycle logged", r"account\s+(created|provisioned)"),
            ("deprovisioning logged", r"account\s+(disabled|deprovisioned|removed)"),
            ("periodic access review", r"access\s+review"),
        ],
        violations: &[
            ("shared account in use", r"shared\s+account"),
            ("orphaned account", r"orphan(ed)?\s+account"),
        ],
        playbook: "pb-compliance-remediation",
    },
    ControlDef {
        id: "AC-7",
        title: "Unsuccessful Logon Attempts",
        frameworks: &["NIST 800-53", "PCI DSS"],
        baseline_score: 88,
        evidence: &[
            ("account lockout enforced", r"lock(ed)?\s*out"),
            ("failed logons recorded", r"failed\s+(login|logon)"),
        ],
        violations: &[
            ("lockout disabled", r"lockout\s+disabled"),
            ("unlimited logon attempts", r"unlimited\s+(login|logon)\s+attempts"),
        ],
        playbook: "pb-brute-force",
    },
    ControlDef {
        id: "AU-6",
        title: "Audit Record Review",
        frameworks: &["NIST 800-53", "ISO 27001", "SOC 2"],
        baseline_score: 76,
        evidence: &[
            ("audit logs reviewed", r"audit\s+log\s+reviewed"),
            ("centralized collection", r"\bsiem\b"),
            ("alerts triaged", r"alert\s+(triaged|reviewed)"),
        ],
        violations: &[
            ("audit logging disabled", r"audit\s+logging\s+disabled"),
            ("log gap or deletion", r"log\s+(gap|deleted|cleared)"),
        ],
        playbook: "pb-compliance-remediation",
    },
    ControlDef {
        id: "IA-2",
        title: "Identification and Authentication",
        frameworks: &["NIST 800-53", "PCI DSS", "ISO 27001"],
        baseline_score: 91,
        evidence: &[
            ("multi-factor authentication", r"\bmfa\b|multi-factor"),
            ("single sign-on", r"\bsso\b|single\s+sign-on"),
        ],
        violations: &[
            ("password-only login", r"password[\s-]only"),
            ("mfa bypassed", r"mfa\s+(bypass(ed)?|disabled)"),
        ],
        playbook: "pb-compliance-remediation",
    },
    ControlDef {
        id: "SC-7",
        title: "Boundary Protection",
        frameworks: &["NIST 800-53", "PCI DSS"],
        baseline_score: 79,
        evidence: &[
            ("firewall enforcement", r"firewall"),
            ("default deny", r"deny\s+(by\s+)?default|default\s+deny"),
            ("network segmentation", r"segmentation|segmented"),
        ],
        violations: &[
            ("any-any rule", r"any[\s-]any|0\.0\.0\.0/0"),
            ("telnet exposed", r"telnet|port\s+23\b"),
        ],
        playbook: "pb-data-exfiltration",
    },
    ControlDef {
        id: "SI-4",
        title: "System Monitoring",
        frameworks: &["NIST 800-53", "ISO 27001", "SOC 2"],
        baseline_score: 84,
        evidence: &[
            ("intrusion detection", r"\bids\b|\bips\b|intrusion\s+detection"),
            ("endpoint detection", r"\bedr\b"),
            ("monitoring enabled", r"monitoring\s+enabled"),
        ],
        violations: &[
            ("sensor offline", r"agent\s+(offline|disabled)"),
            ("monitoring disabled", r"monitoring\s+disabled"),
        ],
        playbook: "pb-malware-containment",
    },
    ControlDef {
        id: "CM-6",
        title: "Configuration Settings",
        frameworks: &["NIST 800-53", "ISO 27001", "PCI DSS"],
        baseline_score: 73,
        evidence: &[
            ("configuration baseline", r"baseline"),
            ("hardening benchmark", r"cis\s+benchmark|hardening"),
        ],
        violations: &[
            ("default credentials", r"default\s+(password|credentials)"),
            ("debug mode enabled", r"debug\s+mode\s+enabled"),
        ],
        playbook: "pb-compliance-remediation",
    },
];

/// A control with compiled patterns
pub struct Control {
    pub id: String,
    pub title: String,
    pub frameworks: Vec<String>,
    pub baseline_score: u8,
    pub remediation_playbook: String,
    evidence: Vec<(String, Regex)>,
    violations: Vec<(String, Regex)>,
}

/// Catalog summary row for `GET /api/compliance`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPosture {
    pub control_id: String,
    pub title: String,
    pub frameworks: Vec<String>,
    pub score: u8,
    pub status: ComplianceStatus,
    /// None until the control has been evaluated
    pub last_evaluated: Option<DateTime<Utc>>,
    pub remediation_playbook: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkScore {
    pub framework: String,
    pub score: u8,
    pub controls: usize,
    pub evaluated: usize,
    pub status: ComplianceStatus,
}

/// Control catalog and evaluator
pub struct ComplianceEngine {
    controls: Vec<Control>,
}

fn compile(patterns: &[(&str, &str)]) -> Result<Vec<(String, Regex)>> {
    patterns
        .iter()
        .map(|(label, pattern)| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(|re| (label.to_string(), re))
                .map_err(|e| SocError::Config(format!("Invalid control pattern '{}': {}", pattern, e)))
        })
        .collect()
}

impl ComplianceEngine {
    pub fn new() -> Result<Self> {
        let controls = CONTROLS
            .iter()
            .map(|def| {
                Ok(Control {
                    id: def.id.to_string(),
                    title: def.title.to_string(),
                    frameworks: def.frameworks.iter().map(|f| f.to_string()).collect(),
                    baseline_score: def.baseline_score,
                    remediation_playbook: def.playbook.to_string(),
                    evidence: compile(def.evidence)?,
                    violations: compile(def.violations)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { controls })
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Case-insensitive control lookup
    pub fn control(&self, id: &str) -> Option<&Control> {
        let id = id.trim();
        self.controls.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }

    /// Evaluate a log sample against a control
    pub fn evaluate(
        &self,
        control_id: &str,
        log_data: &serde_json::Value,
        now: DateTime<Utc>,
    ) -> Result<Evaluation> {
        let control = self
            .control(control_id)
            .ok_or_else(|| SocError::NotFound(format!("Control {}", control_id.trim())))?;
        let text = log_text(log_data);

        let mut evidence_found = Vec::new();
        let mut findings = Vec::new();
        for (label, re) in &control.evidence {
            if re.is_match(&text) {
                evidence_found.push(label.clone());
            } else {
                findings.push(format!("Missing evidence: {}", label));
            }
        }

        let violations: Vec<String> = control
            .violations
            .iter()
            .filter(|(_, re)| re.is_match(&text))
            .map(|(label, _)| label.clone())
            .collect();
        findings.extend(violations.iter().map(|v| format!("Violation: {}", v)));

        let coverage = if control.evidence.is_empty() {
            100
        } else {
            (100.0 * evidence_found.len() as f64 / control.evidence.len() as f64).round() as i32
        };
        let score = (coverage - VIOLATION_PENALTY * violations.len() as i32).clamp(0, 100) as u8;
        let status = ComplianceStatus::from_score(score, violations.len());

        tracing::info!(
            control = %control.id,
            score,
            status = ?status,
            violations = violations.len(),
            "Compliance control evaluated"
        );

        Ok(Evaluation {
            control_id: control.id.clone(),
            title: control.title.clone(),
            frameworks: control.frameworks.clone(),
            status,
            score,
            evidence_found,
            violations,
            findings,
            recommended_playbook: control.remediation_playbook.clone(),
            evaluated_at: now,
        })
    }

    /// Per-control posture, using the latest evaluation or the baseline
    pub fn posture(&self, evaluations: &[Evaluation]) -> Vec<ControlPosture> {
        let latest: HashMap<&str, &Evaluation> = evaluations
            .iter()
            .map(|e| (e.control_id.as_str(), e))
            .collect();

        self.controls
            .iter()
            .map(|c| match latest.get(c.id.as_str()) {
                Some(eval) => ControlPosture {
                    control_id: c.id.clone(),
                    title: c.title.clone(),
                    frameworks: c.frameworks.clone(),
                    score: eval.score,
                    status: eval.status,
                    last_evaluated: Some(eval.evaluated_at),
                    remediation_playbook: c.remediation_playbook.clone(),
                },
                None => ControlPosture {
                    control_id: c.id.clone(),
                    title: c.title.clone(),
                    frameworks: c.frameworks.clone(),
                    score: c.baseline_score,
                    status: ComplianceStatus::from_score(c.baseline_score, 0),
                    last_evaluated: None,
                    remediation_playbook: c.remediation_playbook.clone(),
                },
            })
            .collect()
    }

    /// Mean control score per framework
    pub fn framework_scores(&self, posture: &[ControlPosture]) -> Vec<FrameworkScore> {
        let mut by_framework: BTreeMap<&str, Vec<&ControlPosture>> = BTreeMap::new();
        for row in posture {
            for fw in &row.frameworks {
                by_framework.entry(fw.as_str()).or_default().push(row);
            }
        }

        by_framework
            .into_iter()
            .map(|(framework, rows)| {
                let sum: u32 = rows.iter().map(|r| r.score as u32).sum();
                let score = (sum as f64 / rows.len() as f64).round() as u8;
                FrameworkScore {
                    framework: framework.to_string(),
                    score,
                    controls: rows.len(),
                    evaluated: rows.iter().filter(|r| r.last_evaluated.is_some()).count(),
                    status: ComplianceStatus::from_score(score, 0),
                }
            })
            .collect()
    }
}

/// Flatten arbitrary JSON log data into searchable text
fn log_text(log_data: &serde_json::Value) -> String {
    match log_data {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(log_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
