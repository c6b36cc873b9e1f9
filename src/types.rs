//! Core types for the a3s-soc system
//!
//! All types use camelCase JSON serialization for wire compatibility with
//! the dashboard frontend. Enum values are lowercase / snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of an event or alert, ordered `Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    /// Lenient parse used for inbound event details
    ///
    /// Accepts the four canonical names plus common vendor aliases.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" | "crit" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" | "warning" | "warn" => Some(Self::Medium),
            "low" | "info" | "informational" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| format!("unknown severity '{}'", s))
    }
}

/// Triage status of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Open,
    Investigating,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "new" => Ok(Self::Open),
            "investigating" => Ok(Self::Investigating),
            "resolved" | "closed" => Ok(Self::Resolved),
            "dismissed" | "false_positive" => Ok(Self::Dismissed),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Coarse grouping of event types for dashboard widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Network,
    Authentication,
    Malware,
    Endpoint,
    Compliance,
    Response,
    Other,
}

impl EventCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Authentication => "authentication",
            Self::Malware => "malware",
            Self::Endpoint => "endpoint",
            Self::Compliance => "compliance",
            Self::Response => "response",
            Self::Other => "other",
        }
    }

    /// Classify a normalized event type by keyword
    ///
    /// First matching group wins, so `malware_network_beacon` is malware.
    pub fn classify(event_type: &str) -> Self {
        const GROUPS: &[(EventCategory, &[&str])] = &[
            (
                EventCategory::Malware,
                &["malware", "virus", "ransomware", "trojan"],
            ),
            (
                EventCategory::Authentication,
                &["login", "auth", "password", "mfa"],
            ),
            (
                EventCategory::Network,
                &["network", "flow", "firewall", "dns", "traffic", "scan"],
            ),
            (
                EventCategory::Endpoint,
                &["process", "file", "host", "endpoint"],
            ),
            (
                EventCategory::Compliance,
                &["compliance", "audit", "policy"],
            ),
            (EventCategory::Response, &["response", "playbook"]),
        ];

        GROUPS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| event_type.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(EventCategory::Other)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "network" => Ok(Self::Network),
            "authentication" | "auth" => Ok(Self::Authentication),
            "malware" => Ok(Self::Malware),
            "endpoint" => Ok(Self::Endpoint),
            "compliance" => Ok(Self::Compliance),
            "response" => Ok(Self::Response),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// A normalized security event
///
/// Produced by the ingest normalizer; never mutated after it enters the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityEvent {
    /// Unique event identifier (evt-<uuid>)
    pub id: String,

    /// Normalized event type (e.g., "login_failure", "network_flow")
    pub event_type: String,

    /// Schema version of `details`
    #[serde(default = "default_version")]
    pub version: u32,

    pub category: EventCategory,

    pub severity: Severity,

    /// Reporting system (sensor, firewall, EDR, ...)
    pub source: String,

    /// Human-readable one-liner
    pub summary: String,

    /// Event details, always a JSON object
    pub details: serde_json::Value,

    /// When the event happened, as reported by the source
    pub timestamp: DateTime<Utc>,

    /// When the event was accepted by the ingest endpoint
    pub received_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

impl SecurityEvent {
    /// Network bytes carried by this event, if it is a network event
    ///
    /// Reads `details.bytes`, falling back to `bytes_in + bytes_out`.
    pub fn network_bytes(&self) -> Option<u64> {
        if self.category != EventCategory::Network {
            return None;
        }
        if let Some(bytes) = self.details.get("bytes").and_then(|v| v.as_u64()) {
            return Some(bytes);
        }
        let bytes_in = self.details.get("bytes_in").and_then(|v| v.as_u64());
        let bytes_out = self.details.get("bytes_out").and_then(|v| v.as_u64());
        match (bytes_in, bytes_out) {
            (None, None) => None,
            (i, o) => Some(i.unwrap_or(0).saturating_add(o.unwrap_or(0))),
        }
    }
}

/// An alert raised from an event at or above the alerting threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique alert identifier (alert-<uuid>)
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: AlertStatus,
    pub source: String,
    /// Event that raised this alert
    pub event_id: String,
    pub event_type: String,
    pub category: EventCategory,
    pub timestamp: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    /// Raise an open alert for an event
    pub fn from_event(event: &SecurityEvent) -> Self {
        let title = event
            .details
            .get("title")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} from {}", title_case(&event.event_type), event.source));

        Self {
            id: format!("alert-{}", uuid::Uuid::new_v4()),
            title,
            description: event.summary.clone(),
            severity: event.severity,
            status: AlertStatus::Open,
            source: event.source.clone(),
            event_id: event.id.clone(),
            event_type: event.event_type.clone(),
            category: event.category,
            timestamp: event.timestamp,
            updated_at: event.received_at,
        }
    }
}

/// "login_failure" -> "Login failure"
fn title_case(event_type: &str) -> String {
    let spaced = event_type.replace(['_', '.', ':'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(event_type: &str, details: serde_json::Value) -> SecurityEvent {
        SecurityEvent {
            id: "evt-1".to_string(),
            event_type: event_type.to_string(),
            version: 1,
            category: EventCategory::classify(event_type),
            severity: Severity::High,
            source: "fw-01".to_string(),
            summary: "summary".to_string(),
            details,
            timestamp: Utc::now(),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_severity_aliases() {
        assert_eq!(Severity::parse_lenient("WARNING"), Some(Severity::Medium));
        assert_eq!(Severity::parse_lenient(" info "), Some(Severity::Low));
        assert_eq!(Severity::parse_lenient("crit"), Some(Severity::Critical));
        assert_eq!(Severity::parse_lenient("urgent"), None);
        assert!("bogus".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn test_alert_status_parse() {
        assert_eq!("closed".parse::<AlertStatus>().unwrap(), AlertStatus::Resolved);
        assert_eq!(
            "false_positive".parse::<AlertStatus>().unwrap(),
            AlertStatus::Dismissed
        );
        assert!("pending".parse::<AlertStatus>().is_err());
    }

    #[test]
    fn test_classify_event_types() {
        assert_eq!(EventCategory::classify("network_flow"), EventCategory::Network);
        assert_eq!(EventCategory::classify("login_failure"), EventCategory::Authentication);
        assert_eq!(EventCategory::classify("ransomware_detected"), EventCategory::Malware);
        assert_eq!(EventCategory::classify("malware_dns_beacon"), EventCategory::Malware);
        assert_eq!(EventCategory::classify("process_spawn"), EventCategory::Endpoint);
        assert_eq!(EventCategory::classify("policy_violation"), EventCategory::Compliance);
        assert_eq!(EventCategory::classify("x"), EventCategory::Other);
    }

    #[test]
    fn test_network_bytes() {
        let event = sample_event("network_flow", serde_json::json!({"bytes": 2048}));
        assert_eq!(event.network_bytes(), Some(2048));

        let split = sample_event(
            "network_flow",
            serde_json::json!({"bytes_in": 100, "bytes_out": 50}),
        );
        assert_eq!(split.network_bytes(), Some(150));

        let none = sample_event("network_flow", serde_json::json!({}));
        assert_eq!(none.network_bytes(), None);

        let not_network = sample_event("login_failure", serde_json::json!({"bytes": 10}));
        assert_eq!(not_network.network_bytes(), None);
    }

    #[test]
    fn test_alert_from_event() {
        let event = sample_event("login_failure", serde_json::json!({}));
        let alert = Alert::from_event(&event);

        assert!(alert.id.starts_with("alert-"));
        assert_eq!(alert.title, "Login failure from fw-01");
        assert_eq!(alert.status, AlertStatus::Open);
        assert_eq!(alert.event_id, "evt-1");
        assert_eq!(alert.severity, Severity::High);
    }

    #[test]
    fn test_alert_title_from_details() {
        let event = sample_event(
            "intrusion",
            serde_json::json!({"title": "Suspicious lateral movement"}),
        );
        assert_eq!(Alert::from_event(&event).title, "Suspicious lateral movement");
    }

    #[test]
    fn test_event_serialization_camel_case() {
        let event = sample_event("network_flow", serde_json::json!({"bytes": 1}));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"eventType\":\"network_flow\""));
        assert!(json.contains("\"receivedAt\""));
        assert!(json.contains("\"category\":\"network\""));
        assert!(json.contains("\"severity\":\"high\""));
    }
}
