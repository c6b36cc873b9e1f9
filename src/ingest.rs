//! Event ingest normalizer
//!
//! Turns loosely-shaped inbound events into canonical [`SecurityEvent`]s:
//! required-field checks, type/source cleanup, severity and category
//! resolution, timestamp parsing, and alert derivation.

use crate::config::{IngestConfig, MAX_CLOCK_SKEW_SECS};
use crate::error::{Result, SocError};
use crate::types::{Alert, EventCategory, SecurityEvent, Severity};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

const MAX_EVENT_TYPE_LEN: usize = 128;
const MAX_SOURCE_LEN: usize = 256;

/// Raw body of `POST /api/ingest`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    /// Details schema version, defaults to 1
    #[serde(default)]
    pub version: Option<u32>,
}

impl IngestRequest {
    pub fn new(event_type: &str, source: &str, details: serde_json::Value) -> Self {
        Self {
            event_type: Some(event_type.to_string()),
            source: Some(source.to_string()),
            details: Some(details),
            version: None,
        }
    }
}

/// A normalized event plus the alert it raised, if any
#[derive(Debug, Clone)]
pub struct Normalized {
    pub event: SecurityEvent,
    pub alert: Option<Alert>,
}

/// Stateless normalizer configured with alerting threshold and clock skew
#[derive(Debug, Clone)]
pub struct Normalizer {
    alert_min_severity: Severity,
    max_clock_skew: Duration,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&IngestConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            alert_min_severity: config.alert_min_severity,
            max_clock_skew: clock_skew(config.max_clock_skew_secs),
        }
    }

    /// Normalize a request received at `now`
    pub fn normalize(&self, req: IngestRequest, now: DateTime<Utc>) -> Result<Normalized> {
        let event_type = non_blank(req.event_type.as_deref());
        let source = non_blank(req.source.as_deref());

        let mut missing = Vec::new();
        if event_type.is_none() {
            missing.push("event_type");
        }
        if source.is_none() {
            missing.push("source");
        }
        let (Some(event_type), Some(source)) = (event_type, source) else {
            return Err(SocError::MissingFields(missing));
        };

        let event_type = normalize_event_type(event_type)?;
        if source.chars().count() > MAX_SOURCE_LEN {
            return Err(SocError::invalid(
                "source",
                format!("must be at most {} characters", MAX_SOURCE_LEN),
            ));
        }

        let details = match req.details {
            None | Some(serde_json::Value::Null) => serde_json::json!({}),
            Some(v @ serde_json::Value::Object(_)) => v,
            Some(other) => serde_json::json!({ "value": other }),
        };

        let version = req.version.unwrap_or(1);
        if version == 0 {
            return Err(SocError::invalid("version", "must be >= 1"));
        }

        let severity = details
            .get("severity")
            .and_then(|v| v.as_str())
            .and_then(Severity::parse_lenient)
            .unwrap_or_else(|| default_severity(&event_type));

        let timestamp = details
            .get("timestamp")
            .and_then(parse_timestamp)
            .filter(|ts| {
                now.checked_add_signed(self.max_clock_skew)
                    .map_or(true, |limit| *ts <= limit)
            })
            .unwrap_or(now);

        let summary = ["title", "message", "description"]
            .iter()
            .find_map(|k| details.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("{} from {}", event_type, source));

        let event = SecurityEvent {
            id: format!("evt-{}", uuid::Uuid::new_v4()),
            category: EventCategory::classify(&event_type),
            event_type,
            version,
            severity,
            source: source.to_string(),
            summary,
            details,
            timestamp,
            received_at: now,
        };

        let alert = (event.severity >= self.alert_min_severity).then(|| Alert::from_event(&event));

        Ok(Normalized { event, alert })
    }
}

fn clock_skew(secs: u64) -> Duration {
    i64::try_from(secs.min(MAX_CLOCK_SKEW_SECS))
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or_else(Duration::zero)
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// "Login-Failure " -> "login_failure"
pub(crate) fn normalize_event_type(raw: &str) -> Result<String> {
    let normalized: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '-' { '_' } else { c })
        .collect();

    if normalized.len() > MAX_EVENT_TYPE_LEN {
        return Err(SocError::invalid(
            "event_type",
            format!("must be at most {} characters", MAX_EVENT_TYPE_LEN),
        ));
    }
    if !normalized
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | ':'))
    {
        return Err(SocError::invalid(
            "event_type",
            format!("'{}' may only contain a-z, 0-9, '_', '.' and ':'", raw.trim()),
        ));
    }
    Ok(normalized)
}

/// Severity assumed when the source does not report one
pub fn default_severity(event_type: &str) -> Severity {
    const TABLE: &[(Severity, &[&str])] = &[
        (Severity::Critical, &["malware", "ransomware"]),
        (Severity::High, &["intrusion", "exfil", "privilege"]),
        (Severity::Medium, &["login_failure", "brute", "scan", "phish"]),
    ];

    TABLE
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| event_type.contains(k)))
        .map(|(severity, _)| *severity)
        .unwrap_or(Severity::Low)
}

/// RFC 3339 string or integer Unix milliseconds
fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}
