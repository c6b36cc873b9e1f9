//! Query façade: filters, time windows, and pagination over the store
//!
//! Raw query-string parameters arrive as strings so that a bad value becomes
//! a JSON 400 instead of an extractor rejection.

use crate::error::{Result, SocError};
use crate::types::{Alert, AlertStatus, EventCategory, SecurityEvent, Severity};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 500;
pub const DEFAULT_WINDOW_MINUTES: u32 = 60;

/// One page of results; `total` counts every match before pagination
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

impl<T: Clone> Page<T> {
    /// Paginate an iterator of matches that is already newest-first
    pub fn collect<'a, I>(matches: I, offset: usize, limit: usize) -> Self
    where
        I: Iterator<Item = &'a T>,
        T: 'a,
    {
        let mut total = 0;
        let mut items = Vec::new();
        for item in matches {
            if total >= offset && items.len() < limit {
                items.push(item.clone());
            }
            total += 1;
        }
        Self {
            items,
            total,
            offset,
            limit,
        }
    }
}

/// Query-string for `GET /api/alerts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertParams {
    pub severity: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Query-string for `GET /api/events`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventParams {
    pub event_type: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub source: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// Time range filter; both ends inclusive
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.since.map_or(true, |s| ts >= s) && self.until.map_or(true, |u| ts <= u)
    }

    fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self> {
        let range = Self {
            since: since.map(|s| parse_time("since", s)).transpose()?,
            until: until.map(|s| parse_time("until", s)).transpose()?,
        };
        if let (Some(s), Some(u)) = (range.since, range.until) {
            if s > u {
                return Err(SocError::invalid("since", "must not be after 'until'"));
            }
        }
        Ok(range)
    }
}

#[derive(Debug, Clone)]
pub struct AlertQuery {
    pub severity: Option<Severity>,
    pub status: Option<AlertStatus>,
    pub source: Option<String>,
    pub range: TimeRange,
    pub limit: usize,
    pub offset: usize,
}

impl Default for AlertQuery {
    fn default() -> Self {
        Self {
            severity: None,
            status: None,
            source: None,
            range: TimeRange::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl AlertQuery {
    pub fn from_params(params: &AlertParams) -> Result<Self> {
        Ok(Self {
            severity: parse_enum("severity", params.severity.as_deref())?,
            status: parse_enum("status", params.status.as_deref())?,
            source: non_empty(params.source.as_deref()),
            range: TimeRange::parse(params.since.as_deref(), params.until.as_deref())?,
            limit: parse_limit(params.limit.as_deref())?,
            offset: parse_offset(params.offset.as_deref())?,
        })
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        self.severity.map_or(true, |s| alert.severity == s)
            && self.status.map_or(true, |s| alert.status == s)
            && self.source.as_deref().map_or(true, |s| alert.source == s)
            && self.range.contains(alert.timestamp)
    }
}

#[derive(Debug, Clone)]
pub struct EventQuery {
    pub event_type: Option<String>,
    pub category: Option<EventCategory>,
    pub severity: Option<Severity>,
    pub source: Option<String>,
    pub range: TimeRange,
    /// Case-insensitive substring over summary and event type
    pub text: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            event_type: None,
            category: None,
            severity: None,
            source: None,
            range: TimeRange::default(),
            text: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl EventQuery {
    pub fn from_params(params: &EventParams) -> Result<Self> {
        Ok(Self {
            event_type: non_empty(params.event_type.as_deref()).map(|t| t.to_lowercase()),
            category: parse_enum("category", params.category.as_deref())?,
            severity: parse_enum("severity", params.severity.as_deref())?,
            source: non_empty(params.source.as_deref()),
            range: TimeRange::parse(params.since.as_deref(), params.until.as_deref())?,
            text: non_empty(params.q.as_deref()).map(|q| q.to_lowercase()),
            limit: parse_limit(params.limit.as_deref())?,
            offset: parse_offset(params.offset.as_deref())?,
        })
    }

    pub fn matches(&self, event: &SecurityEvent) -> bool {
        self.event_type
            .as_deref()
            .map_or(true, |t| event.event_type == t)
            && self.category.map_or(true, |c| event.category == c)
            && self.severity.map_or(true, |s| event.severity == s)
            && self.source.as_deref().map_or(true, |s| event.source == s)
            && self.range.contains(event.timestamp)
            && self.text.as_deref().map_or(true, |q| {
                event.summary.to_lowercase().contains(q) || event.event_type.contains(q)
            })
    }
}

/// Series window in minutes, clamped to `[1, retention]`
pub fn parse_window(raw: Option<&str>, retention_minutes: u32) -> Result<u32> {
    let window = match non_empty(raw) {
        None => DEFAULT_WINDOW_MINUTES,
        Some(s) => s
            .parse::<u32>()
            .map_err(|_| SocError::invalid("window", format!("'{}' is not a number of minutes", s)))?,
    };
    Ok(window.clamp(1, retention_minutes.max(1)))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn parse_enum<T>(field: &str, raw: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty() && *s != "all") {
        None => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(|e| SocError::invalid(field, e)),
    }
}

fn parse_limit(raw: Option<&str>) -> Result<usize> {
    match non_empty(raw) {
        None => Ok(DEFAULT_LIMIT),
        Some(s) => s
            .parse::<usize>()
            .map(|n| n.clamp(1, MAX_LIMIT))
            .map_err(|_| SocError::invalid("limit", format!("'{}' is not a number", s))),
    }
}

fn parse_offset(raw: Option<&str>) -> Result<usize> {
    match non_empty(raw) {
        None => Ok(0),
        Some(s) => s
            .parse::<usize>()
            .map_err(|_| SocError::invalid("offset", format!("'{}' is not a number", s))),
    }
}

/// RFC 3339 or Unix milliseconds
fn parse_time(field: &str, raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return Utc
            .timestamp_millis_opt(ms)
            .single()
            .ok_or_else(|| SocError::invalid(field, "timestamp out of range"));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| SocError::invalid(field, format!("'{}' is not RFC 3339 or Unix millis", raw)))
}
