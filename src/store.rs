//! Aggregation store
//!
//! Holds the normalized events and alerts the dashboard reads, plus rolling
//! counters, the per-minute series, and the latest compliance evaluation per
//! control. `EventStore` is the seam; `MemoryEventStore` is the bounded
//! in-process implementation.

use crate::compliance::Evaluation;
use crate::config::StoreConfig;
use crate::error::{Result, SocError};
use crate::query::{AlertQuery, EventQuery, Page};
use crate::series::{SeriesPoint, SeverityCounts, TimeSeries};
use crate::types::{Alert, AlertStatus, SecurityEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tokio::sync::RwLock;

/// Number of sources reported in the summary
const TOP_SOURCES: usize = 5;

/// Alert counts by current status, over retained alerts
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub open: u64,
    pub investigating: u64,
    pub resolved: u64,
    pub dismissed: u64,
}

impl StatusCounts {
    fn add(&mut self, status: AlertStatus) {
        match status {
            AlertStatus::Open => self.open += 1,
            AlertStatus::Investigating => self.investigating += 1,
            AlertStatus::Resolved => self.resolved += 1,
            AlertStatus::Dismissed => self.dismissed += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceCount {
    pub source: String,
    pub events: u64,
}

/// Dashboard counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Lifetime totals, including evicted entries
    pub total_events: u64,
    pub total_alerts: u64,
    /// Entries currently retained
    pub stored_events: usize,
    pub stored_alerts: usize,
    pub events_by_severity: SeverityCounts,
    pub alerts_by_severity: SeverityCounts,
    pub alerts_by_status: StatusCounts,
    pub events_by_category: BTreeMap<String, u64>,
    pub top_sources: Vec<SourceCount>,
    /// Network bytes inside the retention window
    pub network_bytes: u64,
    pub last_event_at: Option<DateTime<Utc>>,
}

/// Storage backend for the aggregation layer
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Record a normalized event and the alert it raised
    async fn record(&self, event: SecurityEvent, alert: Option<Alert>) -> Result<()>;

    async fn event(&self, id: &str) -> Result<Option<SecurityEvent>>;

    async fn alert(&self, id: &str) -> Result<Option<Alert>>;

    /// Move an alert to a new triage status
    async fn set_alert_status(&self, id: &str, status: AlertStatus) -> Result<Alert>;

    async fn query_events(&self, query: &EventQuery) -> Result<Page<SecurityEvent>>;

    async fn query_alerts(&self, query: &AlertQuery) -> Result<Page<Alert>>;

    async fn summary(&self) -> Result<Summary>;

    /// Per-minute points for the last `window` minutes ending at `now`
    async fn series(&self, window: u32, now: DateTime<Utc>) -> Result<Vec<SeriesPoint>>;

    /// Keep an evaluation as the latest for its control
    async fn record_evaluation(&self, evaluation: Evaluation) -> Result<()>;

    /// Latest evaluation per control
    async fn evaluations(&self) -> Result<Vec<Evaluation>>;

    fn retention_minutes(&self) -> u32;

    /// Backend name (e.g., "memory")
    fn name(&self) -> &str;
}

struct Inner {
    events: VecDeque<SecurityEvent>,
    alerts: VecDeque<Alert>,
    total_events: u64,
    total_alerts: u64,
    events_by_severity: SeverityCounts,
    alerts_by_severity: SeverityCounts,
    events_by_category: BTreeMap<String, u64>,
    sources: HashMap<String, u64>,
    series: TimeSeries,
    evaluations: HashMap<String, Evaluation>,
    last_event_at: Option<DateTime<Utc>>,
}

/// Bounded in-memory aggregation store
///
/// Newest entries win: when `max_events`/`max_alerts` is reached the oldest
/// entry is evicted while lifetime counters keep counting.
pub struct MemoryEventStore {
    inner: RwLock<Inner>,
    max_events: usize,
    max_alerts: usize,
    retention_minutes: u32,
}

impl MemoryEventStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            inner: RwLock::new(Inner {
                events: VecDeque::new(),
                alerts: VecDeque::new(),
                total_events: 0,
                total_alerts: 0,
                events_by_severity: SeverityCounts::default(),
                alerts_by_severity: SeverityCounts::default(),
                events_by_category: BTreeMap::new(),
                sources: HashMap::new(),
                series: TimeSeries::new(config.retention_minutes),
                evaluations: HashMap::new(),
                last_event_at: None,
            }),
            max_events: config.max_events.max(1),
            max_alerts: config.max_alerts.max(1),
            retention_minutes: config.retention_minutes.max(1),
        }
    }
}

impl Default for MemoryEventStore {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn record(&self, event: SecurityEvent, alert: Option<Alert>) -> Result<()> {
        let mut inner = self.inner.write().await;

        inner.series.record(&event, alert.is_some(), event.received_at);
        inner.total_events += 1;
        inner.events_by_severity.add(event.severity);
        *inner
            .events_by_category
            .entry(event.category.as_str().to_string())
            .or_insert(0) += 1;
        *inner.sources.entry(event.source.clone()).or_insert(0) += 1;
        inner.last_event_at = Some(
            inner
                .last_event_at
                .map_or(event.timestamp, |t| t.max(event.timestamp)),
        );

        if let Some(alert) = alert {
            tracing::info!(
                alert_id = %alert.id,
                event_id = %event.id,
                severity = %alert.severity,
                "Alert raised: {}",
                alert.title
            );
            inner.total_alerts += 1;
            inner.alerts_by_severity.add(alert.severity);
            inner.alerts.push_back(alert);
            while inner.alerts.len() > self.max_alerts {
                inner.alerts.pop_front();
            }
        }

        inner.events.push_back(event);
        while inner.events.len() > self.max_events {
            inner.events.pop_front();
        }

        Ok(())
    }

    async fn event(&self, id: &str) -> Result<Option<SecurityEvent>> {
        let inner = self.inner.read().await;
        Ok(inner.events.iter().rev().find(|e| e.id == id).cloned())
    }

    async fn alert(&self, id: &str) -> Result<Option<Alert>> {
        let inner = self.inner.read().await;
        Ok(inner.alerts.iter().rev().find(|a| a.id == id).cloned())
    }

    async fn set_alert_status(&self, id: &str, status: AlertStatus) -> Result<Alert> {
        let mut inner = self.inner.write().await;
        let alert = inner
            .alerts
            .iter_mut()
            .rev()
            .find(|a| a.id == id)
            .ok_or_else(|| SocError::NotFound(format!("Alert {}", id)))?;

        if alert.status != status {
            tracing::info!(
                alert_id = %id,
                from = %alert.status,
                to = %status,
                "Alert status changed"
            );
            alert.status = status;
            alert.updated_at = Utc::now();
        }
        Ok(alert.clone())
    }

    async fn query_events(&self, query: &EventQuery) -> Result<Page<SecurityEvent>> {
        let inner = self.inner.read().await;
        Ok(Page::collect(
            inner.events.iter().rev().filter(|e| query.matches(e)),
            query.offset,
            query.limit,
        ))
    }

    async fn query_alerts(&self, query: &AlertQuery) -> Result<Page<Alert>> {
        let inner = self.inner.read().await;
        Ok(Page::collect(
            inner.alerts.iter().rev().filter(|a| query.matches(a)),
            query.offset,
            query.limit,
        ))
    }

    async fn summary(&self) -> Result<Summary> {
        let inner = self.inner.read().await;

        let mut alerts_by_status = StatusCounts::default();
        for alert in &inner.alerts {
            alerts_by_status.add(alert.status);
        }

        let mut top_sources: Vec<SourceCount> = inner
            .sources
            .iter()
            .map(|(source, events)| SourceCount {
                source: source.clone(),
                events: *events,
            })
            .collect();
        top_sources.sort_by(|a, b| b.events.cmp(&a.events).then_with(|| a.source.cmp(&b.source)));
        top_sources.truncate(TOP_SOURCES);

        Ok(Summary {
            total_events: inner.total_events,
            total_alerts: inner.total_alerts,
            stored_events: inner.events.len(),
            stored_alerts: inner.alerts.len(),
            events_by_severity: inner.events_by_severity,
            alerts_by_severity: inner.alerts_by_severity,
            alerts_by_status,
            events_by_category: inner.events_by_category.clone(),
            top_sources,
            network_bytes: inner.series.network_bytes(),
            last_event_at: inner.last_event_at,
        })
    }

    async fn series(&self, window: u32, now: DateTime<Utc>) -> Result<Vec<SeriesPoint>> {
        let inner = self.inner.read().await;
        Ok(inner.series.points(window, now))
    }

    async fn record_evaluation(&self, evaluation: Evaluation) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner
            .evaluations
            .insert(evaluation.control_id.clone(), evaluation);
        Ok(())
    }

    async fn evaluations(&self) -> Result<Vec<Evaluation>> {
        let inner = self.inner.read().await;
        let mut all: Vec<Evaluation> = inner.evaluations.values().cloned().collect();
        all.sort_by(|a, b| a.control_id.cmp(&b.control_id));
        Ok(all)
    }

    fn retention_minutes(&self) -> u32 {
        self.retention_minutes
    }

    fn name(&self) -> &str {
        "memory"
    }
}
