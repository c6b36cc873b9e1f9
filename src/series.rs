//! Per-minute rolling time series
//!
//! Buckets are keyed by the minute (Unix seconds / 60) of the event
//! timestamp and pruned once they fall out of the retention window.

use crate::types::{SecurityEvent, Severity};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: Severity) {
        *self.slot(severity) += 1;
    }

    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn total(&self) -> u64 {
        self.critical + self.high + self.medium + self.low
    }

    fn slot(&mut self, severity: Severity) -> &mut u64 {
        match severity {
            Severity::Critical => &mut self.critical,
            Severity::High => &mut self.high,
            Severity::Medium => &mut self.medium,
            Severity::Low => &mut self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    events: u64,
    alerts: u64,
    severity: SeverityCounts,
    network_bytes: u64,
}

/// One point of `GET /api/metrics/timeseries`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Start of the minute
    pub timestamp: DateTime<Utc>,
    pub events: u64,
    pub alerts: u64,
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub network_bytes: u64,
}

#[derive(Debug)]
pub struct TimeSeries {
    buckets: BTreeMap<i64, Bucket>,
    retention_minutes: u32,
}

fn minute_of(ts: DateTime<Utc>) -> i64 {
    ts.timestamp().div_euclid(60)
}

impl TimeSeries {
    pub fn new(retention_minutes: u32) -> Self {
        Self {
            buckets: BTreeMap::new(),
            retention_minutes: retention_minutes.max(1),
        }
    }

    /// Add an event observed at `now`
    ///
    /// Events older than the retention window are not bucketed.
    pub fn record(&mut self, event: &SecurityEvent, raised_alert: bool, now: DateTime<Utc>) {
        let oldest = self.oldest_minute(now);
        self.buckets = self.buckets.split_off(&oldest);

        let minute = minute_of(event.timestamp);
        if minute < oldest {
            return;
        }

        let bucket = self.buckets.entry(minute).or_default();
        bucket.events += 1;
        bucket.severity.add(event.severity);
        if raised_alert {
            bucket.alerts += 1;
        }
        if let Some(bytes) = event.network_bytes() {
            bucket.network_bytes = bucket.network_bytes.saturating_add(bytes);
        }
    }

    /// Zero-filled per-minute points for the last `window` minutes, oldest first
    pub fn points(&self, window: u32, now: DateTime<Utc>) -> Vec<SeriesPoint> {
        let window = window.clamp(1, self.retention_minutes) as i64;
        let end = minute_of(now);
        let start = end - window + 1;

        (start..=end)
            .map(|minute| {
                let b = self.buckets.get(&minute).copied().unwrap_or_default();
                SeriesPoint {
                    timestamp: Utc
                        .timestamp_opt(minute * 60, 0)
                        .single()
                        .unwrap_or(now),
                    events: b.events,
                    alerts: b.alerts,
                    critical: b.severity.critical,
                    high: b.severity.high,
                    medium: b.severity.medium,
                    low: b.severity.low,
                    network_bytes: b.network_bytes,
                }
            })
            .collect()
    }

    /// Network bytes inside the retention window
    pub fn network_bytes(&self) -> u64 {
        self.buckets.values().map(|b| b.network_bytes).sum()
    }

    fn oldest_minute(&self, now: DateTime<Utc>) -> i64 {
        minute_of(now) - self.retention_minutes as i64 + 1
    }
}
