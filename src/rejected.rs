//! Rejected-ingest buffer
//!
//! Keeps the most recent ingest requests that failed validation so operators
//! can see which sensors are sending malformed events.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Cap on the stored copy of a rejected body
const MAX_BODY_BYTES: usize = 4096;

/// An ingest request that was refused
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedEvent {
    pub reason: String,
    /// Raw request body, truncated
    pub body: String,
    pub rejected_at: DateTime<Utc>,
}

impl RejectedEvent {
    pub fn new(reason: impl Into<String>, body: &[u8]) -> Self {
        let end = body.len().min(MAX_BODY_BYTES);
        Self {
            reason: reason.into(),
            body: String::from_utf8_lossy(&body[..end]).into_owned(),
            rejected_at: Utc::now(),
        }
    }
}

/// Bounded in-memory log of rejected events
pub struct RejectedLog {
    events: RwLock<VecDeque<RejectedEvent>>,
    capacity: usize,
}

impl RejectedLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: RwLock::new(VecDeque::new()),
            capacity,
        }
    }

    pub async fn push(&self, event: RejectedEvent) {
        tracing::warn!(reason = %event.reason, "Ingest rejected");

        let mut events = self.events.write().await;
        events.push_back(event);
        if self.capacity > 0 {
            while events.len() > self.capacity {
                events.pop_front();
            }
        }
    }

    pub async fn count(&self) -> usize {
        self.events.read().await.len()
    }

    /// Most recent first
    pub async fn list(&self, limit: usize) -> Vec<RejectedEvent> {
        let events = self.events.read().await;
        events.iter().rev().take(limit).cloned().collect()
    }
}

impl Default for RejectedLog {
    fn default() -> Self {
        Self::new(1_000)
    }
}
